//! Duo measurements: pairwise results between the two members of a set.

use shared::{ActiveAxis, DuoResult};
use tracing::debug;

use super::frame::MeasureSet;
use crate::error::Result;
use crate::sdk::MeasureSdk;

/// A duo result together with the axes the user chose to display
#[derive(Debug, Clone, PartialEq)]
pub struct DuoMeasurement {
    pub result: DuoResult,
    pub active_axis: ActiveAxis,
}

/// Measure every two-member set.
///
/// The output has one slot per set; sets of any other size, and pairs the SDK
/// cannot measure, are `None`. `axes` supplies the flags for a set index.
pub async fn compute_duo_results<S: MeasureSdk>(
    sdk: &S,
    sets: &[MeasureSet],
    axes: impl Fn(usize) -> ActiveAxis,
) -> Result<Vec<Option<DuoMeasurement>>> {
    let mut results = Vec::with_capacity(sets.len());
    for (i, set) in sets.iter().enumerate() {
        let measured = match set.as_slice() {
            [a, b] => sdk.measure_pair(a, b).await?,
            _ => None,
        };
        if let Some(result) = &measured {
            debug!(set = i, id = result.id, distance = result.distance, "duo measured");
        }
        results.push(measured.map(|result| DuoMeasurement {
            result,
            active_axis: axes(i),
        }));
    }
    Ok(results)
}
