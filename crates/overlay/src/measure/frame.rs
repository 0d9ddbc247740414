//! Records of one committed overlay frame.
//!
//! Every record carries the identity it was built for, so markers and products
//! can never drift onto a neighbouring measurement.

use shared::{ActiveAxis, DrawProduct, MeasureEntity, MeasurementId};

use super::positions::InteractionPositions;

/// Entities forming one visual measurement
pub type MeasureSet = Vec<MeasureEntity>;

/// Identity of a whole set: member keys joined with `+`
pub fn set_key(set: &[MeasureEntity]) -> String {
    set.iter()
        .map(MeasureEntity::key)
        .collect::<Vec<_>>()
        .join("+")
}

/// Product of one set member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberFrame {
    pub key: String,
    pub product: Option<DrawProduct>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetFrame {
    pub key: String,
    pub members: Vec<MemberFrame>,
}

impl SetFrame {
    /// Product of a single-member set, which is what remove/info markers attach to
    pub fn single_product(&self) -> Option<&DrawProduct> {
        match self.members.as_slice() {
            [only] => only.product.as_ref(),
            _ => None,
        }
    }
}

/// Product of a duo measurement
#[derive(Debug, Clone, PartialEq)]
pub struct ResultFrame {
    pub id: MeasurementId,
    pub product: Option<DrawProduct>,
    pub active_axis: ActiveAxis,
}

/// Everything the last successful refresh produced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayFrame {
    pub generation: u64,
    pub sets: Vec<SetFrame>,
    pub results: Vec<Option<ResultFrame>>,
    pub hover: Option<DrawProduct>,
    pub area: Option<DrawProduct>,
    pub point_line: Option<DrawProduct>,
    pub positions: InteractionPositions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{edge_entity, vertex_entity};
    use glam::Vec3;

    #[test]
    fn test_set_key_joins_members() {
        let set = vec![vertex_entity(1, Vec3::ZERO), edge_entity(2, 3)];
        assert_eq!(set_key(&set), "1_0_-+2_0_3");
        assert_eq!(set_key(&[]), "");
    }
}
