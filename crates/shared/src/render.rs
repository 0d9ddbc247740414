use glam::{Mat3, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Projection model of the live camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraKind {
    #[default]
    Pinhole,
    Orthographic,
}

/// Camera part of the render state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraParams {
    pub kind: CameraKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub far: f32,
    /// Vertical field of view in degrees (pinhole) or view height in world units (orthographic)
    pub fov: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            kind: CameraKind::Pinhole,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            far: 1000.0,
            fov: 60.0,
        }
    }
}

impl CameraParams {
    /// Camera at `position` looking at `target`, with +Z as world up
    pub fn look_at(kind: CameraKind, position: Vec3, target: Vec3) -> Self {
        let forward = (target - position).normalize_or_zero();
        let right = match forward.cross(Vec3::Z).try_normalize() {
            Some(r) => r,
            None => Vec3::X,
        };
        let up = right.cross(forward);
        let rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
        Self {
            kind,
            position,
            rotation,
            ..Self::default()
        }
    }
}

/// Snapshot of the SDK render state the overlay reads every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    pub camera: CameraParams,
    /// Output size in pixels
    pub viewport: Vec2,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            camera: CameraParams::default(),
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_points_camera_at_target() {
        let cam = CameraParams::look_at(CameraKind::Pinhole, Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO);
        let dir = cam.rotation * Vec3::NEG_Z;
        assert!((dir - Vec3::Y).length() < 1e-5);
        // World up stays up on screen
        let up = cam.rotation * Vec3::Y;
        assert!((up - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_look_at_straight_down() {
        let cam = CameraParams::look_at(CameraKind::Orthographic, Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let dir = cam.rotation * Vec3::NEG_Z;
        assert!((dir - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(cam.kind, CameraKind::Orthographic);
    }
}
