use glam::Vec3;
use shared::{CameraKind, RenderState};

/// Minimal camera snapshot taken from the render state once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// View direction in world space (unit length)
    pub direction: Vec3,
    pub kind: CameraKind,
}

impl CameraState {
    pub fn from_render_state(state: &RenderState) -> Self {
        let camera = &state.camera;
        Self {
            position: camera.position,
            direction: (camera.rotation * Vec3::NEG_Z).normalize_or_zero(),
            kind: camera.kind,
        }
    }

    pub fn is_perspective(&self) -> bool {
        self.kind == CameraKind::Pinhole
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    /// Direction from the camera towards `point`; constant for orthographic views
    pub fn view_direction_to(&self, point: Vec3) -> Vec3 {
        match self.kind {
            CameraKind::Pinhole => (point - self.position).normalize_or_zero(),
            CameraKind::Orthographic => self.direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use shared::CameraParams;

    fn state(rotation: Quat, kind: CameraKind) -> RenderState {
        RenderState {
            camera: CameraParams {
                kind,
                position: Vec3::new(1.0, 2.0, 3.0),
                rotation,
                ..CameraParams::default()
            },
            ..RenderState::default()
        }
    }

    #[test]
    fn test_identity_looks_down_negative_z() {
        let cam = CameraState::from_render_state(&state(Quat::IDENTITY, CameraKind::Pinhole));
        assert!((cam.direction - Vec3::NEG_Z).length() < 1e-6);
        assert_eq!(cam.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(cam.is_perspective());
    }

    #[test]
    fn test_rotation_is_applied() {
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let cam = CameraState::from_render_state(&state(rot, CameraKind::Orthographic));
        assert!((cam.direction - Vec3::NEG_X).length() < 1e-5);
        assert_eq!(cam.view_direction_to(Vec3::ZERO), cam.direction);
    }
}
