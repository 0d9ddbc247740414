use glam::{Vec2, Vec3};
use shared::{CameraKind, CameraParams, RenderState};

use super::picking::Ray;

/// Arc-ball camera orbiting a target, Z up
pub struct ArcBallCamera {
    /// Rotation around Z (radians)
    pub yaw: f32,
    /// Elevation above the XY plane (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub kind: CameraKind,
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: -1.2,
            pitch: 0.5,
            distance: 12.0,
            target: Vec3::ZERO,
            fov: 60.0,
            kind: CameraKind::Pinhole,
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 300.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.eye_position()).normalize_or_zero();
        let right = forward.cross(Vec3::Z).normalize_or_zero();
        let up = right.cross(forward);
        let scale = self.distance * 0.002;
        self.target += (-right * dx + up * dy) * scale;
    }

    pub fn toggle_projection(&mut self) {
        self.kind = match self.kind {
            CameraKind::Pinhole => CameraKind::Orthographic,
            CameraKind::Orthographic => CameraKind::Pinhole,
        };
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * cy, cp * sy, sp) * self.distance
    }

    /// Height of the orthographic view matching the perspective framing at the target
    fn ortho_height(&self) -> f32 {
        2.0 * self.distance * (self.fov.to_radians() * 0.5).tan()
    }

    /// Render state handed to the SDK for a viewport of `size` pixels
    pub fn render_state(&self, size: Vec2) -> RenderState {
        let base = CameraParams::look_at(self.kind, self.eye_position(), self.target);
        let fov = match self.kind {
            CameraKind::Pinhole => self.fov,
            CameraKind::Orthographic => self.ortho_height(),
        };
        RenderState {
            camera: CameraParams { fov, ..base },
            viewport: size,
        }
    }

    /// Ray through a viewport-local pixel
    pub fn screen_ray(&self, pixel: Vec2, size: Vec2) -> Ray {
        let state = self.render_state(size);
        let camera = state.camera;
        let half = size * 0.5;
        match self.kind {
            CameraKind::Pinhole => {
                let focal = half.y / (camera.fov.to_radians() * 0.5).tan();
                let view = Vec3::new((pixel.x - half.x) / focal, -(pixel.y - half.y) / focal, -1.0);
                Ray {
                    origin: camera.position,
                    direction: (camera.rotation * view).normalize_or_zero(),
                }
            }
            CameraKind::Orthographic => {
                let scale = size.y / camera.fov;
                let offset = Vec3::new((pixel.x - half.x) / scale, -(pixel.y - half.y) / scale, 0.0);
                Ray {
                    origin: camera.position + camera.rotation * offset,
                    direction: camera.rotation * Vec3::NEG_Z,
                }
            }
        }
    }
}
