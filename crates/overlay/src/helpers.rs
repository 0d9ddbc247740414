//! Small vector helpers shared by the drawing and positioning code

use glam::{Vec2, Vec3};
use shared::Rgba;

/// Convert a glam screen point into an egui position
#[inline]
pub fn to_pos2(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

/// Convert an SDK colour into an egui colour
#[inline]
pub fn to_color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

/// Counter-clockwise perpendicular in screen space (y down)
#[inline]
pub fn perpendicular(dir: Vec2) -> Vec2 {
    Vec2::new(dir.y, -dir.x)
}

/// Average of 2D points
pub fn centroid2(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().copied().sum::<Vec2>() / points.len() as f32)
}

/// Average of 3D points
pub fn centroid3(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().copied().sum::<Vec3>() / points.len() as f32)
}

/// Drop the trailing vertex of a closed loop (last == first)
pub fn open_loop<T: Copy + PartialEq>(points: &[T]) -> &[T] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && first == last => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Angle of `v` normalised so text drawn along it reads left to right
pub fn upright_angle(v: Vec2) -> f32 {
    let angle = v.y.atan2(v.x);
    if angle > std::f32::consts::FRAC_PI_2 {
        angle - std::f32::consts::PI
    } else if angle < -std::f32::consts::FRAC_PI_2 {
        angle + std::f32::consts::PI
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_loop_drops_closing_vertex() {
        let pts = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ZERO];
        assert_eq!(open_loop(&pts).len(), 3);
        let open = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert_eq!(open_loop(&open).len(), 3);
        let single = [Vec3::ZERO];
        assert_eq!(open_loop(&single).len(), 1);
    }

    #[test]
    fn test_centroid() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(4.0, 4.0), Vec2::new(0.0, 4.0)];
        assert_eq!(centroid2(&pts), Some(Vec2::new(2.0, 2.0)));
        assert_eq!(centroid2(&[]), None);
        assert_eq!(centroid3(&[Vec3::X, Vec3::Y]), Some(Vec3::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn test_upright_angle() {
        assert!(upright_angle(Vec2::new(1.0, 0.0)).abs() < 1e-6);
        assert!(upright_angle(Vec2::new(-1.0, 0.0)).abs() < 1e-6);
        let a = upright_angle(Vec2::new(-1.0, -1.0));
        assert!((a - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
    }
}
