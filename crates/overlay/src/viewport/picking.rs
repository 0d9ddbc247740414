//! Screen-space picking against the demo scene

use glam::{Vec2, Vec3};
use measure_overlay_lib::fixtures::FakeGeometry;
use shared::{CylinderMeasure, DrawKind, MeasureEntity, MeasureSettings, ObjectId};

/// A ray in world space
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Intersection with the z = 0 ground plane
    pub fn intersect_ground(&self) -> Option<Vec3> {
        if self.direction.z.abs() < 1e-6 {
            return None;
        }
        let t = -self.origin.z / self.direction.z;
        (t > 0.0).then(|| self.origin + self.direction * t)
    }
}

/// Distance from `p` to the segment `a`–`b`
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Even-odd point in polygon test
fn inside(p: Vec2, polygon: &[Vec2]) -> bool {
    let mut result = false;
    let n = polygon.len();
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + n - 1) % n]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            result = !result;
        }
    }
    result
}

fn picked(object_id: ObjectId, path_index: Option<u32>, draw_kind: DrawKind, position: Vec3) -> MeasureEntity {
    MeasureEntity {
        object_id,
        instance_index: 0,
        path_index,
        draw_kind,
        position,
        settings: None,
    }
}

/// Vertices first, then segments, then faces. `project` maps world to viewport pixels.
pub fn pick_entity(
    scene: &[(ObjectId, FakeGeometry)],
    project: impl Fn(Vec3) -> Option<Vec2>,
    pointer: Vec2,
    tolerance: f32,
) -> Option<MeasureEntity> {
    let polyline = |g: &FakeGeometry| -> Vec<Vec3> {
        match g {
            FakeGeometry::Edge(a, b) => vec![*a, *b],
            FakeGeometry::Curve(points) => points.clone(),
            FakeGeometry::Cylinder { start, end, .. } => vec![*start, *end],
            FakeGeometry::Plane(outline) => outline.clone(),
        }
    };

    for (id, geometry) in scene {
        for point in polyline(geometry) {
            if project(point).is_some_and(|p| p.distance(pointer) <= tolerance) {
                return Some(picked(*id, None, DrawKind::Vertex, point));
            }
        }
    }

    for (id, geometry) in scene {
        let points = polyline(geometry);
        let projected: Option<Vec<Vec2>> = points.iter().map(|p| project(*p)).collect();
        let Some(projected) = projected else {
            continue;
        };
        let hit = projected
            .windows(2)
            .any(|w| segment_distance(pointer, w[0], w[1]) <= tolerance);
        match geometry {
            FakeGeometry::Edge(..) if hit => return Some(picked(*id, Some(0), DrawKind::Edge, points[0])),
            FakeGeometry::Curve(_) if hit => return Some(picked(*id, Some(0), DrawKind::Curve, points[0])),
            FakeGeometry::Cylinder { .. } if hit => {
                return Some(MeasureEntity {
                    settings: Some(MeasureSettings {
                        cylinder_measure: Some(CylinderMeasure::Center),
                    }),
                    ..picked(*id, Some(0), DrawKind::Curve, points[0])
                })
            }
            FakeGeometry::Plane(_) if inside(pointer, &projected) => {
                return Some(picked(*id, Some(0), DrawKind::Face, points[0]))
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Vec<(ObjectId, FakeGeometry)> {
        vec![
            (1, FakeGeometry::Edge(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0))),
            (
                2,
                FakeGeometry::Plane(vec![
                    Vec3::new(0.0, 20.0, 0.0),
                    Vec3::new(10.0, 20.0, 0.0),
                    Vec3::new(10.0, 30.0, 0.0),
                    Vec3::new(0.0, 30.0, 0.0),
                ]),
            ),
        ]
    }

    /// 10 px per unit, no camera
    fn flat(p: Vec3) -> Option<Vec2> {
        Some(p.truncate() * 10.0)
    }

    #[test]
    fn test_vertex_wins_over_edge() {
        let hit = pick_entity(&scene(), flat, Vec2::new(2.0, 1.0), 5.0).unwrap();
        assert_eq!(hit.draw_kind, DrawKind::Vertex);
        assert_eq!(hit.position, Vec3::ZERO);
    }

    #[test]
    fn test_edge_and_face_picks() {
        let edge = pick_entity(&scene(), flat, Vec2::new(50.0, 3.0), 5.0).unwrap();
        assert_eq!((edge.object_id, edge.draw_kind), (1, DrawKind::Edge));

        let face = pick_entity(&scene(), flat, Vec2::new(50.0, 250.0), 5.0).unwrap();
        assert_eq!((face.object_id, face.draw_kind), (2, DrawKind::Face));

        assert!(pick_entity(&scene(), flat, Vec2::new(500.0, 500.0), 5.0).is_none());
    }

    #[test]
    fn test_ground_intersection() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::new(0.0, 0.6, -0.8),
        };
        let hit = ray.intersect_ground().unwrap();
        assert!((hit - Vec3::new(0.0, 7.5, 0.0)).length() < 1e-4);

        let upward = Ray {
            origin: Vec3::Z,
            direction: Vec3::Z,
        };
        assert!(upward.intersect_ground().is_none());
    }
}
