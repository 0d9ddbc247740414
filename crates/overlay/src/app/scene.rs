//! Demo scene shown by the viewer

use glam::Vec3;
use measure_overlay_lib::fixtures::{FakeGeometry, FakeSdk};
use shared::ObjectId;

/// A few measurable objects around the origin
pub fn demo_scene() -> Vec<(ObjectId, FakeGeometry)> {
    let square = |min: Vec3, max: Vec3| {
        vec![
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ]
    };
    vec![
        (1, FakeGeometry::Plane(square(Vec3::new(-4.0, -4.0, 0.0), Vec3::new(4.0, 4.0, 0.0)))),
        (2, FakeGeometry::Edge(Vec3::new(-4.0, -4.0, 0.0), Vec3::new(-4.0, -4.0, 3.0))),
        (3, FakeGeometry::Edge(Vec3::new(4.0, -4.0, 0.0), Vec3::new(4.0, -4.0, 3.0))),
        (
            4,
            FakeGeometry::Curve(vec![
                Vec3::new(-3.0, 2.0, 2.0),
                Vec3::new(-1.0, 2.0, 1.5),
                Vec3::new(1.0, 2.0, 1.5),
                Vec3::new(3.0, 2.0, 0.5),
            ]),
        ),
        (
            5,
            FakeGeometry::Cylinder {
                start: Vec3::new(2.0, -1.0, 0.0),
                end: Vec3::new(2.0, -1.0, 2.5),
                radius: 0.6,
            },
        ),
    ]
}

/// Register the scene's geometry with the SDK
pub fn install(sdk: &FakeSdk, scene: &[(ObjectId, FakeGeometry)]) {
    for (id, geometry) in scene {
        sdk.add_geometry(*id, geometry.clone());
    }
}
