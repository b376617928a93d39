//! Conversions between the 2D authoring plane and the 3D world.
//!
//! Authoring space is the plane shapes are described in: `x` grows to the
//! right, `y` grows downward. World space is right-handed with `Y` up, so the
//! authoring plane lies on the ground (`y == 0`) and authoring `y` becomes
//! world depth (`z`).

use glam::DVec3;

use crate::geometry::Point;

/// World up axis.
pub const WORLD_UP: DVec3 = DVec3::Y;

/// Map an authoring point onto the world ground plane.
pub fn to_world_3d(p: Point) -> DVec3 {
    DVec3::new(p.x, 0.0, p.y)
}

/// Project a world point back onto the authoring plane, dropping elevation.
pub fn to_authoring_2d(v: DVec3) -> Point {
    Point::new(v.x, v.z)
}

/// Rotate `p` about the origin by `degrees`.
pub fn rotate_2d(p: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Authoring rotations run the other way round the world up axis.
pub fn to_world_rotation(degrees: f64) -> f64 {
    -degrees.to_radians()
}

/// Offset from a rectangle's top-left corner to its centre once the
/// rectangle is rotated by `degrees` about that corner.
pub fn rect_center_offset(width: f64, height: f64, degrees: f64) -> Point {
    rotate_2d(Point::new(width / 2.0, height / 2.0), degrees)
}

/// Angle from `v1` to `v2` in degrees, in `(-180, 180]`.
///
/// The sign follows the vertical component of `v1 × v2`: negative when it
/// points along [`WORLD_UP`]. Zero-length inputs yield an arbitrary sign.
pub fn signed_angle_between(v1: DVec3, v2: DVec3) -> f64 {
    let sign = if v1.cross(v2).dot(WORLD_UP) > 0.0 {
        -1.0
    } else {
        1.0
    };
    sign * v1.angle_between(v2).to_degrees()
}
