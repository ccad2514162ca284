/// Per-axis rotation state and the point rotator
use nalgebra::{Point3, Rotation3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Combined rotation, X applied first, then Y, then Z
    pub fn matrix(&self) -> Rotation3<f32> {
        Rotation3::from_axis_angle(&nalgebra::Vector3::z_axis(), self.z)
            * Rotation3::from_axis_angle(&nalgebra::Vector3::y_axis(), self.y)
            * Rotation3::from_axis_angle(&nalgebra::Vector3::x_axis(), self.x)
    }
}

/// Rotate a point about the X, Y and Z axes.
///
/// Every coordinate of the result is snapped to the nearest integer (ties to
/// even). The snapping happens on each call, so chained rotations accumulate
/// rounding error.
pub fn rotate(point: &Point3<f32>, angles: &RotationState) -> Point3<f32> {
    rotate_exact(point, angles).map(f32::round_ties_even)
}

/// Rotation without the integer snap
pub fn rotate_exact(point: &Point3<f32>, angles: &RotationState) -> Point3<f32> {
    angles.matrix() * point
}
