//! Math utilities and types
//!
//! Provides the vector, quaternion and matrix types the scene graph is built on.
//! All coordinates follow Y-up right-handed conventions with -Z as forward.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Rotation3,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World up direction
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// World forward direction (-Z in right-handed Y-up space)
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// World right direction
pub const RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Scale below which an axis is treated as collapsed during decomposition
const DEGENERATE_SCALE: f32 = 1e-8;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from its three parts
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Convert to a transformation matrix.
    ///
    /// Scale is applied first, then rotation, then translation.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Decompose a transformation matrix into scale, rotation and translation.
    ///
    /// Shear introduced by non-uniform parent scale is discarded. A collapsed
    /// axis keeps a zero scale and contributes no rotation information.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let axis_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31);
        let axis_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32);
        let axis_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33);
        let scale = Vec3::new(axis_x.magnitude(), axis_y.magnitude(), axis_z.magnitude());

        let divisor = |s: f32| if s > DEGENERATE_SCALE { s } else { 1.0 };
        let rotation_matrix = Mat3::from_columns(&[
            axis_x / divisor(scale.x),
            axis_y / divisor(scale.y),
            axis_z / divisor(scale.z),
        ]);
        let rotation = if scale.iter().all(|s| *s > DEGENERATE_SCALE) {
            Quat::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_matrix))
        } else {
            Quat::identity()
        };

        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Combine this transform with another (`self` is the parent)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Transform {
        let inv_scale = reciprocal(&self.scale);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_scale.component_mul(&(inv_rotation * -self.position));

        Transform {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }
}

/// Componentwise reciprocal. Zero components stay zero.
pub fn reciprocal(v: &Vec3) -> Vec3 {
    v.map(|c| if c == 0.0 { 0.0 } else { 1.0 / c })
}

/// Build a unit quaternion from raw components, renormalizing when needed.
///
/// A zero-length quaternion yields the identity rotation.
pub fn quat_from_components(x: f32, y: f32, z: f32, w: f32) -> Quat {
    let raw = Quaternion::new(w, x, y, z);
    let norm_squared = raw.norm_squared();
    if norm_squared <= f32::EPSILON {
        Quat::identity()
    } else if approx::relative_eq!(norm_squared, 1.0, epsilon = 1e-6) {
        Unit::new_unchecked(raw)
    } else {
        Unit::new_normalize(raw)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::constants::HALF_PI;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_roundtrip() {
        let original = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(&Unit::new_normalize(Vec3::new(1.0, 1.0, 1.0)), 0.5),
            Vec3::new(2.0, 1.5, 0.8),
        );

        let decomposed = Transform::from_matrix(&original.to_matrix());

        assert_relative_eq!(decomposed.position, original.position, epsilon = 1e-5);
        assert_relative_eq!(decomposed.scale, original.scale, epsilon = 1e-5);
        let dot = original.rotation.coords.dot(&decomposed.rotation.coords);
        assert!(dot.abs() > 0.999, "Quaternion rotation mismatch: dot product = {}", dot);
    }

    #[test]
    fn test_collapsed_axis_does_not_produce_nan() {
        let flat = Transform::new(Vec3::new(1.0, 0.0, 0.0), Quat::identity(), Vec3::new(1.0, 0.0, 1.0));
        let decomposed = Transform::from_matrix(&flat.to_matrix());

        assert!(decomposed.position.iter().all(|c| c.is_finite()));
        assert!(decomposed.rotation.coords.iter().all(|c| c.is_finite()));
        assert_relative_eq!(decomposed.scale, Vec3::new(1.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_combine_matches_matrix_product() {
        let parent = Transform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let child = Transform::from_matrix(&Mat4::new_translation(&Vec3::new(0.0, 0.0, 1.0)));

        let combined = parent.combine(&child);
        let by_matrix = Transform::from_matrix(&(parent.to_matrix() * child.to_matrix()));

        assert_relative_eq!(combined.position, by_matrix.position, epsilon = 1e-5);
        assert_relative_eq!(combined.position, Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_inverse_cancels() {
        let t = Transform::new(
            Vec3::new(2.0, 3.0, 1.0),
            Quat::from_axis_angle(&Vec3::y_axis(), 0.785),
            Vec3::new(2.0, 2.0, 2.0),
        );

        let identity = t.combine(&t.inverse());

        assert_relative_eq!(identity.position, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(identity.scale, Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_quat_from_components() {
        assert_eq!(quat_from_components(0.0, 0.0, 0.0, 0.0), Quat::identity());

        let q = quat_from_components(0.0, 0.0, 0.0, 2.0);
        assert_relative_eq!(q.into_inner().norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reciprocal_keeps_zero() {
        assert_eq!(reciprocal(&Vec3::new(2.0, 0.0, -4.0)), Vec3::new(0.5, 0.0, -0.25));
    }
}
