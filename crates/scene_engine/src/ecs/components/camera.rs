//! Camera component

use crate::ecs::component::{
    component_identity, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext,
};
use crate::foundation::math::{constants::DEG_TO_RAD, Mat4, Vec4};
use crate::io::{StreamError, StreamReader, StreamWriter};

/// Camera projection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Projection {
    /// Perspective projection
    #[default]
    Perspective,
    /// Orthographic projection
    Orthographic,
}

impl Projection {
    /// Persisted discriminant
    pub fn to_u32(self) -> u32 {
        match self {
            Projection::Perspective => 0,
            Projection::Orthographic => 1,
        }
    }

    /// Decode a persisted discriminant
    pub fn from_u32(value: u32) -> Result<Self, StreamError> {
        match value {
            0 => Ok(Projection::Perspective),
            1 => Ok(Projection::Orthographic),
            _ => Err(StreamError::InvalidDiscriminant { kind: "Projection", value }),
        }
    }
}

/// Viewpoint attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    id: ComponentId,
    /// Projection mode
    pub projection: Projection,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// RGBA clear color
    pub clear_color: Vec4,
    /// Vertical extent of the orthographic view volume (not persisted)
    pub orthographic_size: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            id: 0,
            projection: Projection::Perspective,
            fov_degrees: 45.0,
            near: 0.3,
            far: 1000.0,
            clear_color: Vec4::new(0.396, 0.611, 0.937, 1.0),
            orthographic_size: 10.0,
        }
    }
}

impl Camera {
    /// Projection matrix for the given viewport aspect ratio
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective => {
                Mat4::new_perspective(aspect_ratio, self.fov_degrees * DEG_TO_RAD, self.near, self.far)
            }
            Projection::Orthographic => {
                let half_height = 0.5 * self.orthographic_size;
                let half_width = half_height * aspect_ratio;
                Mat4::new_orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }
}

impl Component for Camera {
    component_identity!(ComponentType::Camera);

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_u32(self.projection.to_u32())?;
        stream.write_f32(self.fov_degrees)?;
        stream.write_f32(self.near)?;
        stream.write_f32(self.far)?;
        stream.write_vec4(&self.clear_color)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.projection = Projection::from_u32(stream.read_u32()?)?;
        self.fov_degrees = stream.read_f32()?;
        self.near = stream.read_f32()?;
        self.far = stream.read_f32()?;
        self.clear_color = stream.read_vec4()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_perspective_projection_is_finite() {
        let camera = Camera::default();
        let projection = camera.projection_matrix(16.0 / 9.0);

        assert!(projection.iter().all(|v| v.is_finite()));
        // Points in front of a camera looking down -Z land in front of the near plane
        let clip = projection * Vec3::new(0.0, 0.0, -10.0).push(1.0);
        assert!(clip.w > 0.0);
    }

    #[test]
    fn test_projection_discriminants() {
        assert_eq!(Projection::from_u32(1).unwrap(), Projection::Orthographic);
        assert!(Projection::from_u32(2).is_err());
    }
}
