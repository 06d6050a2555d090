//! Light component
//!
//! Position and direction come from the owning entity's Transform, so the
//! component itself only stores emission parameters.

use crate::ecs::component::{
    component_identity, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext,
};
use crate::foundation::math::Vec3;
use crate::io::{StreamError, StreamReader, StreamWriter};

/// Types of lights supported by the lighting system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightType {
    /// Directional light (like sunlight) with parallel rays
    #[default]
    Directional,
    /// Point light that radiates in all directions from a position
    Point,
    /// Spot light that creates a cone of light from a position
    Spot,
}

impl LightType {
    /// Persisted discriminant
    pub fn to_u32(self) -> u32 {
        match self {
            LightType::Directional => 0,
            LightType::Point => 1,
            LightType::Spot => 2,
        }
    }

    /// Decode a persisted discriminant
    pub fn from_u32(value: u32) -> Result<Self, StreamError> {
        match value {
            0 => Ok(LightType::Directional),
            1 => Ok(LightType::Point),
            2 => Ok(LightType::Spot),
            _ => Err(StreamError::InvalidDiscriminant { kind: "LightType", value }),
        }
    }
}

/// Light source attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    id: ComponentId,
    /// The type of light (directional, point, or spot)
    pub light_type: LightType,
    /// Whether this light should cast shadows
    pub cast_shadows: bool,
    /// RGB color values for the light (0.0 to 1.0 range)
    pub color: Vec3,
    /// Maximum range for point/spot lights
    pub range: f32,
    /// Light intensity multiplier
    pub intensity: f32,
    /// Cone angle for spot lights, radians
    pub angle: f32,
    /// Shadow depth bias
    pub bias: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            id: 0,
            light_type: LightType::Directional,
            cast_shadows: true,
            color: Vec3::new(1.0, 0.76, 0.57),
            range: 1.0,
            intensity: 2.0,
            angle: 0.5,
            bias: 0.03,
        }
    }
}

impl Light {
    /// Intensity-scaled color
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

impl Component for Light {
    component_identity!(ComponentType::Light);

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_u32(self.light_type.to_u32())?;
        stream.write_bool(self.cast_shadows)?;
        stream.write_vec3(&self.color)?;
        stream.write_f32(self.range)?;
        stream.write_f32(self.intensity)?;
        stream.write_f32(self.angle)?;
        stream.write_f32(self.bias)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.light_type = LightType::from_u32(stream.read_u32()?)?;
        self.cast_shadows = stream.read_bool()?;
        self.color = stream.read_vec3()?;
        self.range = stream.read_f32()?;
        self.intensity = stream.read_f32()?;
        self.angle = stream.read_f32()?;
        self.bias = stream.read_f32()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::registry::EntityRegistry;
    use crate::io::{BinaryReader, BinaryWriter};
    use crate::scene::Scene;

    #[test]
    fn test_light_body_layout() {
        let scene = Scene::new();
        let light = Light {
            light_type: LightType::Spot,
            intensity: 4.5,
            ..Light::default()
        };

        let mut writer = BinaryWriter::new(Vec::new());
        light
            .serialize(&mut writer, &SerializeContext { registry: &scene })
            .unwrap();
        let bytes = writer.into_inner();
        // u32 + bool + vec3 + 4 x f32
        assert_eq!(bytes.len(), 4 + 1 + 12 + 16);

        let mut restored = Light::default();
        let ctx = DeserializeContext { registry: &scene, siblings: &[] };
        restored
            .deserialize(&mut BinaryReader::new(bytes.as_slice()), &ctx)
            .unwrap();
        assert_eq!(restored.light_type, LightType::Spot);
        assert_eq!(restored.intensity, 4.5);
        assert!(scene.all_entities().is_empty());
    }
}
