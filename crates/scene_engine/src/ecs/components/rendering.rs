//! Rendering components
//!
//! These only carry references into the asset and render layers (mesh id,
//! material id, environment texture). Drawing itself happens elsewhere.

use crate::ecs::component::{
    component_identity, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext,
};
use crate::foundation::math::Vec3;
use crate::io::{StreamError, StreamReader, StreamWriter};

/// Where the mesh of a [`MeshFilter`] comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeshType {
    /// Loaded from a model file, identified by `mesh_id`
    #[default]
    Imported,
    /// Built-in unit cube
    Cube,
    /// Built-in unit quad
    Quad,
}

impl MeshType {
    /// Persisted discriminant
    pub fn to_u32(self) -> u32 {
        match self {
            MeshType::Imported => 0,
            MeshType::Cube => 1,
            MeshType::Quad => 2,
        }
    }

    /// Decode a persisted discriminant
    pub fn from_u32(value: u32) -> Result<Self, StreamError> {
        match value {
            0 => Ok(MeshType::Imported),
            1 => Ok(MeshType::Cube),
            2 => Ok(MeshType::Quad),
            _ => Err(StreamError::InvalidDiscriminant { kind: "MeshType", value }),
        }
    }
}

/// Reference to the mesh drawn for an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshFilter {
    id: ComponentId,
    /// Mesh source
    pub mesh_type: MeshType,
    /// Asset id of an imported mesh, empty for built-in meshes
    pub mesh_id: String,
}

impl MeshFilter {
    /// Use one of the built-in meshes
    pub fn set_default_mesh(&mut self, mesh_type: MeshType) {
        self.mesh_type = mesh_type;
        self.mesh_id.clear();
    }

    /// Use an imported mesh
    pub fn set_mesh(&mut self, mesh_id: impl Into<String>) {
        self.mesh_type = MeshType::Imported;
        self.mesh_id = mesh_id.into();
    }

    /// Whether a mesh is referenced at all
    pub fn has_mesh(&self) -> bool {
        self.mesh_type != MeshType::Imported || !self.mesh_id.is_empty()
    }
}

impl Component for MeshFilter {
    component_identity!(ComponentType::MeshFilter);

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_u32(self.mesh_type.to_u32())?;
        stream.write_str(&self.mesh_id)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.mesh_type = MeshType::from_u32(stream.read_u32()?)?;
        self.mesh_id = stream.read_string()?;
        Ok(())
    }
}

/// Drawing settings for the mesh of a [`MeshFilter`]
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    id: ComponentId,
    /// Whether the mesh casts shadows
    pub cast_shadows: bool,
    /// Whether the mesh receives shadows
    pub receive_shadows: bool,
    /// Asset id of the material, empty for the default material
    pub material_id: String,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self {
            id: 0,
            cast_shadows: true,
            receive_shadows: true,
            material_id: String::new(),
        }
    }
}

impl Component for MeshRenderer {
    component_identity!(ComponentType::MeshRenderer);

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_bool(self.cast_shadows)?;
        stream.write_bool(self.receive_shadows)?;
        stream.write_str(&self.material_id)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.cast_shadows = stream.read_bool()?;
        self.receive_shadows = stream.read_bool()?;
        self.material_id = stream.read_string()?;
        Ok(())
    }
}

/// Environment cube map. Nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skybox {
    id: ComponentId,
    /// Asset id of the environment texture
    pub environment_texture: String,
}

impl Component for Skybox {
    component_identity!(ComponentType::Skybox);

    fn serialize(
        &self,
        _stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        Ok(())
    }

    fn deserialize(
        &mut self,
        _stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        Ok(())
    }
}

/// A single colored line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Start point
    pub from: Vec3,
    /// End point
    pub to: Vec3,
    /// RGB color
    pub color: Vec3,
}

/// Debug lines submitted at runtime. Nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineRenderer {
    id: ComponentId,
    lines: Vec<Line>,
}

impl LineRenderer {
    /// Queue a line
    pub fn add_line(&mut self, from: Vec3, to: Vec3, color: Vec3) {
        self.lines.push(Line { from, to, color });
    }

    /// Queue the twelve edges of an axis-aligned box
    pub fn add_box(&mut self, min: Vec3, max: Vec3, color: Vec3) {
        let corner = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };

        for a in [false, true] {
            for b in [false, true] {
                self.add_line(corner(false, a, b), corner(true, a, b), color);
                self.add_line(corner(a, false, b), corner(a, true, b), color);
                self.add_line(corner(a, b, false), corner(a, b, true), color);
            }
        }
    }

    /// Queued lines
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Drop all queued lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Component for LineRenderer {
    component_identity!(ComponentType::LineRenderer);

    fn remove(&mut self) {
        self.clear();
    }

    fn serialize(
        &self,
        _stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        Ok(())
    }

    fn deserialize(
        &mut self,
        _stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        Ok(())
    }
}
