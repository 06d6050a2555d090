//! Script component
//!
//! Holds a path to a user script and tracks its lifecycle. Executing the
//! script belongs to a scripting backend, which this crate does not ship.

use crate::ecs::component::{
    component_identity, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext,
};
use crate::io::{StreamError, StreamReader, StreamWriter};

/// Lifecycle of a [`Script`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScriptState {
    /// Not started yet, or no path set
    #[default]
    Unloaded,
    /// Started and receiving updates
    Running,
    /// Stopped by `on_disable`
    Disabled,
}

/// User script reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    id: ComponentId,
    script_path: String,
    state: ScriptState,
    update_count: u64,
}

impl Script {
    /// Script source path
    pub fn script_path(&self) -> &str {
        &self.script_path
    }

    /// Point at a different script. A running script is unloaded.
    pub fn set_script_path(&mut self, path: impl Into<String>) {
        self.script_path = path.into();
        self.state = ScriptState::Unloaded;
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScriptState {
        self.state
    }

    /// Number of updates received while running
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Component for Script {
    component_identity!(ComponentType::Script);

    fn start(&mut self) {
        if self.script_path.is_empty() {
            log::warn!("Script {} has no path, not starting", self.id);
            return;
        }
        log::debug!("Starting script {}", self.script_path);
        self.state = ScriptState::Running;
    }

    fn on_disable(&mut self) {
        self.state = ScriptState::Disabled;
    }

    fn update(&mut self) {
        if self.state == ScriptState::Running {
            self.update_count += 1;
        }
    }

    fn remove(&mut self) {
        self.state = ScriptState::Unloaded;
    }

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_str(&self.script_path)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        let path = stream.read_string()?;
        self.set_script_path(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_without_path_stays_unloaded() {
        let mut script = Script::default();
        script.start();
        script.update();

        assert_eq!(script.state(), ScriptState::Unloaded);
        assert_eq!(script.update_count(), 0);
    }

    #[test]
    fn test_script_state_machine() {
        let mut script = Script::default();
        script.set_script_path("scripts/rotate.rs");

        script.start();
        assert_eq!(script.state(), ScriptState::Running);
        script.update();
        script.update();
        assert_eq!(script.update_count(), 2);

        script.on_disable();
        script.update();
        assert_eq!(script.state(), ScriptState::Disabled);
        assert_eq!(script.update_count(), 2);
    }
}
