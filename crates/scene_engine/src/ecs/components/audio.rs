//! Audio components
//!
//! [`AudioSource`] keeps playback settings and a playing flag; decoding and
//! mixing are left to an audio backend.

use crate::ecs::component::{
    component_identity, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext,
};
use crate::io::{StreamError, StreamReader, StreamWriter};

/// Sound emitter
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSource {
    id: ComponentId,
    /// Path of the clip to play
    pub audio_clip_path: String,
    /// Silences output without stopping playback
    pub mute: bool,
    /// Start playing when the entity starts
    pub play_on_awake: bool,
    /// Restart the clip when it ends
    pub looping: bool,
    /// Channel priority, 0 is highest
    pub priority: i32,
    /// Volume in [0, 1]
    pub volume: f32,
    /// Playback speed multiplier
    pub pitch: f32,
    /// Stereo pan in [-1, 1]
    pub pan: f32,
    playing: bool,
}

impl Default for AudioSource {
    fn default() -> Self {
        Self {
            id: 0,
            audio_clip_path: String::new(),
            mute: false,
            play_on_awake: true,
            looping: true,
            priority: 128,
            volume: 1.0,
            pitch: 1.0,
            pan: 0.0,
            playing: false,
        }
    }
}

impl AudioSource {
    /// Start playback
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        log::debug!("Playing audio clip {:?}", self.audio_clip_path);
        self.playing = true;
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Whether the source is playing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Volume after mute is applied
    pub fn effective_volume(&self) -> f32 {
        if self.mute {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }
}

impl Component for AudioSource {
    component_identity!(ComponentType::AudioSource);

    fn start(&mut self) {
        if self.play_on_awake {
            self.play();
        }
    }

    fn on_disable(&mut self) {
        self.stop();
    }

    fn remove(&mut self) {
        self.stop();
    }

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_str(&self.audio_clip_path)?;
        stream.write_bool(self.mute)?;
        stream.write_bool(self.play_on_awake)?;
        stream.write_bool(self.looping)?;
        stream.write_i32(self.priority)?;
        stream.write_f32(self.volume)?;
        stream.write_f32(self.pitch)?;
        stream.write_f32(self.pan)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.audio_clip_path = stream.read_string()?;
        self.mute = stream.read_bool()?;
        self.play_on_awake = stream.read_bool()?;
        self.looping = stream.read_bool()?;
        self.priority = stream.read_i32()?;
        self.volume = stream.read_f32()?;
        self.pitch = stream.read_f32()?;
        self.pan = stream.read_f32()?;
        Ok(())
    }
}

/// Sound receiver, usually on the camera entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioListener {
    id: ComponentId,
}

impl Component for AudioListener {
    component_identity!(ComponentType::AudioListener);

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
