//! Construction-time configuration for index animations.

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Hold duration used by static (fewer than two frames) animations.
pub const FALLBACK_DELAY: f32 = 0.1;

/// How the index behaves when it runs off either end of the sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Wrap from the last frame back to the first (and vice versa).
    #[default]
    Linear,
    /// Reverse direction at each boundary.
    Yoyo,
}

/// Configuration for [`crate::IndexAnimation`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexAnimationCfg {
    /// Hold duration per frame, in seconds of the chosen time domain.
    pub delays: Vec<f32>,
    pub uses_scaled_time: bool,
    /// Traversals before playback stops on its own; 0 loops forever.
    pub loop_count: u32,
    pub play_mode: PlayMode,
    pub speed: f32,
}

impl Default for IndexAnimationCfg {
    fn default() -> Self {
        Self {
            delays: Vec::new(),
            uses_scaled_time: true,
            loop_count: 0,
            play_mode: PlayMode::Linear,
            speed: 1.0,
        }
    }
}

impl IndexAnimationCfg {
    pub fn new(delays: impl Into<Vec<f32>>) -> Self {
        Self {
            delays: delays.into(),
            ..Self::default()
        }
    }

    /// `frames` frames all held for `delay`.
    pub fn uniform(frames: usize, delay: f32) -> Self {
        Self::new(vec![delay; frames])
    }

    pub fn with_loop_count(mut self, loop_count: u32) -> Self {
        self.loop_count = loop_count;
        self
    }

    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.play_mode = play_mode;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Drive with the real elapsed delta instead of the time-scaled one.
    pub fn unscaled(mut self) -> Self {
        self.uses_scaled_time = false;
        self
    }

    /// Sum of all delays.
    pub fn duration(&self) -> f32 {
        self.delays.iter().sum()
    }

    /// Strict check used when loading configuration.
    ///
    /// Fewer than two frames is not an error here: such configs are valid
    /// and produce a static animation.
    pub fn validate(&self) -> Result<(), AnimationError> {
        if let Some((index, value)) = self
            .delays
            .iter()
            .copied()
            .enumerate()
            .find(|(_, d)| !is_valid_delay(*d))
        {
            return Err(AnimationError::InvalidDelay { index, value });
        }
        if !is_valid_speed(self.speed) {
            return Err(AnimationError::InvalidSpeed { value: self.speed });
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn is_valid_delay(delay: f32) -> bool {
    delay.is_finite() && delay > 0.0
}

#[inline]
pub(crate) fn is_valid_speed(speed: f32) -> bool {
    speed.is_finite() && speed > 0.0
}
