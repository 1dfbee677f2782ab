//! Discrete index animation state machine.
//!
//! The animation counts a time budget down and steps an integer index each
//! time the budget runs out, adding the new frame's delay back. Large deltas
//! step through several frames in one update; listeners hear about the final
//! index only.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{is_valid_delay, is_valid_speed, IndexAnimationCfg, PlayMode, FALLBACK_DELAY};
use crate::ids::ListenerId;
use crate::listeners::{IndexListener, ListenerRegistry, Subscription};

/// Travel direction through the frame sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Playing,
    Stopped,
}

/// Steps an index through `0..frames_count()` with per-frame hold durations.
#[derive(Debug)]
pub struct IndexAnimation {
    delays: Vec<f32>,
    frames_count: usize,
    index: usize,
    direction: Direction,
    time_remaining: f32,
    speed: f32,
    loop_count: u32,
    loops_remaining: u32,
    playing: bool,
    duration: f32,
    play_mode: PlayMode,
    uses_scaled_time: bool,
    listeners: ListenerRegistry,
}

impl IndexAnimation {
    /// Build from a config. Never fails: unusable delay lists produce a
    /// static animation (one frame, never advances) and log a warning.
    pub fn new(cfg: IndexAnimationCfg) -> Self {
        let IndexAnimationCfg {
            delays,
            uses_scaled_time,
            loop_count,
            play_mode,
            speed,
        } = cfg;

        let duration = delays.iter().sum();
        let frames_count = if delays.len() < 2 {
            log::warn!(
                "[IndexAnimation::new] {} frame(s) configured; animation will stay static",
                delays.len()
            );
            1
        } else if let Some((i, d)) = delays
            .iter()
            .copied()
            .enumerate()
            .find(|(_, d)| !is_valid_delay(*d))
        {
            log::warn!(
                "[IndexAnimation::new] frame {i} has invalid delay {d}; animation will stay static"
            );
            1
        } else {
            delays.len()
        };

        let speed = if is_valid_speed(speed) {
            speed
        } else {
            log::warn!("[IndexAnimation::new] invalid speed {speed}; using 1.0");
            1.0
        };

        let mut anim = Self {
            delays,
            frames_count,
            index: 0,
            direction: Direction::Forward,
            time_remaining: 0.0,
            speed,
            loop_count,
            loops_remaining: loop_count,
            playing: false,
            duration,
            play_mode,
            uses_scaled_time,
            listeners: ListenerRegistry::new(),
        };
        anim.time_remaining = anim.current_delay();
        anim
    }

    // ---- playback control ----

    /// Start playback from the current position. The next update advances at
    /// least one frame. No-op while already playing.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        self.time_remaining = 0.0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Back to frame 0, moving forward, with the loop budget restored.
    /// Does not notify listeners and leaves the playing flag alone.
    pub fn rewind(&mut self) {
        self.index = 0;
        self.direction = Direction::Forward;
        self.time_remaining = self.current_delay();
        self.loops_remaining = self.loop_count;
    }

    /// Set the playback rate. Rejects non-positive and non-finite values.
    pub fn set_speed(&mut self, speed: f32) -> bool {
        if !is_valid_speed(speed) {
            log::warn!("[IndexAnimation::set_speed] rejected speed {speed}");
            return false;
        }
        self.speed = speed;
        true
    }

    pub fn set_play_mode(&mut self, play_mode: PlayMode) {
        self.play_mode = play_mode;
    }

    /// Takes full effect at the next [`rewind`](Self::rewind).
    pub fn set_loop_count(&mut self, loop_count: u32) {
        self.loop_count = loop_count;
    }

    // ---- time ----

    /// Advance by `delta_time` seconds of the animation's time domain.
    pub fn update(&mut self, delta_time: f32) {
        if !self.playing || self.is_static() || !delta_time.is_finite() {
            return;
        }
        self.time_remaining -= delta_time * self.speed;
        if self.time_remaining > 0.0 {
            return;
        }

        let start = self.index;
        if !self.time_remaining.is_finite() {
            self.drain_backlog();
            if self.index != start {
                self.notify();
            }
            return;
        }

        let mut moved = false;
        let mut stalled = 0usize;
        loop {
            let previous = self.index;
            self.index = self.next_index();
            moved |= self.index != previous;
            if !self.playing {
                break;
            }
            let before = self.time_remaining;
            self.time_remaining += self.delays[self.index];
            if self.time_remaining >= 0.0 {
                break;
            }
            if self.skip_whole_cycles() {
                moved = true;
                if self.time_remaining >= 0.0 {
                    break;
                }
            }
            if self.time_remaining > before {
                stalled = 0;
                continue;
            }
            // Delays no longer register against the backlog.
            stalled += 1;
            if stalled > 2 * self.frames_count {
                let at = self.index;
                self.drain_backlog();
                moved |= self.index != at;
                break;
            }
        }

        if moved {
            self.notify();
        }
    }

    /// Length of one cycle that returns the animation to the same frame in
    /// an equivalent state, and the loops it spends.
    ///
    /// A linear lap crosses one boundary. A yoyo round trip holds every frame
    /// twice except the two ends and crosses both. Sitting on an end while
    /// facing inward means that end's crossing is already spent, so a round
    /// trip from there is not equivalent when loops are bounded.
    fn cycle(&self) -> Option<(f32, u32)> {
        match self.play_mode {
            PlayMode::Linear => Some((self.duration, 1)),
            PlayMode::Yoyo => {
                let max = self.max_index();
                let facing_inward = (self.index == 0 && self.direction == Direction::Forward)
                    || (self.index == max && self.direction == Direction::Backward);
                if self.loop_count != 0 && facing_inward {
                    return None;
                }
                Some((2.0 * self.duration - self.delays[0] - self.delays[max], 2))
            }
        }
    }

    /// Consume whole cycles of the time backlog without stepping frames.
    /// Bounded loops always keep at least one loop to be stepped through.
    /// Returns true if anything was skipped.
    fn skip_whole_cycles(&mut self) -> bool {
        let Some((period, loops_per_cycle)) = self.cycle() else {
            return false;
        };
        if period <= 0.0 || self.time_remaining > -period {
            return false;
        }
        if self.loop_count == 0 {
            self.time_remaining %= period;
            return true;
        }
        let wanted = (-self.time_remaining / period).floor() as u64;
        let affordable = u64::from(self.loops_remaining.saturating_sub(1) / loops_per_cycle);
        let skipped = wanted.min(affordable);
        if skipped == 0 {
            return false;
        }
        self.loops_remaining -= skipped as u32 * loops_per_cycle;
        self.time_remaining += skipped as f32 * period;
        true
    }

    /// Resolve a backlog too large to step through. Bounded loops run out
    /// and stop at the end they would reach; unbounded ones drop the backlog
    /// and hold the current frame.
    fn drain_backlog(&mut self) {
        if self.loop_count == 0 {
            log::warn!(
                "[IndexAnimation::update] time backlog {} too large to step; dropping it",
                self.time_remaining
            );
            self.time_remaining = self.current_delay();
            return;
        }
        let crossings = self.loops_remaining.max(1);
        let ahead_is_max = self.direction == Direction::Forward;
        let ends_at_max = match self.play_mode {
            PlayMode::Linear => ahead_is_max,
            PlayMode::Yoyo => ahead_is_max == (crossings % 2 == 1),
        };
        let (index, direction) = if ends_at_max {
            (self.max_index(), Direction::Forward)
        } else {
            (0, Direction::Backward)
        };
        log::debug!(
            "[IndexAnimation::update] backlog exhausts the loop budget; stopping at index {index}"
        );
        self.index = index;
        self.direction = direction;
        self.loops_remaining = 0;
        self.time_remaining = self.current_delay();
        self.stop();
    }

    /// Index after one step in the current direction. At a boundary this
    /// spends one loop, and may stop playback (clamping to the boundary) or
    /// flip direction.
    fn next_index(&mut self) -> usize {
        let max = self.max_index();
        match self.direction {
            Direction::Forward => {
                if self.index < max {
                    return self.index + 1;
                }
                if self.spend_loop() {
                    return max;
                }
                match self.play_mode {
                    PlayMode::Linear => 0,
                    PlayMode::Yoyo => {
                        self.direction = Direction::Backward;
                        max - 1
                    }
                }
            }
            Direction::Backward => {
                if self.index > 0 {
                    return self.index - 1;
                }
                if self.spend_loop() {
                    return 0;
                }
                match self.play_mode {
                    PlayMode::Linear => max,
                    PlayMode::Yoyo => {
                        self.direction = Direction::Forward;
                        1
                    }
                }
            }
        }
    }

    /// True when the loop budget is exhausted and playback stopped.
    fn spend_loop(&mut self) -> bool {
        if self.loop_count == 0 {
            return false;
        }
        self.loops_remaining = self.loops_remaining.saturating_sub(1);
        if self.loops_remaining > 0 {
            return false;
        }
        log::debug!(
            "[IndexAnimation::update] loop budget of {} spent; stopping at index {}",
            self.loop_count,
            self.index
        );
        self.stop();
        true
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.dispatch(self, self.index);
        self.listeners = listeners;
    }

    // ---- listeners ----

    /// Subscribe a callback and keep it alive for the animation's lifetime.
    pub fn subscribe(&mut self, callback: Arc<IndexListener>) -> Subscription {
        self.listeners.subscribe(callback)
    }

    /// Subscribe without owning the callback; the entry lapses once the
    /// caller drops its last `Arc`.
    pub fn subscribe_weak(&mut self, callback: &Arc<IndexListener>) -> Subscription {
        self.listeners.subscribe_weak(callback)
    }

    /// Convenience for closures; always a fresh subscription.
    pub fn on_index_changed<F>(&mut self, f: F) -> ListenerId
    where
        F: Fn(&IndexAnimation, usize) + Send + Sync + 'static,
    {
        self.listeners.subscribe(Arc::new(f)).id()
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn unsubscribe_callback(&mut self, callback: &Arc<IndexListener>) -> bool {
        self.listeners.unsubscribe_callback(callback)
    }

    /// Subscribed listeners, counting lapsed weak entries not yet purged.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    // ---- accessors ----

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn frames_count(&self) -> usize {
        self.frames_count
    }

    #[inline]
    pub fn max_index(&self) -> usize {
        self.frames_count - 1
    }

    /// Fewer than two usable frames; never advances and is never scheduled.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.frames_count < 2
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> PlaybackState {
        if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    #[inline]
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    #[inline]
    pub fn loops_remaining(&self) -> u32 {
        self.loops_remaining
    }

    /// Sum of the configured delays.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    #[inline]
    pub fn uses_scaled_time(&self) -> bool {
        self.uses_scaled_time
    }

    pub fn delays(&self) -> &[f32] {
        &self.delays
    }

    /// Hold duration of the current frame.
    pub fn current_delay(&self) -> f32 {
        if self.is_static() {
            return FALLBACK_DELAY;
        }
        self.delays[self.index]
    }
}
