//! Test doubles for the random stream and the scene.
//!
//! Available to this crate's tests and, behind the `testing` feature, to
//! integration tests of downstream crates.

use std::collections::{BTreeMap, VecDeque};

use crate::env::{Message, PcgRng, RngOracle, Scene, SignalId};
use crate::state::Position;

/// Random stream that replays queued values.
///
/// Each `range` call consumes the next queued value, clamped into the
/// requested bounds. Once the queue is empty it falls back to a seeded
/// [`PcgRng`].
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    queued: VecDeque<u32>,
    fallback: PcgRng,
    draws: usize,
}

impl ScriptedRng {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            queued: values.into_iter().collect(),
            fallback: PcgRng::new(0),
            draws: 0,
        }
    }

    pub fn push(&mut self, value: u32) {
        self.queued.push_back(value);
    }

    /// Values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queued.len()
    }

    /// Total number of draws so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RngOracle for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        match self.queued.pop_front() {
            Some(value) => value,
            None => self.fallback.next_u32(),
        }
    }

    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.draws += 1;
        match self.queued.pop_front() {
            Some(value) => value.clamp(min, max),
            None => min + self.fallback.next_u32() % (max - min + 1),
        }
    }
}

/// Something the scene was asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    Log(Message),
    Sound { cue: String, signal: SignalId },
    Visual { cue: String, at: Position, signal: SignalId },
}

/// Scene that records every request and completes signals after a fixed
/// number of frames.
#[derive(Clone, Debug, Default)]
pub struct RecordingScene {
    pub events: Vec<SceneEvent>,
    signal_frames: u32,
    next_signal: u32,
    active: BTreeMap<SignalId, u32>,
    frames: u64,
}

impl RecordingScene {
    /// Signals complete immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals complete after `frames` calls to [`Scene::on_frame`].
    pub fn with_signal_frames(frames: u32) -> Self {
        Self {
            signal_frames: frames,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.events.iter().filter_map(|event| match event {
            SceneEvent::Log(message) => Some(message),
            _ => None,
        })
    }

    /// Message keys in log order.
    pub fn message_keys(&self) -> Vec<&str> {
        self.messages().map(|m| m.key.as_str()).collect()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn start_signal(&mut self) -> SignalId {
        let signal = SignalId(self.next_signal);
        self.next_signal += 1;
        self.active.insert(signal, self.signal_frames);
        signal
    }
}

impl Scene for RecordingScene {
    fn log(&mut self, message: Message) {
        self.events.push(SceneEvent::Log(message));
    }

    fn play_sound(&mut self, cue: &str) -> Option<SignalId> {
        let signal = self.start_signal();
        self.events.push(SceneEvent::Sound {
            cue: cue.to_string(),
            signal,
        });
        Some(signal)
    }

    fn spawn_visual(&mut self, cue: &str, at: Position) -> Option<SignalId> {
        let signal = self.start_signal();
        self.events.push(SceneEvent::Visual {
            cue: cue.to_string(),
            at,
            signal,
        });
        Some(signal)
    }

    fn is_signal_done(&self, signal: SignalId) -> bool {
        self.active.get(&signal).is_none_or(|left| *left == 0)
    }

    fn on_frame(&mut self) {
        self.frames += 1;
        for left in self.active.values_mut() {
            *left = left.saturating_sub(1);
        }
    }
}
