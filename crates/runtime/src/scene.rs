//! Headless scene that reports through `tracing`.

use std::collections::{BTreeMap, VecDeque};

use battle_core::{Message, Position, Scene, SignalId};
use tracing::{debug, info};

/// Logs every message as a structured event and completes sounds and
/// visuals after a fixed number of frames.
///
/// Only the most recent [`log_capacity`](Self::with_log_capacity) messages
/// are retained; older ones were already emitted through `tracing`.
#[derive(Debug)]
pub struct TracingScene {
    signal_frames: u32,
    next_signal: u32,
    active: BTreeMap<SignalId, u32>,
    logged: VecDeque<Message>,
    log_capacity: usize,
}

impl Default for TracingScene {
    fn default() -> Self {
        Self {
            signal_frames: 0,
            next_signal: 0,
            active: BTreeMap::new(),
            logged: VecDeque::new(),
            log_capacity: Self::DEFAULT_LOG_CAPACITY,
        }
    }
}

impl TracingScene {
    pub const DEFAULT_LOG_CAPACITY: usize = 256;

    /// Signals complete on the first frame check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retains at most `capacity` recent messages. Zero keeps none.
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        while self.logged.len() > capacity {
            self.logged.pop_front();
        }
        self
    }

    /// Signals stay pending for `frames` frames.
    pub fn with_signal_frames(frames: u32) -> Self {
        Self {
            signal_frames: frames,
            ..Self::default()
        }
    }

    /// The retained messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.logged.iter()
    }

    /// Signals not yet complete.
    pub fn pending(&self) -> usize {
        self.active.values().filter(|left| **left > 0).count()
    }

    fn start_signal(&mut self) -> SignalId {
        let signal = SignalId(self.next_signal);
        self.next_signal = self.next_signal.wrapping_add(1);
        self.active.insert(signal, self.signal_frames);
        signal
    }
}

impl Scene for TracingScene {
    fn log(&mut self, message: Message) {
        info!(
            target: "runtime::scene",
            key = %message.key,
            subject = ?message.subject,
            object = ?message.object,
            value = ?message.value,
            "{}",
            message
        );
        if self.log_capacity == 0 {
            return;
        }
        if self.logged.len() == self.log_capacity {
            self.logged.pop_front();
        }
        self.logged.push_back(message);
    }

    fn play_sound(&mut self, cue: &str) -> Option<SignalId> {
        let signal = self.start_signal();
        debug!(target: "runtime::scene", cue, %signal, "sound started");
        Some(signal)
    }

    fn spawn_visual(&mut self, cue: &str, at: Position) -> Option<SignalId> {
        let signal = self.start_signal();
        debug!(
            target: "runtime::scene",
            cue,
            x = at.x,
            y = at.y,
            %signal,
            "visual started"
        );
        Some(signal)
    }

    fn is_signal_done(&self, signal: SignalId) -> bool {
        self.active.get(&signal).is_none_or(|left| *left == 0)
    }

    fn on_frame(&mut self) {
        for left in self.active.values_mut() {
            *left = left.saturating_sub(1);
        }
        self.active.retain(|_, left| *left > 0);
    }
}
