//! Shared deterministic random stream.
//!
//! Every random decision in a resolution (accuracy, critical, variance,
//! one-of-N choices, chance conditions) draws from the same stream in a fixed
//! order. Given the same seed and the same action, resolution replays
//! exactly.

/// Deterministic random stream consumed by resolution.
pub trait RngOracle: Send {
    /// Advance the stream and return the next raw value.
    fn next_u32(&mut self) -> u32;

    /// Value in `[min, max]` inclusive. Returns `min` when the range is empty.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = max - min + 1;
        min + (self.next_u32() % span)
    }

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&mut self) -> u32 {
        self.range(1, 100)
    }

    /// `true` with `percent`% probability, drawing from `0..100`.
    fn chance(&mut self, percent: u32) -> bool {
        self.range(0, 99) < percent
    }

    /// Uniform index into a list of `len` entries; `None` for an empty list
    /// (no value is drawn in that case).
    fn pick(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let last = u32::try_from(len - 1).unwrap_or(u32::MAX);
        Some(self.range(0, last) as usize)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output from 64-bit state. The state advances on every
/// draw, so one instance is one stream.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Self::pcg_step(seed),
        }
    }

    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let out = Self::pcg_output(self.state);
        self.state = Self::pcg_step(self.state);
        out
    }
}

/// Derive a per-action seed from a battle seed.
///
/// Mixes the battle seed with the turn number and acting character so every
/// action gets its own reproducible stream.
pub fn action_seed(battle_seed: u64, turn: u64, actor: u16) -> u64 {
    // SplitMix64 / FxHash style mixing constants.
    let mut hash = battle_seed;
    hash ^= turn.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(actor).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
