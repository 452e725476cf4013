//! Frame pacing.

use std::time::Duration;

use async_trait::async_trait;

/// Decides how long one frame lasts.
#[async_trait]
pub trait Pacer: Send {
    /// Completes once the next frame has elapsed.
    async fn next_frame(&mut self);

    /// Frames elapsed so far.
    fn frames(&self) -> u64;
}

/// Headless pacer: frames elapse immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantPacer {
    frames: u64,
}

impl InstantPacer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Pacer for InstantPacer {
    async fn next_frame(&mut self) {
        self.frames += 1;
    }

    fn frames(&self) -> u64 {
        self.frames
    }
}

/// Sleeps a fixed duration per frame.
#[derive(Clone, Copy, Debug)]
pub struct FixedRatePacer {
    frame: Duration,
    frames: u64,
}

impl FixedRatePacer {
    pub fn new(frame: Duration) -> Self {
        Self { frame, frames: 0 }
    }

    /// Pacer running at `fps` frames per second (at least one).
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }
}

#[async_trait]
impl Pacer for FixedRatePacer {
    async fn next_frame(&mut self) {
        tokio::time::sleep(self.frame).await;
        self.frames += 1;
    }

    fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn instant_pacer_counts_frames() {
        let mut pacer = InstantPacer::new();
        for _ in 0..3 {
            pacer.next_frame().await;
        }
        assert_eq!(pacer.frames(), 3);
    }

    #[test]
    fn fixed_rate_from_fps() {
        assert_eq!(
            FixedRatePacer::from_fps(50).frame_duration(),
            Duration::from_millis(20)
        );
        assert_eq!(
            FixedRatePacer::from_fps(0).frame_duration(),
            Duration::from_secs(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_rate_pacer_sleeps_per_frame() {
        let mut pacer = FixedRatePacer::from_fps(10);
        let started = tokio::time::Instant::now();
        pacer.next_frame().await;
        pacer.next_frame().await;
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(pacer.frames(), 2);
    }
}
