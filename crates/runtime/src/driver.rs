//! Pumps an [`ActionRun`] until it finishes.

use battle_core::{
    ActionReport, ActionRequest, ActionRun, BattleEnv, Battlefield, Progress, RngOracle, Scene,
    Suspension, World,
};
use tracing::{debug, info};

use crate::error::{DriverError, Result};
use crate::pacer::Pacer;

/// Driver limits.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Frames to wait on a single signal before giving up.
    pub max_signal_frames: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_signal_frames: 600,
        }
    }
}

/// Runs actions, letting frames elapse whenever resolution suspends.
///
/// The scene sees one [`Scene::on_frame`] per elapsed frame.
pub struct Driver<P> {
    pacer: P,
    config: DriverConfig,
}

impl<P: Pacer> Driver<P> {
    pub fn new(pacer: P) -> Self {
        Self::with_config(pacer, DriverConfig::default())
    }

    pub fn with_config(pacer: P, config: DriverConfig) -> Self {
        Self { pacer, config }
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Starts `request` and drives it to completion.
    pub async fn run(
        &mut self,
        env: BattleEnv<'_>,
        field: &mut Battlefield,
        scene: &mut dyn Scene,
        rng: &mut dyn RngOracle,
        request: ActionRequest,
    ) -> Result<ActionReport> {
        let mut run = ActionRun::start(env, field, request)?;
        self.drive(&mut run, field, scene, rng).await?;

        let report = run.into_report();
        info!(
            target: "runtime::driver",
            user = %report.user,
            target_id = %report.target,
            strikes = report.strikes.len(),
            damage = report.total_damage,
            healed = report.total_healed,
            frames = self.pacer.frames(),
            "action resolved"
        );
        Ok(report)
    }

    /// Resumes `run` until it reports [`Progress::Finished`].
    pub async fn drive(
        &mut self,
        run: &mut ActionRun<'_>,
        field: &mut Battlefield,
        scene: &mut dyn Scene,
        rng: &mut dyn RngOracle,
    ) -> Result<()> {
        loop {
            let progress = {
                let mut world = World::new(&mut *field, &mut *scene, &mut *rng);
                run.resume(&mut world)
            };

            match progress {
                Progress::Finished => return Ok(()),
                Progress::Suspended(Suspension::Frames(frames)) => {
                    debug!(target: "runtime::driver", frames, "waiting frames");
                    for _ in 0..frames {
                        self.tick(scene).await;
                    }
                }
                Progress::Suspended(Suspension::Signal(signal)) => {
                    debug!(target: "runtime::driver", %signal, "waiting on signal");
                    let mut waited = 0;
                    while !scene.is_signal_done(signal) {
                        if waited >= self.config.max_signal_frames {
                            return Err(DriverError::SignalTimeout {
                                signal,
                                frames: waited,
                            });
                        }
                        self.tick(scene).await;
                        waited += 1;
                    }
                }
            }
        }
    }

    async fn tick(&mut self, scene: &mut dyn Scene) {
        self.pacer.next_frame().await;
        scene.on_frame();
    }
}
