//! Resumable execution of effect nodes.
//!
//! An [`EffectRun`] is the per-execution state of one node. Each call to
//! [`EffectRun::resume`] advances it until it either yields a
//! [`Suspension`] or finishes. Composite nodes hold a [`ChildCursor`] and
//! forward their children's suspensions, so a nested wait surfaces all the way
//! up to the driver.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::cells::FiredOnce;
use crate::context::BattleContext;
use crate::env::{BattleEnv, SignalId};
use crate::priority::PriorityList;
use crate::world::World;

use super::cx::EffectCx;
use super::kinds::EffectNode;
use super::{EffectOwner, EffectSource};

/// A point where execution yields to the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Suspension {
    /// Wait this many frames.
    Frames(u32),
    /// Wait until the scene reports the signal done.
    Signal(SignalId),
}

/// Result of one resume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Progress {
    Suspended(Suspension),
    Finished,
}

/// Runs an ordered list of nodes one after another.
///
/// Checks the cancellation flag before dispatching each entry and after
/// each entry finishes; once it is set no further entry starts.
#[derive(Debug)]
pub struct ChildCursor<'c> {
    entries: Vec<(EffectOwner, &'c EffectNode)>,
    index: usize,
    current: Option<Box<EffectRun<'c>>>,
}

impl<'c> ChildCursor<'c> {
    pub fn new(entries: Vec<(EffectOwner, &'c EffectNode)>) -> Self {
        Self {
            entries,
            index: 0,
            current: None,
        }
    }

    fn with_owner(owner: EffectOwner, nodes: impl IntoIterator<Item = &'c EffectNode>) -> Self {
        Self::new(nodes.into_iter().map(|node| (owner, node)).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resume(
        &mut self,
        env: BattleEnv<'c>,
        ctx: &mut BattleContext,
        world: &mut World<'_>,
    ) -> Progress {
        loop {
            if let Some(run) = self.current.as_mut() {
                if let Progress::Suspended(wait) = run.resume(env, ctx, world) {
                    return Progress::Suspended(wait);
                }
                self.current = None;
            }
            if ctx.is_cancelled() {
                self.index = self.entries.len();
                return Progress::Finished;
            }
            let Some(&(owner, node)) = self.entries.get(self.index) else {
                return Progress::Finished;
            };
            self.index += 1;
            self.current = Some(Box::new(EffectRun::new(node, owner)));
        }
    }
}

#[derive(Debug)]
enum RunState<'c> {
    Start,
    Pending(VecDeque<Suspension>),
    Children(ChildCursor<'c>),
    Looping {
        remaining: u32,
        current: Option<Box<EffectRun<'c>>>,
    },
    Done,
}

/// Per-execution state of one [`EffectNode`].
#[derive(Debug)]
pub struct EffectRun<'c> {
    node: &'c EffectNode,
    owner: EffectOwner,
    state: RunState<'c>,
}

impl<'c> EffectRun<'c> {
    pub fn new(node: &'c EffectNode, owner: EffectOwner) -> Self {
        Self {
            node,
            owner,
            state: RunState::Start,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, RunState::Done)
    }

    pub fn resume(
        &mut self,
        env: BattleEnv<'c>,
        ctx: &mut BattleContext,
        world: &mut World<'_>,
    ) -> Progress {
        loop {
            match &mut self.state {
                RunState::Start => self.state = self.start(env, ctx, world),
                RunState::Pending(queue) => match queue.pop_front() {
                    Some(wait) => return Progress::Suspended(wait),
                    None => self.state = RunState::Done,
                },
                RunState::Children(cursor) => match cursor.resume(env, ctx, world) {
                    Progress::Suspended(wait) => return Progress::Suspended(wait),
                    Progress::Finished => self.state = RunState::Done,
                },
                RunState::Looping { remaining, current } => {
                    if let Some(run) = current.as_mut() {
                        if let Progress::Suspended(wait) = run.resume(env, ctx, world) {
                            return Progress::Suspended(wait);
                        }
                        *current = None;
                    }
                    if *remaining == 0 || ctx.is_cancelled() {
                        self.state = RunState::Done;
                        continue;
                    }
                    let body = match self.node {
                        EffectNode::Repeat { effect, .. } => effect,
                        EffectNode::RepeatWhile {
                            condition, effect, ..
                        } => {
                            let mut cx = EffectCx::new(env, self.owner, ctx, world);
                            if !condition.evaluate(&mut cx) {
                                self.state = RunState::Done;
                                continue;
                            }
                            effect
                        }
                        _ => {
                            self.state = RunState::Done;
                            continue;
                        }
                    };
                    *remaining -= 1;
                    *current = Some(Box::new(EffectRun::new(body, self.owner)));
                }
                RunState::Done => return Progress::Finished,
            }
        }
    }

    /// First resume: decide what this node does.
    fn start(
        &self,
        env: BattleEnv<'c>,
        ctx: &mut BattleContext,
        world: &mut World<'_>,
    ) -> RunState<'c> {
        let owner = self.owner;
        match self.node {
            EffectNode::Sequence(children) => {
                RunState::Children(ChildCursor::with_owner(owner, children))
            }
            EffectNode::ChooseOne(children) => match world.rng.pick(children.len()) {
                Some(index) => {
                    RunState::Children(ChildCursor::with_owner(owner, &children[index..=index]))
                }
                None => {
                    debug!(target: "battle::effect", source = ?owner.source, "empty choice skipped");
                    RunState::Done
                }
            },
            EffectNode::Conditional {
                condition,
                then_effects,
                else_effects,
            } => {
                let mut cx = EffectCx::new(env, owner, ctx, world);
                let branch = if condition.evaluate(&mut cx) {
                    then_effects
                } else {
                    else_effects
                };
                RunState::Children(ChildCursor::with_owner(owner, branch))
            }
            EffectNode::Repeat { count, .. } => RunState::Looping {
                remaining: *count,
                current: None,
            },
            EffectNode::RepeatWhile { limit, .. } => RunState::Looping {
                remaining: *limit,
                current: None,
            },
            EffectNode::OncePerAction { key, effect } => {
                if !ctx.global.entry::<FiredOnce>().0.insert(*key) {
                    trace!(target: "battle::effect", key, "once-per-action effect already fired");
                    return RunState::Done;
                }
                RunState::Children(ChildCursor::with_owner(owner, [&**effect]))
            }
            EffectNode::Invoke { skill, phase } => {
                let Some(data) = env.catalog.skill(*skill) else {
                    debug!(target: "battle::effect", %skill, "invoke skipped: unknown skill");
                    return RunState::Done;
                };
                let invoked = EffectOwner::new(EffectSource::Skill(*skill), owner.holder);
                let ordered: PriorityList<&'c EffectNode> = data
                    .effects
                    .iter()
                    .filter(|effect| effect.phase == *phase)
                    .map(|effect| (effect.priority, &effect.node))
                    .collect();
                RunState::Children(ChildCursor::with_owner(invoked, ordered.into_ordered()))
            }
            leaf => {
                let mut cx = EffectCx::new(env, owner, ctx, world);
                leaf.run_leaf(&mut cx);
                let pending = cx.into_pending();
                if pending.is_empty() {
                    RunState::Done
                } else {
                    RunState::Pending(pending)
                }
            }
        }
    }
}
