//! Multi-reel coordination
//!
//! Owns every reel of the stage and the scheduler tokens of their pending
//! steps. A draw picks one distinct winner per reel and hands each reel its
//! landing; the draw is complete once the slowest reel has settled.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::Candidate;
use crate::reel::{Reel, ReelPhase, ReelStep, ReelView, Wake};
use crate::random::RandomSource;
use crate::scheduler::{DrawTimer, Scheduler, TimerToken};
use crate::selector::select_distinct;
use crate::settings::{SlotTiming, MAX_REELS};

/// Winners of one draw, in reel order
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub winners: Vec<Candidate>,
    /// Time until the last reel settles
    pub settle_after: Duration,
}

pub struct ReelCoordinator {
    reels: Vec<Reel>,
    tokens: Vec<Option<TimerToken>>,
}

impl ReelCoordinator {
    pub fn new(reel_count: usize) -> Self {
        let count = reel_count.clamp(1, MAX_REELS);
        Self {
            reels: (0..count).map(Reel::new).collect(),
            tokens: vec![None; count],
        }
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    /// Resize the stage. Reels are rebuilt, so only call between draws.
    pub fn set_reel_count(&mut self, reel_count: usize, scheduler: &mut Scheduler<DrawTimer>) {
        self.cancel_all(scheduler);
        let count = reel_count.clamp(1, MAX_REELS);
        self.reels = (0..count).map(Reel::new).collect();
        self.tokens = vec![None; count];
    }

    fn cancel_all(&mut self, scheduler: &mut Scheduler<DrawTimer>) {
        for token in self.tokens.iter_mut() {
            if let Some(token) = token.take() {
                scheduler.cancel(token);
            }
        }
        // Anything scheduled before a resize is unreachable by token
        scheduler.cancel_where(|t| matches!(t, DrawTimer::Reel { .. }));
    }

    pub fn go_idle(
        &mut self,
        pool: &[Candidate],
        timing: &SlotTiming,
        rng: &mut dyn RandomSource,
        scheduler: &mut Scheduler<DrawTimer>,
    ) {
        self.cancel_all(scheduler);
        let now = scheduler.now();
        for reel in self.reels.iter_mut() {
            reel.go_idle(pool, timing, rng, now);
        }
    }

    pub fn start_spin(
        &mut self,
        pool: &[Candidate],
        timing: &SlotTiming,
        rng: &mut dyn RandomSource,
        scheduler: &mut Scheduler<DrawTimer>,
    ) {
        self.cancel_all(scheduler);
        let now = scheduler.now();
        for reel in self.reels.iter_mut() {
            reel.start_spin(pool, timing, rng, now);
        }
    }

    /// Draw one distinct winner per reel and start every landing
    pub fn run_draw(
        &mut self,
        pool: &[Candidate],
        timing: &SlotTiming,
        rng: &mut dyn RandomSource,
        scheduler: &mut Scheduler<DrawTimer>,
    ) -> Result<DrawOutcome> {
        let winners = select_distinct(pool, self.reels.len(), rng)?;
        let now = scheduler.now();

        let mut settle_after = Duration::ZERO;
        for (index, winner) in winners.iter().enumerate() {
            let wake = self.reels[index].assign_winner(winner, pool, timing, rng, now);
            let with_tease = self.reels[index]
                .landing()
                .is_some_and(|l| l.tease_index.is_some());
            settle_after = settle_after.max(timing.landing_duration(index, with_tease));
            self.arm(index, wake, scheduler);
        }

        info!(
            reels = winners.len(),
            settle_ms = settle_after.as_millis() as u64,
            "Reels landing"
        );

        Ok(DrawOutcome {
            winners,
            settle_after,
        })
    }

    fn arm(&mut self, index: usize, wake: Wake, scheduler: &mut Scheduler<DrawTimer>) {
        let epoch = self.reels[index].epoch();
        let token = scheduler.schedule(
            wake.delay,
            DrawTimer::Reel {
                reel: index,
                epoch,
                step: wake.step,
            },
        );
        self.tokens[index] = Some(token);
    }

    /// Route a fired reel timer. Returns the new phase if the step moved the
    /// reel, `None` for stale or out-of-order steps.
    pub fn handle_timer(
        &mut self,
        reel: usize,
        epoch: u64,
        step: ReelStep,
        timing: &SlotTiming,
        scheduler: &mut Scheduler<DrawTimer>,
    ) -> Option<ReelPhase> {
        let Some(target) = self.reels.get(reel) else {
            debug!(reel, "Timer for a reel that no longer exists");
            return None;
        };
        if target.epoch() == epoch {
            self.tokens[reel] = None;
        }

        let before = target.phase();
        let now = scheduler.now();
        if let Some(wake) = self.reels[reel].on_timer(epoch, step, timing, now) {
            self.arm(reel, wake, scheduler);
        }
        let after = self.reels[reel].phase();
        (after != before).then_some(after)
    }

    pub fn all_settled(&self) -> bool {
        self.reels.iter().all(|r| r.is_settled())
    }

    /// Winners the reels are currently showing or landing on
    pub fn winners(&self) -> Vec<Candidate> {
        self.reels.iter().filter_map(|r| r.winner().cloned()).collect()
    }

    pub fn views(&self, now: Duration) -> Vec<ReelView> {
        self.reels.iter().map(|r| r.view(now)).collect()
    }
}
