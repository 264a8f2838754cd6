//! Reel choreography
//!
//! One reel is an explicit state machine. External signals (`go_idle`,
//! `start_spin`, `assign_winner`) reset it and bump its epoch; timed steps
//! come back through `on_timer` carrying the epoch they were scheduled
//! under. A step from an older epoch is stale and ignored, so a late tease
//! highlight can never leak into the next draw.
//!
//! Landing timeline for reel `i`:
//!
//! ```text
//! Decelerating  decel + i * stagger    ease: DECELERATE     -> tease
//! Teasing       tease_pause            (tease highlighted)
//! Sliding       winner_slide           ease: EASE_IN_OUT    -> winner
//! Bouncing      bounce / 2 overshoot, bounce / 2 spring back
//! Settled       winner highlighted
//! ```

mod landing;
mod motion;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::easing::Easing;
use crate::invariants;
use crate::models::Candidate;
use crate::random::{sample, RandomSource};
use crate::settings::{ReelLayout, SlotTiming};

pub use landing::Landing;
pub use motion::Motion;

/// Reel phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReelPhase {
    Idle,
    Spinning,
    Decelerating,
    Teasing,
    SlidingToWinner,
    Bouncing,
    Settled,
}

/// Timed steps inside a landing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReelStep {
    /// Deceleration reached the tease stop
    ReachTease,
    /// Tease hold is over
    EndTease,
    /// Arrived on the winner, start the overshoot
    ReachWinner,
    /// Overshoot done, spring back
    TurnBounce,
    /// Spring-back done
    Settle,
}

/// Transition table for timed steps
pub fn transition(phase: ReelPhase, step: ReelStep) -> Option<ReelPhase> {
    use ReelPhase::*;
    use ReelStep::*;

    match (phase, step) {
        (Decelerating, ReachTease) => Some(Teasing),
        (Decelerating, ReachWinner) => Some(Bouncing),
        (Teasing, EndTease) => Some(SlidingToWinner),
        (SlidingToWinner, ReachWinner) => Some(Bouncing),
        (Bouncing, TurnBounce) => Some(Bouncing),
        (Bouncing, Settle) => Some(Settled),
        _ => None,
    }
}

/// Next timed step a reel wants, relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub delay: Duration,
    pub step: ReelStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightKind {
    Tease,
    Winner,
}

/// Highlighted window item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub index: usize,
    pub kind: HighlightKind,
}

/// One row of the visible window
#[derive(Debug, Clone)]
pub struct VisibleItem {
    pub slot: usize,
    pub candidate: Candidate,
    pub highlight: Option<HighlightKind>,
}

/// Render snapshot of one reel
#[derive(Debug, Clone)]
pub struct ReelView {
    pub index: usize,
    pub phase: ReelPhase,
    pub offset: f64,
    pub highlight: Option<Highlight>,
    pub visible: Vec<VisibleItem>,
}

/// A single reel
pub struct Reel {
    index: usize,
    epoch: u64,
    phase: ReelPhase,
    window: Vec<Candidate>,
    motion: Motion,
    highlight: Option<Highlight>,
    landing: Option<Landing>,
}

impl Reel {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            epoch: 0,
            phase: ReelPhase::Idle,
            window: Vec::new(),
            motion: Motion::Still(0.0),
            highlight: None,
            landing: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    pub fn window(&self) -> &[Candidate] {
        &self.window
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn highlight(&self) -> Option<Highlight> {
        self.highlight
    }

    pub fn landing(&self) -> Option<&Landing> {
        self.landing.as_ref()
    }

    /// Winner assigned to the current landing
    pub fn winner(&self) -> Option<&Candidate> {
        self.landing.as_ref().map(|l| l.winner())
    }

    pub fn is_settled(&self) -> bool {
        self.phase == ReelPhase::Settled
    }

    /// Drop whatever the reel was doing and start a new epoch
    fn reset(&mut self, phase: ReelPhase) {
        self.epoch += 1;
        self.phase = phase;
        self.highlight = None;
        self.landing = None;
    }

    /// Ambient idle loop. Small pools just sit still.
    pub fn go_idle(
        &mut self,
        pool: &[Candidate],
        timing: &SlotTiming,
        rng: &mut dyn RandomSource,
        now: Duration,
    ) {
        self.reset(ReelPhase::Idle);

        if pool.len() > ReelLayout::IDLE_MIN_POOL {
            let period = timing.idle_loop_for(self.index);
            self.motion = self.loop_over(pool, period, rng, now);
        } else {
            self.window = pool.to_vec();
            let centre = if self.window.len() > 1 { 1.0 } else { 0.0 };
            self.motion = Motion::Still(centre);
        }
        debug!(reel = self.index, epoch = self.epoch, "Reel idle");
    }

    /// Fast constant-speed loop with no target
    pub fn start_spin(
        &mut self,
        pool: &[Candidate],
        timing: &SlotTiming,
        rng: &mut dyn RandomSource,
        now: Duration,
    ) {
        self.reset(ReelPhase::Spinning);
        self.motion = self.loop_over(pool, timing.spin_loop_period(), rng, now);
        debug!(reel = self.index, epoch = self.epoch, "Reel spinning");
    }

    fn loop_over(
        &mut self,
        pool: &[Candidate],
        period: Duration,
        rng: &mut dyn RandomSource,
        now: Duration,
    ) -> Motion {
        let base = sample(pool, ReelLayout::LOOP_SAMPLE, rng);
        let span = base.len() as f64;
        self.window = Vec::with_capacity(base.len() * ReelLayout::LOOP_REPEATS);
        for _ in 0..ReelLayout::LOOP_REPEATS {
            self.window.extend(base.iter().cloned());
        }
        // Start on the middle copy so both neighbours always exist
        Motion::Loop {
            start: now,
            origin: span,
            span,
            period,
        }
    }

    /// Build the landing strip for `winner` and start decelerating.
    ///
    /// Returns the first timed step for the caller to schedule.
    pub fn assign_winner(
        &mut self,
        winner: &Candidate,
        pool: &[Candidate],
        timing: &SlotTiming,
        rng: &mut dyn RandomSource,
        now: Duration,
    ) -> Wake {
        let carried = self.motion.offset_at(now).fract();
        self.reset(ReelPhase::Decelerating);

        let landing = Landing::build(winner, pool, rng);
        invariants::assert_landing_invariants(&landing);
        let (target, step) = match landing.tease_index {
            Some(tease) => (tease as f64, ReelStep::ReachTease),
            None => (landing.winner_index as f64, ReelStep::ReachWinner),
        };
        let duration = timing.decel_for(self.index);

        self.window = landing.items.clone();
        self.motion = Motion::Tween {
            start: now,
            duration,
            from: 1.0 + carried,
            to: target,
            easing: Easing::DECELERATE,
        };
        self.landing = Some(landing);

        debug!(
            reel = self.index,
            epoch = self.epoch,
            winner = %winner.name,
            "Reel landing"
        );

        Wake {
            delay: duration,
            step,
        }
    }

    /// Handle a timed step. Stale or out-of-order steps are no-ops.
    pub fn on_timer(
        &mut self,
        epoch: u64,
        step: ReelStep,
        timing: &SlotTiming,
        now: Duration,
    ) -> Option<Wake> {
        if epoch != self.epoch {
            debug!(
                reel = self.index,
                timer_epoch = epoch,
                epoch = self.epoch,
                ?step,
                "Ignoring stale reel timer"
            );
            return None;
        }

        let Some(next_phase) = transition(self.phase, step) else {
            warn!(reel = self.index, phase = ?self.phase, ?step, "Unexpected reel step");
            return None;
        };
        let (tease_index, winner_index) = match &self.landing {
            Some(landing) => (landing.tease_index, landing.winner_index),
            None => {
                warn!(reel = self.index, ?step, "Reel step without a landing");
                return None;
            }
        };

        self.phase = next_phase;
        let winner_pos = winner_index as f64;

        let wake = match step {
            ReelStep::ReachTease => {
                let tease = tease_index.unwrap_or(winner_index);
                self.motion = Motion::Still(tease as f64);
                self.highlight = Some(Highlight {
                    index: tease,
                    kind: HighlightKind::Tease,
                });
                Some(Wake {
                    delay: timing.tease_pause(),
                    step: ReelStep::EndTease,
                })
            }
            ReelStep::EndTease => {
                self.highlight = None;
                let from = self.motion.offset_at(now);
                self.motion = Motion::Tween {
                    start: now,
                    duration: timing.winner_slide(),
                    from,
                    to: winner_pos,
                    easing: Easing::EASE_IN_OUT,
                };
                Some(Wake {
                    delay: timing.winner_slide(),
                    step: ReelStep::ReachWinner,
                })
            }
            ReelStep::ReachWinner => {
                self.motion = Motion::Tween {
                    start: now,
                    duration: timing.half_bounce(),
                    from: winner_pos,
                    to: winner_pos + ReelLayout::BOUNCE_OVERSHOOT,
                    easing: Easing::EASE_OUT,
                };
                Some(Wake {
                    delay: timing.half_bounce(),
                    step: ReelStep::TurnBounce,
                })
            }
            ReelStep::TurnBounce => {
                self.motion = Motion::Tween {
                    start: now,
                    duration: timing.half_bounce(),
                    from: winner_pos + ReelLayout::BOUNCE_OVERSHOOT,
                    to: winner_pos,
                    easing: Easing::SPRING_BACK,
                };
                Some(Wake {
                    delay: timing.half_bounce(),
                    step: ReelStep::Settle,
                })
            }
            ReelStep::Settle => {
                self.motion = Motion::Still(winner_pos);
                self.highlight = Some(Highlight {
                    index: winner_index,
                    kind: HighlightKind::Winner,
                });
                None
            }
        };

        debug!(reel = self.index, phase = ?self.phase, "Reel phase");
        wake
    }

    pub fn offset_at(&self, now: Duration) -> f64 {
        self.motion.offset_at(now)
    }

    /// Render snapshot at `now`
    pub fn view(&self, now: Duration) -> ReelView {
        let offset = self.offset_at(now);
        let mut visible = Vec::with_capacity(ReelLayout::VISIBLE_ITEMS);

        if !self.window.is_empty() {
            let len = self.window.len() as isize;
            let centre = offset.round() as isize;
            let half = (ReelLayout::VISIBLE_ITEMS / 2) as isize;
            for i in (centre - half)..=(centre + half) {
                let slot = i.rem_euclid(len) as usize;
                let highlight = self
                    .highlight
                    .filter(|h| h.index == slot)
                    .map(|h| h.kind);
                visible.push(VisibleItem {
                    slot,
                    candidate: self.window[slot].clone(),
                    highlight,
                });
            }
        }

        ReelView {
            index: self.index,
            phase: self.phase,
            offset,
            highlight: self.highlight,
            visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RngSource;

    fn pool(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("R{}", i), format!("r{}@example.com", i)))
            .collect()
    }

    /// Drive a reel through its landing by following its own wake-ups
    fn run_landing(reel: &mut Reel, first: Wake, timing: &SlotTiming, start: Duration) -> Duration {
        let mut now = start;
        let mut next = Some(first);
        while let Some(wake) = next {
            now += wake.delay;
            next = reel.on_timer(reel.epoch(), wake.step, timing, now);
        }
        now
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(
            transition(ReelPhase::Decelerating, ReelStep::ReachTease),
            Some(ReelPhase::Teasing)
        );
        assert_eq!(
            transition(ReelPhase::Teasing, ReelStep::EndTease),
            Some(ReelPhase::SlidingToWinner)
        );
        assert_eq!(transition(ReelPhase::Settled, ReelStep::Settle), None);
        assert_eq!(transition(ReelPhase::Idle, ReelStep::ReachTease), None);
        assert_eq!(transition(ReelPhase::Spinning, ReelStep::EndTease), None);
    }

    #[test]
    fn test_full_landing_sequence() {
        let pool = pool(10);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(11);
        let mut reel = Reel::new(0);

        reel.start_spin(&pool, &timing, &mut rng, Duration::ZERO);
        assert_eq!(reel.phase(), ReelPhase::Spinning);
        assert_eq!(reel.window().len(), pool.len() * ReelLayout::LOOP_REPEATS);

        let now = Duration::from_secs(12);
        let wake = reel.assign_winner(&pool[4], &pool, &timing, &mut rng, now);
        assert_eq!(reel.phase(), ReelPhase::Decelerating);
        assert_eq!(wake.step, ReelStep::ReachTease);
        assert_eq!(wake.delay, timing.decel_for(0));

        // Tease stop
        let at_tease = now + wake.delay;
        let wake = reel
            .on_timer(reel.epoch(), wake.step, &timing, at_tease)
            .unwrap();
        assert_eq!(reel.phase(), ReelPhase::Teasing);
        let tease_index = reel.landing().unwrap().tease_index.unwrap();
        assert_eq!(reel.offset_at(at_tease), tease_index as f64);
        assert_eq!(
            reel.highlight(),
            Some(Highlight {
                index: tease_index,
                kind: HighlightKind::Tease
            })
        );

        // Slide
        let at_slide = at_tease + wake.delay;
        let wake = reel
            .on_timer(reel.epoch(), wake.step, &timing, at_slide)
            .unwrap();
        assert_eq!(reel.phase(), ReelPhase::SlidingToWinner);
        assert!(reel.highlight().is_none());

        let settled_at = run_landing(&mut reel, wake, &timing, at_slide);
        assert_eq!(reel.phase(), ReelPhase::Settled);
        assert_eq!(settled_at - now, timing.landing_duration(0, true));

        let winner_index = reel.landing().unwrap().winner_index;
        assert_eq!(reel.offset_at(settled_at), winner_index as f64);
        assert_eq!(reel.winner().unwrap().id, pool[4].id);
        assert_eq!(
            reel.highlight().map(|h| h.kind),
            Some(HighlightKind::Winner)
        );
    }

    #[test]
    fn test_bounce_overshoots() {
        let pool = pool(6);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(2);
        let mut reel = Reel::new(0);

        let mut wake = reel.assign_winner(&pool[0], &pool, &timing, &mut rng, Duration::ZERO);
        let mut now = Duration::ZERO;
        while wake.step != ReelStep::TurnBounce {
            now += wake.delay;
            wake = reel.on_timer(reel.epoch(), wake.step, &timing, now).unwrap();
        }
        // Just reached the far end of the overshoot
        now += wake.delay;
        let winner_index = reel.landing().unwrap().winner_index as f64;
        assert!(reel.offset_at(now) > winner_index);
        assert_eq!(reel.phase(), ReelPhase::Bouncing);
    }

    #[test]
    fn test_stagger_delays_later_reels() {
        let pool = pool(8);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(4);

        let mut first = Reel::new(0);
        let mut third = Reel::new(2);
        let a = first.assign_winner(&pool[0], &pool, &timing, &mut rng, Duration::ZERO);
        let b = third.assign_winner(&pool[1], &pool, &timing, &mut rng, Duration::ZERO);
        assert_eq!(b.delay - a.delay, Duration::from_secs(1));
    }

    #[test]
    fn test_stale_timer_ignored() {
        let pool = pool(8);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(8);
        let mut reel = Reel::new(0);

        let wake = reel.assign_winner(&pool[2], &pool, &timing, &mut rng, Duration::ZERO);
        let stale_epoch = reel.epoch();
        reel.go_idle(&pool, &timing, &mut rng, Duration::from_secs(1));

        let result = reel.on_timer(stale_epoch, wake.step, &timing, wake.delay);
        assert!(result.is_none());
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(reel.highlight().is_none());
        assert!(reel.landing().is_none());
    }

    #[test]
    fn test_out_of_order_step_ignored() {
        let pool = pool(8);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(8);
        let mut reel = Reel::new(0);

        reel.assign_winner(&pool[2], &pool, &timing, &mut rng, Duration::ZERO);
        let result = reel.on_timer(reel.epoch(), ReelStep::Settle, &timing, Duration::ZERO);
        assert!(result.is_none());
        assert_eq!(reel.phase(), ReelPhase::Decelerating);
    }

    #[test]
    fn test_go_idle_twice() {
        let pool = pool(12);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(3);
        let mut reel = Reel::new(1);

        reel.start_spin(&pool, &timing, &mut rng, Duration::ZERO);
        reel.go_idle(&pool, &timing, &mut rng, Duration::from_secs(1));
        let once = (reel.phase(), reel.highlight(), reel.landing().is_none());
        reel.go_idle(&pool, &timing, &mut rng, Duration::from_secs(1));
        let twice = (reel.phase(), reel.highlight(), reel.landing().is_none());

        assert_eq!(once, twice);
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(matches!(reel.motion(), Motion::Loop { .. }));
    }

    #[test]
    fn test_small_pool_idle_is_still() {
        let pool = pool(3);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(3);
        let mut reel = Reel::new(0);

        reel.go_idle(&pool, &timing, &mut rng, Duration::ZERO);
        assert!(matches!(reel.motion(), Motion::Still(_)));
        assert_eq!(reel.window().len(), 3);
    }

    #[test]
    fn test_sole_candidate_lands_without_tease() {
        let pool = pool(1);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(0);
        let mut reel = Reel::new(0);

        let wake = reel.assign_winner(&pool[0], &pool, &timing, &mut rng, Duration::ZERO);
        assert_eq!(wake.step, ReelStep::ReachWinner);

        let settled_at = run_landing(&mut reel, wake, &timing, Duration::ZERO);
        assert_eq!(reel.phase(), ReelPhase::Settled);
        assert_eq!(settled_at, timing.landing_duration(0, false));
    }

    #[test]
    fn test_view_highlights_winner_row() {
        let pool = pool(7);
        let timing = SlotTiming::normal();
        let mut rng = RngSource::seeded(21);
        let mut reel = Reel::new(0);

        let wake = reel.assign_winner(&pool[5], &pool, &timing, &mut rng, Duration::ZERO);
        let end = run_landing(&mut reel, wake, &timing, Duration::ZERO);

        let view = reel.view(end);
        assert_eq!(view.visible.len(), ReelLayout::VISIBLE_ITEMS);
        let centre = &view.visible[1];
        assert_eq!(centre.candidate.id, pool[5].id);
        assert_eq!(centre.highlight, Some(HighlightKind::Winner));
        assert!(view.visible[0].highlight.is_none());
    }
}
