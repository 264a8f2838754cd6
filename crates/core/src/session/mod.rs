//! Draw session controller
//!
//! The outer loop of the presentation:
//!
//! ```text
//! Setup --begin--> Ready --start--> Spinning --reveal--> WinnerShown
//!                    ^                                        |
//!                    +------------ confirm / reroll ----------+
//! Ready <--> Finished   (no eligible candidate or no stock left)
//! any --reset_all--> Setup
//! ```
//!
//! Everything is driven by the session's virtual clock. The host calls
//! [`DrawSession::advance`] from its frame loop (tests jump straight to the
//! end) and drains [`SessionEvent`]s afterwards. Prize stock is only touched
//! here, at reveal and at reroll.

mod state;

use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coordinator::ReelCoordinator;
use crate::effects::{CaptionRequest, Cue, Effect, SessionEvent};
use crate::error::{Error, Result};
use crate::invariants;
use crate::models::{Candidate, Prize, WinRecord};
use crate::pool;
use crate::random::RandomSource;
use crate::reel::ReelView;
use crate::scheduler::{DrawTimer, Scheduler};
use crate::settings::{SessionSettings, MAX_REELS};

pub use state::DrawState;

/// The draw in flight between `start` and the reveal
#[derive(Debug, Clone)]
struct ActiveDraw {
    number: u64,
    prize_id: Uuid,
    winners: Vec<Candidate>,
}

/// One presentation session
pub struct DrawSession<R: RandomSource> {
    settings: SessionSettings,
    rng: R,
    state: DrawState,
    candidates: Vec<Candidate>,
    prizes: Vec<Prize>,
    selected_prize: Option<Uuid>,
    /// Committed and pending records, in reveal order
    records: Vec<WinRecord>,
    /// Records revealed but not yet confirmed
    pending: Vec<Uuid>,
    scheduler: Scheduler<DrawTimer>,
    coordinator: ReelCoordinator,
    draw_seq: u64,
    active: Option<ActiveDraw>,
    outbox: Vec<SessionEvent>,
}

impl<R: RandomSource> DrawSession<R> {
    pub fn new(settings: SessionSettings, rng: R) -> Result<Self> {
        settings.validate()?;
        let coordinator = ReelCoordinator::new(settings.reel_count);
        Ok(Self {
            settings,
            rng,
            state: DrawState::Setup,
            candidates: Vec::new(),
            prizes: Vec::new(),
            selected_prize: None,
            records: Vec::new(),
            pending: Vec::new(),
            scheduler: Scheduler::new(),
            coordinator,
            draw_seq: 0,
            active: None,
            outbox: Vec::new(),
        })
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    pub fn selected_prize(&self) -> Option<&Prize> {
        let id = self.selected_prize?;
        self.prizes.iter().find(|p| p.id == id)
    }

    /// Candidates without a committed or pending win, in roster order
    pub fn eligible(&self) -> Vec<Candidate> {
        pool::eligible(&self.candidates, &self.records)
    }

    /// Every record, committed and pending
    pub fn records(&self) -> &[WinRecord] {
        &self.records
    }

    pub fn committed(&self) -> Vec<&WinRecord> {
        self.records
            .iter()
            .filter(|r| !self.pending.contains(&r.id))
            .collect()
    }

    pub fn pending(&self) -> Vec<&WinRecord> {
        self.records
            .iter()
            .filter(|r| self.pending.contains(&r.id))
            .collect()
    }

    pub fn record(&self, win_id: Uuid) -> Option<&WinRecord> {
        self.records.iter().find(|r| r.id == win_id)
    }

    pub fn reel_views(&self) -> Vec<ReelView> {
        self.coordinator.views(self.scheduler.now())
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Replace the roster and prize list.
    ///
    /// Existing win records are kept. The selected prize survives if a prize
    /// with the same id is still present.
    pub fn load_roster(&mut self, candidates: Vec<Candidate>, prizes: Vec<Prize>) -> Result<()> {
        self.ensure_idle()?;

        info!(
            candidates = candidates.len(),
            prizes = prizes.len(),
            "Roster loaded"
        );
        self.candidates = candidates;
        self.prizes = prizes;
        if let Some(id) = self.selected_prize {
            if !self.prizes.iter().any(|p| p.id == id) {
                self.selected_prize = None;
            }
        }

        self.idle_reels();
        self.refresh_finished();
        Ok(())
    }

    /// Leave setup and open the stage
    pub fn begin(&mut self) -> Result<()> {
        if self.state != DrawState::Setup {
            return Err(Error::InvalidOperation(format!(
                "Cannot begin from {:?}",
                self.state
            )));
        }
        if self.candidates.is_empty() {
            return Err(Error::Roster("No candidates loaded".into()));
        }

        self.set_state(DrawState::Ready);
        self.idle_reels();
        self.refresh_finished();
        Ok(())
    }

    pub fn select_prize(&mut self, prize_id: Uuid) -> Result<()> {
        self.ensure_idle()?;
        let prize = self
            .prizes
            .iter()
            .find(|p| p.id == prize_id)
            .ok_or_else(|| Error::NotFound(format!("Prize {}", prize_id)))?;

        debug!(prize = %prize.name, remaining = prize.remaining, "Prize selected");
        self.selected_prize = Some(prize_id);
        self.emit(Effect::Sound(Cue::UiClick));
        Ok(())
    }

    pub fn set_demo_mode(&mut self, enabled: bool) {
        if self.settings.demo_mode != enabled {
            info!(demo_mode = enabled, "Demo mode changed");
        }
        self.settings.demo_mode = enabled;
        self.refresh_finished();
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
    }

    pub fn set_confetti_enabled(&mut self, enabled: bool) {
        self.settings.confetti_enabled = enabled;
    }

    pub fn set_reel_count(&mut self, reel_count: usize) -> Result<()> {
        self.ensure_idle()?;
        if reel_count == 0 || reel_count > MAX_REELS {
            return Err(Error::Config(format!(
                "reel_count must be between 1 and {}, got {}",
                MAX_REELS, reel_count
            )));
        }

        self.settings.reel_count = reel_count;
        self.coordinator
            .set_reel_count(reel_count, &mut self.scheduler);
        self.idle_reels();
        Ok(())
    }

    /// Start spinning. All validation happens before any state changes.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            DrawState::Spinning | DrawState::WinnerShown => return Err(Error::DrawInProgress),
            DrawState::Setup => {
                return Err(Error::InvalidOperation("Session has not begun".into()))
            }
            DrawState::Ready | DrawState::Finished => {}
        }

        let prize = self.selected_prize().ok_or(Error::NoPrizeSelected)?;
        let prize_id = prize.id;
        let prize_name = prize.name.clone();
        let remaining = prize.remaining;

        let eligible = self.eligible();
        if eligible.is_empty() {
            return Err(Error::EmptyPool);
        }
        let reels = self.coordinator.reel_count();
        if !self.settings.demo_mode && remaining == 0 {
            return Err(Error::PrizeExhausted(prize_name));
        }
        if eligible.len() < reels {
            return Err(Error::NotEnoughCandidates {
                requested: reels,
                available: eligible.len(),
            });
        }
        if !self.settings.demo_mode && (remaining as usize) < reels {
            return Err(Error::InsufficientQuantity {
                requested: reels,
                remaining,
            });
        }

        self.draw_seq += 1;
        let draw = self.draw_seq;
        self.active = Some(ActiveDraw {
            number: draw,
            prize_id,
            winners: Vec::new(),
        });

        let timing = &self.settings.timing;
        self.coordinator
            .start_spin(&eligible, timing, &mut self.rng, &mut self.scheduler);
        let jitter = self.rng.index(timing.spin_hold_jitter_millis() as usize + 1) as u64;
        let hold = timing.spin_hold(jitter);
        self.scheduler.schedule(hold, DrawTimer::SpinElapsed { draw });

        info!(
            draw,
            prize = %prize_name,
            reels,
            hold_ms = hold.as_millis() as u64,
            "Draw started"
        );
        self.set_state(DrawState::Spinning);
        self.emit(Effect::Sound(Cue::SpinStart));
        Ok(())
    }

    /// Advance the virtual clock by `delta`
    pub fn advance(&mut self, delta: Duration) {
        let until = self.scheduler.now() + delta;
        self.advance_to(until);
    }

    /// Fire every timer due by `until`, in order, then move the clock there
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(fired) = self.scheduler.pop_due(until) {
            match fired.kind {
                DrawTimer::Reel { reel, epoch, step } => {
                    let timing = &self.settings.timing;
                    if let Some(phase) =
                        self.coordinator
                            .handle_timer(reel, epoch, step, timing, &mut self.scheduler)
                    {
                        debug!(reel, ?phase, "Reel phase changed");
                    }
                }
                DrawTimer::SpinElapsed { draw } => self.on_spin_elapsed(draw),
                DrawTimer::Reveal { draw } => self.on_reveal(draw),
            }
        }
        self.scheduler.settle_at(until);
    }

    fn is_current(&self, draw: u64) -> bool {
        self.active.as_ref().is_some_and(|a| a.number == draw)
    }

    fn on_spin_elapsed(&mut self, draw: u64) {
        if !self.is_current(draw) || self.state != DrawState::Spinning {
            debug!(draw, "Ignoring stale spin timer");
            return;
        }

        let eligible = self.eligible();
        let timing = &self.settings.timing;
        let outcome =
            match self
                .coordinator
                .run_draw(&eligible, timing, &mut self.rng, &mut self.scheduler)
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(draw, error = %e, "Draw aborted");
                    self.active = None;
                    self.idle_reels();
                    self.set_state(DrawState::Ready);
                    self.refresh_finished();
                    return;
                }
            };

        for (reel, winner) in outcome.winners.iter().enumerate() {
            debug!(draw, reel, winner = %winner.name, "Winner assigned");
        }
        self.scheduler.schedule(
            outcome.settle_after + self.settings.timing.reveal_freeze(),
            DrawTimer::Reveal { draw },
        );
        if let Some(active) = self.active.as_mut() {
            active.winners = outcome.winners;
        }
    }

    fn on_reveal(&mut self, draw: u64) {
        if !self.is_current(draw) || self.state != DrawState::Spinning {
            debug!(draw, "Ignoring stale reveal timer");
            return;
        }
        let Some(active) = self.active.take() else {
            return;
        };
        if !self.coordinator.all_settled() {
            warn!(draw, "Reveal fired before every reel settled");
        }

        let demo = self.settings.demo_mode;
        let Some(index) = self.prizes.iter().position(|p| p.id == active.prize_id) else {
            warn!(draw, "Prize vanished during the draw");
            self.idle_reels();
            self.set_state(DrawState::Ready);
            return;
        };
        let prize = &mut self.prizes[index];

        let mut requests = Vec::with_capacity(active.winners.len());
        for winner in active.winners {
            let applied = if demo {
                false
            } else {
                match prize.take_one() {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(draw, error = %e, "Win recorded without stock");
                        false
                    }
                }
            };
            invariants::assert_prize_invariants(prize);

            let record = WinRecord::new(winner, prize.clone(), applied);
            info!(
                draw,
                win = %record.id,
                winner = %record.candidate.name,
                prize = %record.prize.name,
                remaining = record.prize.remaining,
                "Winner revealed"
            );
            requests.push(CaptionRequest {
                win_id: record.id,
                candidate: record.candidate.clone(),
                prize_name: record.prize.name.clone(),
            });
            self.pending.push(record.id);
            self.records.push(record);
        }
        invariants::assert_no_double_win(&self.records);

        self.set_state(DrawState::WinnerShown);
        self.emit(Effect::Sound(Cue::SpinStop));
        self.emit(Effect::Sound(Cue::WinnerRevealed));
        self.emit(Effect::Confetti);
        for request in requests {
            self.outbox.push(SessionEvent::CaptionRequested(request));
        }
    }

    /// Commit every pending record. Returns how many were committed.
    pub fn confirm(&mut self) -> Result<usize> {
        if self.state != DrawState::WinnerShown {
            return Err(Error::InvalidOperation(format!(
                "Nothing to confirm in {:?}",
                self.state
            )));
        }

        let count = self.pending.len();
        self.pending.clear();
        info!(count, "Winners confirmed");

        self.emit(Effect::Sound(Cue::UiClick));
        self.idle_reels();
        self.set_state(DrawState::Ready);
        self.refresh_finished();
        Ok(count)
    }

    /// Undo a win: restore the stock it took and make the candidate eligible
    /// again. Unknown ids are a no-op.
    pub fn reroll(&mut self, win_id: Uuid) -> Result<bool> {
        if self.state == DrawState::Spinning {
            return Err(Error::DrawInProgress);
        }
        let Some(position) = self.records.iter().position(|r| r.id == win_id) else {
            debug!(win = %win_id, "Reroll of unknown record");
            return Ok(false);
        };

        let record = self.records.remove(position);
        self.pending.retain(|id| *id != win_id);
        if record.inventory_applied {
            match self.prizes.iter_mut().find(|p| p.id == record.prize.id) {
                Some(prize) => {
                    prize.restore_one();
                    invariants::assert_prize_invariants(prize);
                }
                None => warn!(win = %win_id, "Rerolled prize no longer exists"),
            }
        }
        info!(
            win = %win_id,
            candidate = %record.candidate.name,
            prize = %record.prize.name,
            "Win rerolled"
        );

        self.emit(Effect::Sound(Cue::UiClick));
        if self.state == DrawState::WinnerShown && self.pending.is_empty() {
            self.idle_reels();
            self.set_state(DrawState::Ready);
        }
        self.refresh_finished();
        Ok(true)
    }

    /// Attach a caption to a record. Returns false and drops the text when
    /// the record is gone or already has a caption.
    pub fn apply_caption(&mut self, win_id: Uuid, caption: String) -> bool {
        match self.records.iter_mut().find(|r| r.id == win_id) {
            Some(record) if record.caption.is_some() => {
                debug!(win = %win_id, "Record already captioned, keeping it");
                false
            }
            Some(record) => {
                debug!(win = %win_id, "Caption attached");
                record.caption = Some(caption);
                true
            }
            None => {
                debug!(win = %win_id, "Discarding caption for a removed record");
                false
            }
        }
    }

    /// Drop all draw state and go back to setup. Roster and prize totals
    /// are untouched; stock is refilled.
    pub fn reset_all(&mut self) {
        self.scheduler.clear();
        self.active = None;
        self.records.clear();
        self.pending.clear();
        self.selected_prize = None;
        for prize in self.prizes.iter_mut() {
            prize.restock();
        }
        self.idle_reels();
        info!("Session reset");
        self.set_state(DrawState::Setup);
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.state.is_drawing() {
            return Err(Error::DrawInProgress);
        }
        Ok(())
    }

    fn idle_reels(&mut self) {
        let eligible = self.eligible();
        self.coordinator.go_idle(
            &eligible,
            &self.settings.timing,
            &mut self.rng,
            &mut self.scheduler,
        );
    }

    /// Move between Ready and Finished depending on whether a draw could run
    fn refresh_finished(&mut self) {
        if !matches!(self.state, DrawState::Ready | DrawState::Finished) {
            return;
        }
        let no_stock = self.prizes.is_empty()
            || (!self.settings.demo_mode && self.prizes.iter().all(|p| p.is_exhausted()));
        let done = pool::eligible_count(&self.candidates, &self.records) == 0 || no_stock;

        let next = if done {
            DrawState::Finished
        } else {
            DrawState::Ready
        };
        self.set_state(next);
    }

    fn set_state(&mut self, to: DrawState) {
        let from = self.state;
        if from == to {
            return;
        }
        info!(?from, ?to, "Draw state changed");
        self.state = to;
        self.outbox.push(SessionEvent::StateChanged { from, to });
    }

    fn emit(&mut self, effect: Effect) {
        if effect.enabled(&self.settings) {
            self.outbox.push(SessionEvent::Effect(effect));
        }
    }
}
