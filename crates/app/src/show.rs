//! Headless show runner
//!
//! Drives a draw session through the whole prize list: advances the session
//! clock from a frame loop, routes cues to the log and caption requests to
//! the dispatcher, confirms every reveal, then exports the winners.

use std::path::{Path, PathBuf};

use luckydraw_caption::{CaptionDispatcher, CaptionResult};
use luckydraw_core::{
    write_export, DrawSession, DrawState, Error, RandomSource, ReelPhase, Result, SessionEvent,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RehearsalConfig;

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct ShowReport {
    pub draws: usize,
    pub winners: usize,
    pub fallback_captions: usize,
    pub export: PathBuf,
}

pub struct Show<R: RandomSource> {
    session: DrawSession<R>,
    dispatcher: CaptionDispatcher,
    captions: mpsc::Receiver<CaptionResult>,
    rehearsal: RehearsalConfig,
    last_phases: Vec<ReelPhase>,
    fallback_captions: usize,
}

impl<R: RandomSource> Show<R> {
    pub fn new(
        session: DrawSession<R>,
        dispatcher: CaptionDispatcher,
        captions: mpsc::Receiver<CaptionResult>,
        rehearsal: RehearsalConfig,
    ) -> Self {
        Self {
            session,
            dispatcher,
            captions,
            rehearsal,
            last_phases: Vec::new(),
            fallback_captions: 0,
        }
    }

    pub fn session(&self) -> &DrawSession<R> {
        &self.session
    }

    /// Draw every prize in list order until its stock or the pool runs out
    pub async fn run(&mut self, export_dir: &Path) -> Result<ShowReport> {
        let prizes: Vec<(Uuid, String, u32)> = self
            .session
            .prizes()
            .iter()
            .map(|p| (p.id, p.name.clone(), p.total))
            .collect();
        let reel_count = self.session.settings().reel_count;
        let mut draws = 0;

        info!(
            prizes = prizes.len(),
            candidates = self.session.candidates().len(),
            captions = self.dispatcher.generator_name(),
            "Show starting"
        );

        'prizes: for (prize_id, prize_name, total) in prizes {
            self.session.set_reel_count(reel_count)?;
            self.session.select_prize(prize_id)?;
            self.pump();
            info!(prize = %prize_name, "Drawing prize");

            let mut awarded = 0u32;
            loop {
                // Demo mode never runs out of stock, so stop at the nominal total
                if self.session.settings().demo_mode && awarded >= total {
                    break;
                }

                match self.session.start() {
                    Ok(()) => {}
                    Err(Error::PrizeExhausted(_)) => break,
                    Err(Error::EmptyPool) => {
                        info!("Every candidate has won");
                        break 'prizes;
                    }
                    Err(Error::InsufficientQuantity { remaining, .. }) => {
                        debug!(remaining, "Fewer reels for the last units");
                        self.session.set_reel_count(remaining as usize)?;
                        continue;
                    }
                    Err(Error::NotEnoughCandidates { available, .. }) => {
                        debug!(available, "Fewer reels for the last candidates");
                        self.session.set_reel_count(available)?;
                        continue;
                    }
                    Err(e) if e.is_validation() => {
                        warn!(prize = %prize_name, error = %e, "Skipping prize");
                        break;
                    }
                    Err(e) => return Err(e),
                }

                self.play_until_reveal().await;
                if self.session.state() != DrawState::WinnerShown {
                    warn!(state = ?self.session.state(), "Draw ended without a reveal");
                    break 'prizes;
                }
                draws += 1;
                awarded += self.session.pending().len() as u32;
                for record in self.session.pending() {
                    info!(
                        winner = %record.candidate.name,
                        detail = record.candidate.subtitle(),
                        prize = %record.prize.name,
                        "Winner shown"
                    );
                }

                self.await_captions().await;
                self.session.confirm()?;
                self.pump();
            }
        }

        let export = write_export(export_dir, self.session.committed())?;
        let report = ShowReport {
            draws,
            winners: self.session.committed().len(),
            fallback_captions: self.fallback_captions,
            export,
        };
        info!(
            draws = report.draws,
            winners = report.winners,
            fallback_captions = report.fallback_captions,
            "Show finished"
        );
        Ok(report)
    }

    async fn play_until_reveal(&mut self) {
        let mut frame = tokio::time::interval(self.rehearsal.frame());
        let mut last = Instant::now();

        while self.session.state() == DrawState::Spinning {
            if self.rehearsal.realtime {
                frame.tick().await;
                let now = Instant::now();
                self.session.advance(now - last);
                last = now;
            } else {
                let Some(deadline) = self.session.next_deadline() else {
                    break;
                };
                self.session.advance_to(deadline);
                tokio::task::yield_now().await;
            }
            self.pump();
            self.log_phase_changes();
        }
    }

    /// Wait for captions on the shown winners, bounded by the rehearsal limit
    async fn await_captions(&mut self) {
        let deadline = Instant::now() + self.rehearsal.caption_wait();

        while self
            .session
            .pending()
            .iter()
            .any(|record| record.caption.is_none())
        {
            match tokio::time::timeout_at(deadline, self.captions.recv()).await {
                Ok(Some(result)) => self.apply_caption(result),
                Ok(None) => break,
                Err(_) => {
                    warn!("Captions still missing, confirming without them");
                    break;
                }
            }
        }
    }

    /// Route queued session events and any captions that already arrived
    fn pump(&mut self) {
        for event in self.session.drain_events() {
            match event {
                SessionEvent::Effect(effect) => info!(?effect, "Cue"),
                SessionEvent::CaptionRequested(request) => {
                    self.dispatcher.request(request);
                }
                SessionEvent::StateChanged { from, to } => {
                    debug!(?from, ?to, "Stage state");
                }
            }
        }

        while let Ok(result) = self.captions.try_recv() {
            self.apply_caption(result);
        }
    }

    fn apply_caption(&mut self, result: CaptionResult) {
        if result.fallback {
            self.fallback_captions += 1;
        }
        if self.session.apply_caption(result.win_id, result.caption.clone()) {
            info!(win = %result.win_id, caption = %result.caption, "Caption");
        }
    }

    fn log_phase_changes(&mut self) {
        let views = self.session.reel_views();
        if self.last_phases.len() != views.len() {
            self.last_phases = vec![ReelPhase::Idle; views.len()];
        }
        for (last, view) in self.last_phases.iter_mut().zip(views.iter()) {
            if *last != view.phase {
                info!(reel = view.index, phase = ?view.phase, "Reel phase");
                *last = view.phase;
            }
        }
    }
}
