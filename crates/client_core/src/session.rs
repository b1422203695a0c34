//! Session controller: owns the current card, the remaining-comparisons
//! counter and the animation lock, and sequences vote / exit animation /
//! next-pair fetch.
//!
//! The controller is a plain state machine driven from one task. Surfaces
//! either call [`SessionController::run`] with a command channel, or step it
//! themselves with [`SessionController::handle`] and
//! [`SessionController::tick`].

use std::{future, pin::Pin, sync::Arc};

use anyhow::Result;
use shared::domain::{CandidateId, Pair, Side};
use tokio::{
    sync::{mpsc, watch},
    task::{JoinError, JoinHandle, JoinSet},
    time::{self, Instant, Sleep},
};
use tracing::{debug, info, warn};

use crate::{
    card::{Card, CardBuilder, CardId},
    config::SessionConfig,
    decision::{decide, Decision},
    error::PairSourceError,
    gesture::{GestureTracker, InputEvent, Leaning, TrackerOutput},
    PairSource, VoteReceipt, VoteSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Counting(u32),
    Unbounded,
}

impl SessionPhase {
    pub fn remaining(self) -> Option<u32> {
        match self {
            Self::Counting(remaining) => Some(remaining),
            Self::Unbounded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStep {
    Animating,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Fetching a pair outside of a vote cycle (first card, continue, reload).
    Loading,
    AwaitingGesture,
    Resolving(ResolveStep),
    /// Counter ran out; waiting for continue / view results.
    AwaitingChoice,
    /// Pair fetch failed; nothing to swipe until the user reloads.
    Stalled,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    Input { card: CardId, event: InputEvent },
    ContinueUnbounded,
    ViewResults,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    ViewResults,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

/// Everything a surface needs to draw the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub state: SessionState,
    pub phase: SessionPhase,
    pub card: Option<Card>,
    pub leaning: Leaning,
    pub exiting: Option<Side>,
    pub counter: Option<u32>,
    pub actions_visible: bool,
    pub results_shortcut_visible: bool,
    pub notice: Option<String>,
}

type VoteOutcome = (CandidateId, CandidateId, Result<VoteReceipt>);

pub struct SessionController {
    config: SessionConfig,
    pair_source: Arc<dyn PairSource>,
    vote_sink: Arc<dyn VoteSink>,
    cards: CardBuilder,
    tracker: GestureTracker,
    phase: SessionPhase,
    state: SessionState,
    animation_lock: bool,
    card: Option<Card>,
    exiting: Option<Side>,
    notice: Option<Notice>,
    exit_timer: Option<Pin<Box<Sleep>>>,
    pair_fetch: Option<JoinHandle<std::result::Result<Pair, PairSourceError>>>,
    votes: JoinSet<VoteOutcome>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        pair_source: Arc<dyn PairSource>,
        vote_sink: Arc<dyn VoteSink>,
    ) -> Self {
        Self {
            config,
            pair_source,
            vote_sink,
            cards: CardBuilder::new(None),
            tracker: GestureTracker::new(config.lean_deadzone),
            phase: SessionPhase::Counting(config.initial_count),
            state: SessionState::Idle,
            animation_lock: false,
            card: None,
            exiting: None,
            notice: None,
            exit_timer: None,
            pair_fetch: None,
            votes: JoinSet::new(),
        }
    }

    pub fn with_card_builder(mut self, cards: CardBuilder) -> Self {
        self.cards = cards;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.animation_lock
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn pending_votes(&self) -> usize {
        self.votes.len()
    }

    /// True when no timer, fetch or vote submission is outstanding.
    pub fn is_settled(&self) -> bool {
        self.exit_timer.is_none() && self.pair_fetch.is_none() && self.votes.is_empty()
    }

    /// Requests the first pair. Only meaningful from `Idle`.
    pub fn start(&mut self) {
        if self.state != SessionState::Idle {
            debug!(state = ?self.state, "session already started");
            return;
        }
        self.state = SessionState::Loading;
        self.spawn_pair_fetch();
    }

    /// Applies one surface command. Returns an exit when the user leaves the
    /// session.
    pub fn handle(&mut self, command: UiCommand) -> Option<SessionExit> {
        if self.state == SessionState::Finished {
            debug!(?command, "session finished; command ignored");
            return None;
        }

        match command {
            UiCommand::Input { card, event } => {
                self.handle_input(card, &event);
                None
            }
            UiCommand::ContinueUnbounded => {
                if self.state != SessionState::AwaitingChoice {
                    debug!(state = ?self.state, "continue not offered");
                    return None;
                }
                info!("switching to unbounded mode");
                self.phase = SessionPhase::Unbounded;
                self.state = SessionState::Loading;
                self.spawn_pair_fetch();
                None
            }
            UiCommand::ViewResults => {
                let offered = self.state == SessionState::AwaitingChoice
                    || self.phase == SessionPhase::Unbounded;
                if !offered {
                    debug!(state = ?self.state, "results not offered");
                    return None;
                }
                info!("leaving session for results");
                self.finish();
                Some(SessionExit::ViewResults)
            }
            UiCommand::Reload => {
                if !matches!(self.state, SessionState::Stalled | SessionState::Idle) {
                    debug!(state = ?self.state, "reload ignored");
                    return None;
                }
                self.state = SessionState::Loading;
                self.spawn_pair_fetch();
                None
            }
        }
    }

    /// Waits for the next internal event (exit animation finished, pair
    /// fetched, vote settled, notice expired) and applies it. Cancel safe.
    pub async fn tick(&mut self) {
        let notice_deadline = self.notice.as_ref().map(|notice| notice.expires_at);
        tokio::select! {
            () = wait_timer(&mut self.exit_timer) => self.finish_exit_animation(),
            joined = wait_fetch(&mut self.pair_fetch) => self.pair_arrived(joined),
            Some(joined) = self.votes.join_next(), if !self.votes.is_empty() => log_vote(joined),
            () = wait_deadline(notice_deadline) => self.expire_notice(),
        }
    }

    pub fn frame(&self) -> RenderFrame {
        let actions_visible = self.state == SessionState::AwaitingChoice;
        RenderFrame {
            state: self.state,
            phase: self.phase,
            card: self.card.clone(),
            leaning: self.tracker.leaning(),
            exiting: self.exiting,
            counter: self.phase.remaining().filter(|_| !actions_visible),
            actions_visible,
            results_shortcut_visible: self.phase == SessionPhase::Unbounded
                && self.state != SessionState::Finished,
            notice: self.notice.as_ref().map(|notice| notice.message.clone()),
        }
    }

    /// Drives the session until the user leaves or the command channel
    /// closes, publishing a frame after every change.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<UiCommand>,
        frames: watch::Sender<RenderFrame>,
    ) -> SessionExit {
        self.start();
        frames.send_replace(self.frame());

        let exit = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Some(exit) = self.handle(command) {
                            break exit;
                        }
                    }
                    None => break SessionExit::Closed,
                },
                () = self.tick() => {}
            }
            self.publish(&frames);
        };

        self.publish(&frames);
        self.shutdown().await;
        exit
    }

    /// Stops pending timers and fetches and waits for issued votes to settle.
    pub async fn shutdown(&mut self) {
        self.exit_timer = None;
        if let Some(fetch) = self.pair_fetch.take() {
            fetch.abort();
        }
        while let Some(joined) = self.votes.join_next().await {
            log_vote(joined);
        }
    }

    fn publish(&self, frames: &watch::Sender<RenderFrame>) {
        frames.send_if_modified(|current| {
            let next = self.frame();
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn handle_input(&mut self, target: CardId, event: &InputEvent) {
        let Some(card) = &self.card else {
            debug!(%target, "input with no card on screen");
            return;
        };
        if !card.accepts(target) {
            debug!(%target, current = %card.id(), "input for a replaced card");
            return;
        }

        match self.tracker.feed(event, self.animation_lock) {
            TrackerOutput::Ignored => {
                debug!(locked = self.animation_lock, ?event, "input ignored");
            }
            TrackerOutput::Started | TrackerOutput::Moved { .. } => {}
            TrackerOutput::Released { delta } => match decide(delta, self.config.swipe_threshold) {
                Decision::Cancel => debug!(delta, "swipe below threshold; card reset"),
                Decision::Vote(side) => self.resolve(side),
            },
        }
    }

    fn resolve(&mut self, side: Side) {
        let Some(card) = &self.card else {
            return;
        };
        let (winner, loser) = card.pair().outcome(side);
        info!(%winner, %loser, card = %card.id(), "vote cast");

        self.animation_lock = true;
        self.exiting = Some(side);
        self.state = SessionState::Resolving(ResolveStep::Animating);

        let sink = Arc::clone(&self.vote_sink);
        self.votes.spawn(async move {
            let result = sink.submit_vote(winner, loser).await;
            (winner, loser, result)
        });
        self.exit_timer = Some(Box::pin(time::sleep(self.config.exit_animation)));
    }

    fn finish_exit_animation(&mut self) {
        self.exit_timer = None;
        self.exiting = None;
        self.teardown_card();

        if let SessionPhase::Counting(remaining) = self.phase {
            let remaining = remaining.saturating_sub(1);
            self.phase = SessionPhase::Counting(remaining);
            if remaining == 0 {
                info!("comparison budget used up; offering continue or results");
                self.state = SessionState::AwaitingChoice;
                self.animation_lock = false;
                return;
            }
            debug!(remaining, "counter decremented");
        }

        self.state = SessionState::Resolving(ResolveStep::Fetching);
        self.spawn_pair_fetch();
    }

    fn spawn_pair_fetch(&mut self) {
        let source = Arc::clone(&self.pair_source);
        let fetch = tokio::spawn(async move { source.request_pair().await });
        if let Some(previous) = self.pair_fetch.replace(fetch) {
            previous.abort();
        }
    }

    fn pair_arrived(
        &mut self,
        joined: std::result::Result<std::result::Result<Pair, PairSourceError>, JoinError>,
    ) {
        self.pair_fetch = None;
        match joined {
            Ok(Ok(pair)) => self.install(pair),
            Ok(Err(err)) => {
                warn!(error = %err, "failed to load next pair");
                self.stall(err.notice_text());
            }
            Err(err) => {
                warn!(error = %err, "pair fetch task did not complete");
                self.stall("Could not load the next pair.".to_string());
            }
        }
    }

    fn install(&mut self, pair: Pair) {
        self.teardown_card();
        let card = self.cards.build(pair);
        info!(
            card = %card.id(),
            left = %card.pair().left.id,
            right = %card.pair().right.id,
            remaining = ?self.phase.remaining(),
            "pair installed"
        );
        self.card = Some(card);
        self.tracker.reset();
        self.state = SessionState::AwaitingGesture;
        self.animation_lock = false;
    }

    fn stall(&mut self, message: String) {
        self.teardown_card();
        self.notice = Some(Notice {
            message,
            expires_at: Instant::now() + self.config.notice_ttl,
        });
        self.state = SessionState::Stalled;
        self.animation_lock = false;
    }

    fn teardown_card(&mut self) {
        if let Some(card) = self.card.take() {
            debug!(card = %card.id(), "card torn down");
        }
        self.tracker.reset();
    }

    fn expire_notice(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.expires_at <= Instant::now())
        {
            self.notice = None;
        }
    }

    fn finish(&mut self) {
        self.exit_timer = None;
        self.exiting = None;
        if let Some(fetch) = self.pair_fetch.take() {
            fetch.abort();
        }
        self.teardown_card();
        self.animation_lock = false;
        self.state = SessionState::Finished;
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // Issued votes are never cancelled.
        self.votes.detach_all();
    }
}

async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}

async fn wait_fetch<T>(fetch: &mut Option<JoinHandle<T>>) -> std::result::Result<T, JoinError> {
    match fetch {
        Some(handle) => handle.await,
        None => future::pending().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

fn log_vote(joined: std::result::Result<VoteOutcome, JoinError>) {
    match joined {
        Ok((winner, loser, Ok(VoteReceipt::Recorded))) => {
            debug!(%winner, %loser, "vote recorded");
        }
        Ok((winner, loser, Ok(VoteReceipt::RateLimited))) => {
            debug!(%winner, %loser, "vote rate limited by server");
        }
        Ok((winner, loser, Err(err))) => {
            warn!(%winner, %loser, error = %err, "vote submission failed");
        }
        Err(err) => warn!(error = %err, "vote task did not complete"),
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
