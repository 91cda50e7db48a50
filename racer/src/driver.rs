//! The per-frame client loop.
//!
//! One call to [`Driver::frame`] does what a browser animation callback does:
//! pick up finished score-service replies, run the registration flow, advance
//! the session by wall-clock time, render, and present. Service requests are
//! spawned on the current-thread runtime and never block a frame; their
//! replies come back over a channel and are applied at the start of a later
//! frame.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use racer_core::input::encode_input_byte;
use racer_core::sim::ReplayResult;
use racer_core::{render, FixedStep, FrameInput, Hud, RideError, RideLog, Session, SessionEvent};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::client::{Registration, ScoreService};
use crate::profile::ProfileCache;
use crate::surface::{NamePrompt, Surface};

const SETTLE_POLL: Duration = Duration::from_millis(5);
const NAME_TAKEN_ALERT: &str = "Player name already exists";
const NAME_REQUIRED_ALERT: &str = "Player name is required";

enum Reply {
    Registration {
        name: String,
        outcome: Result<Registration>,
    },
    HighScore {
        name: String,
        outcome: Result<Option<i64>>,
    },
    Submission {
        name: String,
        score: u32,
        outcome: Result<()>,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub ticks: u32,
    pub events: Vec<SessionEvent>,
    pub game_over: bool,
}

pub struct Driver<S, U> {
    service: S,
    surface: U,
    prompt: Box<dyn NamePrompt>,
    profile: ProfileCache,
    session: Session,
    seed: u32,
    inputs: Vec<u8>,
    hud: Hud,
    registering: Option<String>,
    high_score_for: Option<String>,
    score_submitted: bool,
    in_flight: usize,
    replies_tx: UnboundedSender<Reply>,
    replies_rx: UnboundedReceiver<Reply>,
}

impl<S, U> Driver<S, U>
where
    S: ScoreService + Clone + 'static,
    U: Surface,
{
    pub fn new(
        seed: u32,
        clock: FixedStep,
        service: S,
        surface: U,
        prompt: Box<dyn NamePrompt>,
        profile: ProfileCache,
    ) -> Self {
        let (replies_tx, replies_rx) = unbounded_channel();
        let hud = Hud {
            player_name: profile.player_name().map(str::to_string),
            high_score: None,
        };
        Self {
            service,
            surface,
            prompt,
            profile,
            session: Session::with_clock(seed, clock),
            seed,
            inputs: Vec::new(),
            hud,
            registering: None,
            high_score_for: None,
            score_submitted: false,
            in_flight: 0,
            replies_tx,
            replies_rx,
        }
    }

    /// Must run inside an actix system: score requests are spawned locally.
    pub fn frame(&mut self, delta: Duration, input: FrameInput) -> Result<FrameReport> {
        self.drain_replies();
        self.ensure_registered();
        self.ensure_high_score();

        let advance = self.session.advance(delta, input);
        let byte = encode_input_byte(input);
        self.inputs
            .resize(self.inputs.len() + advance.ticks as usize, byte);
        for event in &advance.events {
            match event {
                SessionEvent::GameOver { score, hit_count } => {
                    let frame = self.session.snapshot().frame_count;
                    tracing::info!(score, hit_count, frame, "game over");
                }
                SessionEvent::HitCounted { hit_count } => tracing::debug!(hit_count, "hit"),
                other => tracing::trace!(event = ?other, "session event"),
            }
        }

        let scene = render(&self.session.snapshot(), &self.hud);
        self.surface.present(&scene)?;

        if scene.game_over_overlay && !self.score_submitted {
            self.score_submitted = true;
            self.submit_final_score();
        }

        Ok(FrameReport {
            ticks: advance.ticks,
            events: advance.events,
            game_over: scene.game_over_overlay,
        })
    }

    /// Wait up to `grace` for outstanding requests, applying their replies.
    /// Whatever is still pending afterwards is abandoned.
    pub async fn settle(&mut self, grace: Duration) {
        let deadline = Instant::now() + grace;
        loop {
            self.drain_replies();
            if self.in_flight == 0 || Instant::now() >= deadline {
                break;
            }
            actix_rt::time::sleep(SETTLE_POLL).await;
        }
        if self.in_flight > 0 {
            tracing::warn!(pending = self.in_flight, "abandoning unanswered score requests");
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn profile(&self) -> &ProfileCache {
        &self.profile
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn score_submitted(&self) -> bool {
        self.score_submitted
    }

    pub fn result(&self) -> ReplayResult {
        self.session.result()
    }

    /// Ride log of every tick played so far.
    pub fn ride(&self) -> Result<RideLog, RideError> {
        RideLog::record(self.seed, &self.inputs)
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = Reply> + 'static,
    {
        let replies = self.replies_tx.clone();
        self.in_flight += 1;
        actix_rt::spawn(async move {
            // A closed channel means the driver is gone and nobody wants this.
            let _ = replies.send(request.await);
        });
    }

    fn drain_replies(&mut self) {
        while let Ok(reply) = self.replies_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(reply);
        }
    }

    fn apply(&mut self, reply: Reply) {
        match reply {
            Reply::Registration { name, outcome } => {
                self.registering = None;
                match outcome {
                    Ok(Registration::Registered) => {
                        tracing::info!(player = %name, "player registered");
                        if let Err(err) = self.profile.store(&name) {
                            tracing::error!(player = %name, "failed caching player name: {err:#}");
                        }
                    }
                    Ok(Registration::NameTaken) => self.reject_name(&name, NAME_TAKEN_ALERT),
                    Ok(Registration::Rejected(message)) => self.reject_name(&name, &message),
                    Err(err) => {
                        tracing::error!(player = %name, "registration failed: {err:#}");
                        self.reject_name(&name, &format!("Registration failed: {err}"));
                    }
                }
                self.hud.player_name = self.profile.player_name().map(str::to_string);
            }
            Reply::HighScore { name, outcome } => {
                if self.profile.player_name() != Some(name.as_str()) {
                    tracing::debug!(player = %name, "dropping high score for a stale player");
                    return;
                }
                match outcome {
                    Ok(high_score) => self.hud.high_score = high_score,
                    Err(err) => tracing::warn!(player = %name, "high score fetch failed: {err:#}"),
                }
            }
            Reply::Submission {
                name,
                score,
                outcome,
            } => match outcome {
                Ok(()) => tracing::info!(player = %name, score, "score submitted"),
                Err(err) => {
                    tracing::error!(player = %name, score, "score submission failed: {err:#}");
                    self.surface.alert(&format!("Score submission failed: {err}"));
                }
            },
        }
    }

    fn reject_name(&mut self, name: &str, message: &str) {
        tracing::warn!(player = name, "registration rejected: {message}");
        self.surface.alert(message);
        if let Err(err) = self.profile.clear() {
            tracing::error!("failed clearing cached player name: {err:#}");
        }
    }

    fn ensure_registered(&mut self) {
        if self.profile.player_name().is_some() || self.registering.is_some() {
            return;
        }
        let Some(answer) = self.prompt.prompt() else {
            return;
        };
        let name = answer.trim().to_string();
        if name.is_empty() {
            self.surface.alert(NAME_REQUIRED_ALERT);
            return;
        }

        tracing::info!(player = %name, "registering player");
        self.registering = Some(name.clone());
        let service = self.service.clone();
        self.spawn(async move {
            let outcome = service.register_player(&name).await;
            Reply::Registration { name, outcome }
        });
    }

    fn ensure_high_score(&mut self) {
        let name = match self.profile.player_name() {
            Some(name) if self.high_score_for.as_deref() != Some(name) => name.to_string(),
            _ => return,
        };

        self.high_score_for = Some(name.clone());
        self.hud.high_score = None;
        let service = self.service.clone();
        self.spawn(async move {
            let outcome = service.fetch_high_score(&name).await;
            Reply::HighScore { name, outcome }
        });
    }

    fn submit_final_score(&mut self) {
        let score = self.session.result().final_score;
        let Some(name) = self.profile.player_name().map(str::to_string) else {
            tracing::info!(score, "no registered player; score not submitted");
            return;
        };

        let service = self.service.clone();
        self.spawn(async move {
            let outcome = service.submit_score(&name, score).await;
            Reply::Submission {
                name,
                score,
                outcome,
            }
        });
    }
}

#[cfg(test)]
mod tests;
