use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::classifier::GateRequirement;
use crate::error::{GateError, GateResult};
use crate::quiz::{self, Question, Quiz, QuizResult};
use crate::reading::{BlockCompletion, BlockSample, ReadingBlock, ReadingProgressTracker, ReadingState};
use crate::settings::GateSettings;
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::unlock::UnlockPolicy;

use super::state::{ExemptReason, GateState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Comprehension gate for one article view.
///
/// Owned by whoever opened the view and dropped (or `close`d) with it; nothing
/// here is persisted. All mutation goes through `&mut self`, so samples are
/// applied strictly in arrival order.
pub struct GateSession {
    id: String,
    article_id: String,
    requirement: GateRequirement,
    state: GateState,
    tracker: ReadingProgressTracker,
    policy: UnlockPolicy,
    quiz: Option<Quiz>,
    quiz_result: Option<QuizResult>,
    opened_at: Option<DateTime<Utc>>,
    debug_logging: bool,
    telemetry: Arc<dyn TelemetrySink>,
}

impl GateSession {
    pub fn new(
        article_id: impl Into<String>,
        blocks: Vec<ReadingBlock>,
        requirement: GateRequirement,
        settings: &GateSettings,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            article_id: article_id.into(),
            requirement,
            state: GateState::Idle,
            tracker: ReadingProgressTracker::new(blocks, settings.reading),
            policy: UnlockPolicy::new(settings.unlock),
            quiz: None,
            quiz_result: None,
            opened_at: None,
            debug_logging: settings.debug_logging,
            telemetry,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    pub fn requirement(&self) -> GateRequirement {
        self.requirement
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn reading_state(&self) -> &ReadingState {
        self.tracker.state()
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn quiz_result(&self) -> Option<QuizResult> {
        self.quiz_result
    }

    pub fn violation_count(&self) -> u32 {
        self.policy.violation_count()
    }

    /// Read ratio currently needed to unlock, raised after any velocity violation.
    pub fn effective_required_ratio(&self) -> f64 {
        self.policy.required_read_ratio()
    }

    /// The one question the rest of the app asks: may this post be shared yet?
    pub fn can_share(&self) -> bool {
        self.state.can_share()
    }

    /// Open the article view. Posts that need no quiz are exempted immediately.
    pub fn open(&mut self, at: DateTime<Utc>) -> GateResult<GateState> {
        if self.state != GateState::Idle {
            return Err(self.invalid_transition("open"));
        }

        if !self.requirement.is_gate_required() {
            log_info!("gate not required for article {}", self.article_id);
            self.state = GateState::Exempt(ExemptReason::NotRequired);
            return Ok(self.state);
        }

        self.opened_at = Some(at);
        self.state = GateState::Reading;
        self.emit(TelemetryEvent::ReaderViewOpened {
            article_id: self.article_id.clone(),
            total_blocks: self.tracker.total_blocks(),
            total_words: self.tracker.total_words(),
        });
        log_info!(
            "gate session {} reading article {} ({} blocks, {} words)",
            self.id,
            self.article_id,
            self.tracker.total_blocks(),
            self.tracker.total_words()
        );

        // An article with nothing to read is unlockable from the start.
        let decision = self.policy.evaluate(self.tracker.state(), None);
        if decision.unlockable {
            self.promote_to_unlockable(decision.newly_unlocked, at);
        }

        Ok(self.state)
    }

    /// Feed one viewport sample. Samples outside reading/unlockable are ignored,
    /// and malformed ones are dropped without touching progress.
    pub fn observe(&mut self, sample: &BlockSample) -> GateState {
        if !self.state.accepts_samples() {
            log_debug!(
                self.debug_logging,
                "ignoring sample for {} while {}",
                sample.block_id,
                self.state.as_str()
            );
            return self.state;
        }

        let (completed, decision) = match self.tracker.observe(sample) {
            Ok(observation) => {
                let decision = self
                    .policy
                    .evaluate(observation.state, observation.completed.as_ref());
                (observation.completed, decision)
            }
            Err(err) => {
                log_warn!("dropping sample on article {}: {}", self.article_id, err);
                return self.state;
            }
        };

        log_debug!(
            self.debug_logging,
            "sample {} coverage={:.2} dwell={}ms ratio={:.3}",
            sample.block_id,
            sample.coverage,
            sample.dwell_ms,
            self.tracker.state().read_ratio
        );

        if let Some(completion) = &completed {
            self.record_completion(completion);
        }

        if let Some(violation) = decision.violation {
            log_warn!(
                "velocity violation on article {} block {}: {:.1} w/s > {:.1} w/s",
                self.article_id,
                violation.block_id,
                violation.velocity,
                violation.threshold
            );
            self.emit(TelemetryEvent::ReaderVelocityViolation {
                article_id: self.article_id.clone(),
                velocity: violation.velocity,
                threshold: violation.threshold,
            });
        }

        if decision.unlockable && self.state == GateState::Reading {
            self.promote_to_unlockable(decision.newly_unlocked, sample.timestamp);
        }

        self.state
    }

    /// Present the quiz. Too-sparse question pools exempt the post instead and
    /// return `InsufficientContent` so the caller can tell the user why.
    pub fn start_quiz<R: Rng + ?Sized>(
        &mut self,
        source_pool: &[Question],
        user_pool: &[Question],
        rng: &mut R,
    ) -> GateResult<&Quiz> {
        if self.state != GateState::Unlockable {
            return Err(self.invalid_transition("start quiz"));
        }

        self.state = GateState::Quizzing;
        self.emit(TelemetryEvent::GateTestStarted {
            article_id: self.article_id.clone(),
            final_read_ratio: self.tracker.state().read_ratio,
        });

        match quiz::compose(&self.requirement, source_pool, user_pool, rng) {
            Ok(composed) => {
                log_info!(
                    "quiz of {} questions started for article {}",
                    composed.len(),
                    self.article_id
                );
                self.quiz_result = None;
                Ok(self.quiz.insert(composed))
            }
            Err(err @ GateError::InsufficientContent { .. }) => {
                log_info!("exempting article {}: {}", self.article_id, err);
                self.quiz = None;
                self.state = GateState::Exempt(ExemptReason::InsufficientContent);
                Err(err)
            }
            Err(err) => {
                self.state = GateState::Unlockable;
                Err(err)
            }
        }
    }

    /// Score the answers to the current quiz; `answers[i]` answers `quiz.items[i]`.
    pub fn submit_answers(&mut self, answers: &[usize]) -> GateResult<QuizResult> {
        let Some(current) = self.quiz.as_ref().filter(|_| self.state == GateState::Quizzing)
        else {
            return Err(self.invalid_transition("submit answers"));
        };

        let result = quiz::score(current, answers);
        self.quiz_result = Some(result);
        self.state = if result.passed {
            GateState::Passed
        } else {
            GateState::Failed
        };
        log_info!(
            "article {} quiz {}: {}/{} correct",
            self.article_id,
            self.state.as_str(),
            result.correct_count,
            result.total
        );

        Ok(result)
    }

    /// Dismiss a failed quiz and go back to the article. Unlock is kept, so
    /// the quiz can be retaken straight away.
    pub fn resume_reading(&mut self) -> GateResult<GateState> {
        if self.state != GateState::Failed {
            return Err(self.invalid_transition("resume reading"));
        }
        self.quiz = None;
        self.state = if self.policy.is_unlocked() {
            GateState::Unlockable
        } else {
            GateState::Reading
        };
        Ok(self.state)
    }

    /// Tear the view down. Reading progress is discarded with the session.
    pub fn close(self) -> GateState {
        log_info!(
            "gate session {} closed in state {} (ratio {:.3})",
            self.id,
            self.state.as_str(),
            self.tracker.state().read_ratio
        );
        self.state
    }

    fn promote_to_unlockable(&mut self, newly_unlocked: bool, at: DateTime<Utc>) {
        self.state = GateState::Unlockable;
        if !newly_unlocked {
            return;
        }

        let state = self.tracker.state();
        let time_ms = self
            .opened_at
            .map(|opened| (at - opened).num_milliseconds().max(0) as u64)
            .unwrap_or(0);
        log_info!(
            "article {} unlocked at ratio {:.3} after {}ms",
            self.article_id,
            state.read_ratio,
            time_ms
        );
        self.emit(TelemetryEvent::ReaderUnlockReached {
            article_id: self.article_id.clone(),
            read_ratio: state.read_ratio,
            read_blocks: state.completed_blocks.len(),
            total_blocks: self.tracker.total_blocks(),
            time_ms,
        });
    }

    fn record_completion(&self, completion: &BlockCompletion) {
        log_debug!(
            self.debug_logging,
            "block {} completed: {} words in {}ms",
            completion.block_id,
            completion.word_count,
            completion.dwell_ms
        );
        self.emit(TelemetryEvent::ReaderBlockCompleted {
            article_id: self.article_id.clone(),
            block_id: completion.block_id.clone(),
            block_index: completion.block_index,
            dwell_ms: completion.dwell_ms,
            coverage: completion.coverage,
            words: completion.word_count,
        });
    }

    fn emit(&self, event: TelemetryEvent) {
        self.telemetry.record(&self.id, event);
    }

    fn invalid_transition(&self, action: &'static str) -> GateError {
        if cfg!(debug_assertions) {
            panic!("cannot {action} while gate is {}", self.state.as_str());
        }
        GateError::InvalidTransition {
            state: self.state.as_str(),
            action,
        }
    }
}
