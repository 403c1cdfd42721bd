use std::sync::Arc;

use crate::api::{StepAdvance, StepApi};
use crate::error::{FlowError, StepApiError};
use crate::payload::build_payload;
use crate::session::StepSession;

/// What an advancement request did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The cursor moved to the next question; no network involved.
    Advanced,
    /// The service accepted the step's answers and returned the next step.
    StepChanged,
    /// The service reported no further step; the questionnaire is complete.
    Finished,
    /// The service rejected the submitted answers; field errors are set.
    Rejected,
    /// The response answered a step that is no longer active and was
    /// discarded.
    Superseded,
}

/// Drives a [`StepSession`] against the remote step service.
///
/// Decides per advance whether a local cursor increment suffices or the
/// accumulated answers must be synchronized, and folds every outcome back
/// into the session.
#[derive(Clone)]
pub struct StepFlowService {
    api: Arc<dyn StepApi>,
    session_id: Option<String>,
}

impl StepFlowService {
    #[must_use]
    pub fn new(api: Arc<dyn StepApi>) -> Self {
        Self {
            api,
            session_id: None,
        }
    }

    /// Pre-seeds the session identifier, e.g. one restored by the caller.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Creates or resumes a questionnaire session, adopting the reported
    /// current step when one exists.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` on transport failure; the session keeps the
    /// failure as its aggregate error message.
    pub async fn initialize(&mut self, session: &mut StepSession) -> Result<(), FlowError> {
        session.begin_loading();
        match self.api.initialize_session().await {
            Ok(init) => {
                self.session_id = Some(init.session_id);
                match init.current_step {
                    Some(step) => session.set_step(step),
                    None => session.finish_loading(),
                }
                Ok(())
            }
            Err(err) => {
                session.fail(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Loads a step by identifier and adopts it, rebuilding the label map.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` on transport failure.
    pub async fn load_step(
        &self,
        session: &mut StepSession,
        step_id: u32,
    ) -> Result<(), FlowError> {
        session.begin_loading();
        match self.api.fetch_step(step_id).await {
            Ok(step) => {
                session.adopt_fetched_step(step);
                Ok(())
            }
            Err(err) => {
                session.fail(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Advances past the question just answered.
    ///
    /// For non-trigger questions before the end of the step this is a pure
    /// local cursor increment. Otherwise the step's answers are serialized
    /// and submitted, and the response folds back into the session: next
    /// step, completion, or a validation rejection (which is a normal
    /// outcome, reported as `AdvanceOutcome::Rejected`).
    ///
    /// # Errors
    ///
    /// Returns `FlowError::MissingSession` if synchronization is required
    /// before a session identifier was obtained; no network call is made.
    /// Returns `FlowError::Api` on transport failure. In both cases the
    /// session keeps its step and answers and carries the aggregate error.
    pub async fn advance(
        &self,
        session: &mut StepSession,
        answered_code: Option<&str>,
    ) -> Result<AdvanceOutcome, FlowError> {
        if session.step().is_none() {
            return Ok(AdvanceOutcome::Advanced);
        }

        if !session.sync_required(answered_code) {
            session.advance_local();
            return Ok(AdvanceOutcome::Advanced);
        }

        let Some(session_id) = self.session_id.as_deref() else {
            session.fail("missing session identifier");
            return Err(FlowError::MissingSession);
        };

        let Some((step_code, payload)) = session
            .step()
            .map(|step| (step.code.clone(), build_payload(step, session.answers())))
        else {
            return Ok(AdvanceOutcome::Advanced);
        };

        session.begin_loading();
        match self
            .api
            .send_step_answer(session_id, &step_code, payload)
            .await
        {
            Ok(advance) => {
                // A response for a step other than the active one answers a
                // superseded submission and must not touch the session.
                if session.step().is_none_or(|step| step.code != step_code) {
                    session.finish_loading();
                    return Ok(AdvanceOutcome::Superseded);
                }
                let outcome = match &advance {
                    StepAdvance::Next { .. } => AdvanceOutcome::StepChanged,
                    StepAdvance::Complete { .. } => AdvanceOutcome::Finished,
                };
                session.apply_advance(advance);
                Ok(outcome)
            }
            Err(StepApiError::Validation {
                status,
                url,
                errors,
            }) => {
                session.apply_rejection(status, &url, &errors);
                Ok(AdvanceOutcome::Rejected)
            }
            Err(err) => {
                session.fail(err.to_string());
                Err(err.into())
            }
        }
    }
}
