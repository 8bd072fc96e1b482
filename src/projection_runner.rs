//! One-shot DCA projection submissions.
//!
//! Projections are never cached. The runner holds at most one result and
//! refuses to start a second request while one is outstanding.

use crate::core::api::{AnalyticsApi, ApiError};
use crate::core::error::{SchemaViolation, ValidationError};
use crate::core::model::DcaRequest;
use crate::view::projection::ProjectionView;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Submitting(DcaRequest),
    Succeeded(Arc<ProjectionView>),
    Failed(SubmitFailure),
}

/// What a call to [`ProjectionRunner::submit`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Another submission was already in flight; nothing was sent.
    Ignored,
    Succeeded(Arc<ProjectionView>),
    Failed(SubmitFailure),
}

/// Why a submission that reached the service produced no projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitFailure {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Projection response violates its contract: {0}")]
    Schema(#[from] SchemaViolation),
}

pub struct ProjectionRunner {
    api: Arc<dyn AnalyticsApi>,
    state: Mutex<SubmissionState>,
}

/// Puts the runner back to `Idle` if a submission is dropped before its
/// outcome is stored.
struct InFlight<'a> {
    state: &'a Mutex<SubmissionState>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let SubmissionState::Submitting(request) = &*state {
            debug!(asset = %request.asset_id, "Submission cancelled");
            *state = SubmissionState::Idle;
        }
    }
}

impl ProjectionRunner {
    pub fn new(api: Arc<dyn AnalyticsApi>) -> Self {
        ProjectionRunner {
            api,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(*self.lock(), SubmissionState::Submitting(_))
    }

    /// Validates `request`, then runs it unless another submission is
    /// already in flight.
    ///
    /// Invalid input leaves the state as it was and never reaches the API.
    /// Dropping the returned future mid-request returns the runner to `Idle`.
    pub async fn submit(&self, request: DcaRequest) -> Result<Submission, ValidationError> {
        request.validate()?;

        let mut in_flight = {
            let mut state = self.lock();
            if let SubmissionState::Submitting(current) = &*state {
                debug!(asset = %current.asset_id, "Submission already in flight, ignoring");
                return Ok(Submission::Ignored);
            }
            *state = SubmissionState::Submitting(request.clone());
            InFlight {
                state: &self.state,
                armed: true,
            }
        };
        info!(
            asset = %request.asset_id,
            amount = request.amount,
            frequency = %request.frequency,
            years = request.duration_years,
            "Submitting DCA projection"
        );

        let outcome = self
            .api
            .dca_projection(&request)
            .await
            .map_err(SubmitFailure::from)
            .and_then(|result| Ok(ProjectionView::try_from_result(&result)?));

        let mut state = self.lock();
        in_flight.armed = false;
        match outcome {
            Ok(view) => {
                let view = Arc::new(view);
                *state = SubmissionState::Succeeded(Arc::clone(&view));
                Ok(Submission::Succeeded(view))
            }
            Err(failure) => {
                match &failure {
                    SubmitFailure::Schema(violation) => {
                        warn!(error = %violation, "Discarding malformed projection")
                    }
                    SubmitFailure::Api(e) => debug!(error = %e, "DCA projection failed"),
                }
                *state = SubmissionState::Failed(failure.clone());
                Ok(Submission::Failed(failure))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
