//! Session refresh coordination.
//!
//! Several requests can hit a 401 at the same time when the session cookie
//! expires. Only one of them may call the refresh endpoint; the others wait
//! for that attempt and reuse its outcome.

use std::future::Future;

use tokio::sync::Mutex;

use crate::error::ApiError;

/// Identifies a refresh epoch. Callers record it before sending a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug)]
struct RefreshState {
    generation: u64,
    last_outcome: Result<(), ApiError>,
}

/// Single-flight guard around the session refresh call.
#[derive(Debug)]
pub struct SessionRefresher {
    state: Mutex<RefreshState>,
}

impl Default for SessionRefresher {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRefresher {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState {
                generation: 0,
                last_outcome: Ok(()),
            }),
        }
    }

    /// Epoch to remember before issuing a request.
    pub async fn generation(&self) -> Generation {
        Generation(self.state.lock().await.generation)
    }

    /// Refresh the session after a 401 seen under `observed`.
    ///
    /// If another caller completed a refresh since `observed`, its outcome is
    /// returned without calling `refresh` again. The lock is held for the whole
    /// refresh so concurrent callers queue behind the one in progress.
    pub async fn refresh<F, Fut>(&self, observed: Generation, refresh: F) -> Result<(), ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let mut state = self.state.lock().await;

        if state.generation != observed.0 {
            tracing::debug!(
                generation = state.generation,
                "session already refreshed by a concurrent request"
            );
            return state.last_outcome.clone();
        }

        tracing::info!("refreshing session");
        let outcome = refresh().await;
        if let Err(e) = &outcome {
            tracing::warn!("session refresh failed: {}", e);
        }

        state.generation += 1;
        state.last_outcome = outcome.clone();
        outcome
    }
}
