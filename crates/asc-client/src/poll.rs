//! Completion poller.
//!
//! Waits for an asynchronous remote job by re-fetching its status on a fixed
//! interval until a terminal predicate holds. State transitions are driven
//! purely by the fetched status; the context bounds the whole wait.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use asc_core::{ContextError, RequestContext};
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

/// Smallest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Why a wait ended without reaching a terminal status.
#[derive(Debug)]
pub enum WaitError<S, E> {
    /// The status fetch failed (after any retries it performs itself).
    Fetch(E),
    /// The context was cancelled or expired mid-wait.
    Interrupted {
        reason: ContextError,
        /// Most recent non-terminal status, if any fetch completed.
        last_status: Option<S>,
    },
}

impl<S, E> WaitError<S, E> {
    /// Last status observed before the wait was interrupted.
    pub const fn last_status(&self) -> Option<&S> {
        match self {
            Self::Interrupted { last_status, .. } => last_status.as_ref(),
            Self::Fetch(_) => None,
        }
    }
}

impl<S: fmt::Display, E: fmt::Display> fmt::Display for WaitError<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "failed to fetch status: {err}"),
            Self::Interrupted {
                reason,
                last_status: Some(status),
            } => write!(f, "{reason} while waiting; last observed status: {status}"),
            Self::Interrupted {
                reason,
                last_status: None,
            } => write!(f, "{reason} while waiting; no status observed yet"),
        }
    }
}

impl<S, E> StdError for WaitError<S, E>
where
    S: fmt::Debug + fmt::Display,
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Interrupted { reason, .. } => Some(reason),
        }
    }
}

/// Poll `fetch_status` until `is_terminal` holds for the returned status.
///
/// The first fetch happens immediately; later fetches happen on the ticks of a
/// fixed-interval ticker (missed ticks are skipped, not bunched). Each fetch
/// is itself raced against `ctx`.
pub async fn wait_for_completion<S, E, F, Fut, P>(
    ctx: &RequestContext,
    poll_interval: Duration,
    mut fetch_status: F,
    is_terminal: P,
) -> Result<S, WaitError<S, E>>
where
    S: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S, E>>,
    P: Fn(&S) -> bool,
{
    let mut ticker = interval(poll_interval.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut last_status: Option<S> = None;
    let mut polls = 0u32;

    loop {
        let status = match ctx.run(fetch_status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => {
                // A fetch that failed because the context ended is an interruption.
                if let Err(reason) = ctx.check() {
                    return Err(WaitError::Interrupted {
                        reason,
                        last_status,
                    });
                }
                return Err(WaitError::Fetch(err));
            }
            Err(reason) => {
                return Err(WaitError::Interrupted {
                    reason,
                    last_status,
                });
            }
        };
        polls += 1;

        if is_terminal(&status) {
            debug!(polls, %status, "Reached terminal status");
            return Ok(status);
        }
        debug!(polls, %status, "Not terminal yet");
        last_status = Some(status);

        tokio::select! {
            biased;

            reason = ctx.done() => {
                return Err(WaitError::Interrupted { reason, last_status });
            }
            _ = ticker.tick() => {}
        }
    }
}
