//! Retry executor.
//!
//! [`execute`] runs an idempotent operation, retrying only the failures the
//! call site tagged as [`RetryError::Retryable`]. Classification stays with
//! the call site (see [`ClientError::into_retry`](crate::ClientError::into_retry));
//! the executor never inspects error types itself.

mod policy;

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use asc_core::{ContextError, RequestContext};
use tracing::{debug, warn};

pub use policy::{InvalidRetryPolicy, RetryPolicy};

/// A failure tagged with whether it may be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Transient; the executor may run the operation again.
    Retryable(E),
    /// Returned to the caller immediately.
    Permanent(E),
}

impl<E> RetryError<E> {
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// The underlying error, whatever its tag.
    pub fn into_inner(self) -> E {
        match self {
            Self::Retryable(e) | Self::Permanent(e) => e,
        }
    }

    pub const fn inner(&self) -> &E {
        match self {
            Self::Retryable(e) | Self::Permanent(e) => e,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner().fmt(f)
    }
}

impl<E: StdError> StdError for RetryError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner().source()
    }
}

/// Run `op` until it succeeds, fails permanently, or the attempt budget runs out.
///
/// Between attempts the executor sleeps per `policy`; the sleep is the only
/// suspension point and ends early with the context's error if `ctx` is
/// cancelled or expires. On exhaustion the last error is returned without
/// its retry tag.
pub async fn execute<T, E, F, Fut>(ctx: &RequestContext, policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
    E: From<ContextError> + fmt::Display,
{
    let max_attempts = policy.max_attempts().max(1);
    let mut attempt = 1u32;

    loop {
        ctx.check()?;

        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(RetryError::Permanent(error)) => return Err(error),
            Err(RetryError::Retryable(error)) => error,
        };

        if attempt >= max_attempts {
            warn!(attempts = attempt, error = %error, "Giving up after transient failures");
            return Err(error);
        }

        let delay = policy.jittered_delay(attempt);
        warn!(
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %error,
            "Transient failure, retrying"
        );

        if let Err(reason) = ctx.sleep(delay).await {
            debug!(attempt, %reason, "Retry backoff interrupted");
            return Err(reason.into());
        }
        attempt += 1;
    }
}
