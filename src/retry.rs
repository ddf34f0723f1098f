/// Best-effort retries for host tab calls
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use log::{debug, warn};

use crate::config::RetryPolicy;
use crate::error::HostResult;
use crate::host::TabHost;

/// Counter bumped by every regroup; retry loops from older regroups stop
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Rc<Cell<u64>>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, cancelling tokens from earlier ones
    pub fn advance(&self) -> CancelToken {
        let next = self.current.get() + 1;
        self.current.set(next);
        CancelToken {
            current: Some(self.current.clone()),
            issued: next,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    current: Option<Rc<Cell<u64>>>,
    issued: u64,
}

impl CancelToken {
    /// A token no regroup can cancel
    pub fn detached() -> Self {
        CancelToken {
            current: None,
            issued: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.get() != self.issued)
    }
}

/// Run `call` until it succeeds, at most `policy.max_attempts` times with
/// `policy.delay_ms` between attempts.
///
/// Gives up silently (returns `None`) once attempts are exhausted or `token`
/// is cancelled; the last error is logged.
pub async fn with_retry<H, T, F, Fut>(
    host: &H,
    policy: RetryPolicy,
    token: &CancelToken,
    what: &str,
    mut call: F,
) -> Option<T>
where
    H: TabHost,
    F: FnMut() -> Fut,
    Fut: Future<Output = HostResult<T>>,
{
    let mut attempt = 1;
    loop {
        if token.is_cancelled() {
            debug!("{} superseded before attempt {}", what, attempt);
            return None;
        }

        match call().await {
            Ok(value) => return Some(value),
            Err(e) if attempt >= policy.max_attempts => {
                warn!("{} failed after {} attempts: {}", what, attempt, e);
                return None;
            }
            Err(e) => {
                debug!("{} attempt {} failed: {}", what, attempt, e);
                host.sleep(policy.delay_ms).await;
                attempt += 1;
            }
        }
    }
}
