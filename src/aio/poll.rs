//! Completion polling for queries that run remotely.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Status reported by a remote query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Running,
    Succeeded,
    Failed(String),
}

/// Await `poll` until it reports a terminal status, sleeping `interval`
/// between checks. Gives up with [`Error::QueryTimeout`] after `max_polls`
/// checks that all reported [`QueryStatus::Running`].
pub async fn wait_for_completion<F, Fut>(mut poll: F, interval: Duration, max_polls: usize) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<QueryStatus>>,
{
    for attempt in 1..=max_polls {
        match poll().await? {
            QueryStatus::Succeeded => {
                tracing::debug!(target: "typed_sql::driver", attempt, "query completed");
                return Ok(());
            }
            QueryStatus::Failed(message) => return Err(Error::driver(message)),
            QueryStatus::Running => {
                if attempt < max_polls {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
    Err(Error::QueryTimeout { polls: max_polls })
}
