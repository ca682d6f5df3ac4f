//! Server availability probing with exponential backoff.
//!
//! [`wait_for_server`] keeps opening short-lived connections until one
//! succeeds or the [`BackoffPolicy`] runs out of attempts. Running out is
//! reported as [`Readiness::NotReady`], not as an error; callers decide
//! whether that is fatal.

use std::fmt::Display;
use std::future::Future;

use research_core::backoff::BackoffPolicy;
use sqlx::Connection;

use crate::connection::{connect, ConnectionProfile};
use crate::health_check;

/// Result of probing a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A connection succeeded on attempt number `attempts` (one-based).
    Ready { attempts: u32 },
    /// Every one of `attempts` connection attempts failed.
    NotReady { attempts: u32 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Readiness::Ready { attempts } | Readiness::NotReady { attempts } => *attempts,
        }
    }
}

/// Drive `attempt` until it succeeds or `policy.max_attempts` is reached.
///
/// After zero-based failed attempt `n` the task sleeps for
/// [`BackoffPolicy::delay_for`]`(n)`. No sleep follows the final attempt.
pub async fn probe_until_ready<F, Fut, E>(
    server: &str,
    policy: &BackoffPolicy,
    mut attempt: F,
) -> Readiness
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    for n in 0..policy.max_attempts {
        match attempt().await {
            Ok(()) => {
                tracing::info!(server, attempts = n + 1, "Database server is ready");
                return Readiness::Ready { attempts: n + 1 };
            }
            Err(e) => {
                tracing::warn!(
                    server,
                    error = %e,
                    "Attempt {}/{} failed",
                    n + 1,
                    policy.max_attempts,
                );
            }
        }

        if n + 1 < policy.max_attempts {
            tokio::time::sleep(policy.delay_for(n)).await;
        }
    }

    Readiness::NotReady {
        attempts: policy.max_attempts,
    }
}

/// Wait until `profile` accepts a connection.
///
/// Each attempt opens a connection with `policy.connect_timeout`, runs
/// [`health_check`] on it and closes it.
pub async fn wait_for_server(profile: &ConnectionProfile, policy: &BackoffPolicy) -> Readiness {
    let server = profile.target();
    probe_until_ready(&server, policy, || async move {
        let mut conn = connect(profile, policy.connect_timeout).await?;
        health_check(&mut conn).await?;
        conn.close().await
    })
    .await
}
