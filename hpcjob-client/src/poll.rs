//! Poll-until-terminal primitive
//!
//! Shared by the job event/log followers and the transfer monitor. Each loop
//! runs on the caller's task: fetch, render, check, sleep, repeat. A fetch
//! never starts before the previous fetch and its render have finished, and
//! fetch errors end the loop immediately.

use std::future::Future;
use std::time::Duration;
use tokio::time;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Timing of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Sleep between a non-terminal fetch and the next one
    pub interval: Duration,
    /// Give up with [`ClientError::Timeout`] once this much time has passed
    pub timeout: Option<Duration>,
}

impl PollOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Polls `fetch` until `is_terminal` accepts a value, and returns that value
///
/// `render` sees every fetched value, including the terminal one. There is
/// no sleep after the terminal fetch.
pub async fn poll_until_terminal<T, F, Fut, P, R>(
    mut fetch: F,
    mut is_terminal: P,
    mut render: R,
    options: PollOptions,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&T) -> bool,
    R: FnMut(&T),
{
    let polling = poll_loop(&mut fetch, &mut is_terminal, &mut render, options.interval);

    match options.timeout {
        Some(limit) => time::timeout(limit, polling)
            .await
            .map_err(|_| ClientError::Timeout(limit))?,
        None => polling.await,
    }
}

async fn poll_loop<T, F, Fut, P, R>(
    fetch: &mut F,
    is_terminal: &mut P,
    render: &mut R,
    interval: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&T) -> bool,
    R: FnMut(&T),
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let value = fetch().await?;
        render(&value);

        if is_terminal(&value) {
            debug!("Poll reached a terminal state after {} fetch(es)", attempt);
            return Ok(value);
        }

        debug!("Poll {} not terminal, sleeping {:?}", attempt, interval);
        time::sleep(interval).await;
    }
}
