use std::{thread, time::Duration};

use rand::Rng;
use serde_json::Value;

use crate::error::Error;

const TIMEOUT: Duration = Duration::from_secs(20);
const MAX_ATTEMPTS: u32 = 5;
const BACKOFF_INITIAL_SECS: u64 = 1;
const BACKOFF_CAP_SECS: u64 = 12;
const USER_AGENT: &str = "Mozilla/5.0 (reviews-collector/1.0)";

/// Synchronous HTTP client with bounded retry.
///
/// Wraps one [`ureq::Agent`] so sequential requests reuse connections. Not
/// meant to be shared across concurrent callers; the whole pipeline is
/// single-threaded.
pub struct Client {
    agent: ureq::Agent,
    max_attempts: u32,
}

impl Client {
    pub fn new() -> Self {
        Self::with_attempts(MAX_ATTEMPTS)
    }

    pub(crate) fn with_attempts(max_attempts: u32) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            max_attempts,
        }
    }

    /// One GET returning parsed JSON.
    ///
    /// Transport failures (connect errors, timeouts, non-2xx statuses) are
    /// retried with exponential backoff and jitter until the attempt budget
    /// runs out, then surface as [`Error::Fetch`]. A 2xx body that does not
    /// parse as JSON is [`Error::Malformed`] and is not retried.
    pub fn get_json(&self, url: &str) -> Result<Value, Error> {
        let mut attempt = 1;
        let body = loop {
            match self.try_get(url) {
                Ok(body) => break body,
                Err(source) if attempt >= self.max_attempts => {
                    return Err(Error::Fetch {
                        url: url.to_string(),
                        attempts: attempt,
                        source,
                    });
                }
                Err(_) => {
                    thread::sleep(backoff_delay(attempt));
                    attempt += 1;
                }
            }
        };
        serde_json::from_str(&body).map_err(|source| Error::Malformed {
            url: url.to_string(),
            source,
        })
    }

    fn try_get(&self, url: &str) -> Result<String, ureq::Error> {
        self.agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()?
            .body_mut()
            .read_to_string()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential backoff capped per attempt, plus up to a second of random
/// jitter so synchronized clients spread out.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(62);
    let secs = BACKOFF_INITIAL_SECS
        .saturating_mul(2u64.saturating_pow(exp))
        .min(BACKOFF_CAP_SECS);
    let jitter = rand::rng().random_range(0..1000);
    Duration::from_secs(secs) + Duration::from_millis(jitter)
}
