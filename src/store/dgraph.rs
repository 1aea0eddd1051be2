//! Dgraph HTTP client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{GraphStore, RetryPolicy};
use crate::config::StoreConfig;
use crate::error::{AnalyzerError, Result};

/// Longest stretch a backoff sleeps before rechecking the cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(25);

/// Blocking client for a Dgraph alpha's read-only query endpoint.
#[derive(Debug, Clone)]
pub struct DgraphClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    retry: RetryPolicy,
    cancel: Option<Arc<AtomicBool>>,
}

#[derive(Debug, Deserialize)]
struct DgraphResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<DgraphErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct DgraphErrorMessage {
    message: String,
}

impl DgraphClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("grapl-analyzer/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            retry: config.retry_policy(),
            cancel: None,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Abort pending and future requests once `flag` is set.
    ///
    /// The flag is checked before every attempt, including retries.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Sleep for `delay`, returning early with `Cancelled` once the flag is set.
    fn backoff(&self, delay: Duration) -> Result<()> {
        let deadline = Instant::now() + delay;
        loop {
            if self.is_cancelled() {
                return Err(AnalyzerError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep((deadline - now).min(CANCEL_POLL));
        }
    }

    fn send_once(&self, query: &str) -> Result<Value> {
        let url = format!("{}/query?ro=true", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/dql")
            .body(query.to_string())
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(AnalyzerError::Backend {
                status: Some(status.as_u16()),
                message: error_message(&body),
            });
        }
        parse_response(&body)
    }
}

impl GraphStore for DgraphClient {
    fn query(&self, query: &str) -> Result<Value> {
        let mut attempt = 0;
        loop {
            if self.is_cancelled() {
                return Err(AnalyzerError::Cancelled);
            }
            debug!(endpoint = %self.endpoint, attempt, bytes = query.len(), "sending query");

            match self.send_once(query) {
                Ok(data) => return Ok(data),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "transient graph store error, retrying"
                    );
                    self.backoff(delay)?;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Extract `data` from a query response body, surfacing reported errors.
fn parse_response(body: &str) -> Result<Value> {
    let response: DgraphResponse = serde_json::from_str(body)?;
    if !response.errors.is_empty() {
        return Err(AnalyzerError::Backend {
            status: None,
            message: join_errors(&response.errors),
        });
    }
    response
        .data
        .ok_or_else(|| AnalyzerError::MalformedResponse("response has no `data` object".into()))
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<DgraphResponse>(body) {
        Ok(response) if !response.errors.is_empty() => join_errors(&response.errors),
        _ => body.trim().chars().take(512).collect(),
    }
}

fn join_errors(errors: &[DgraphErrorMessage]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_returns_data() {
        let data = parse_response(r#"{"data": {"res": []}, "extensions": {}}"#).unwrap();
        assert_eq!(data, json!({"res": []}));
    }

    #[test]
    fn test_parse_response_surfaces_errors() {
        let err = parse_response(
            r#"{"errors": [{"message": "line 1: bad"}, {"message": "again"}], "data": null}"#,
        )
        .unwrap_err();
        match err {
            AnalyzerError::Backend { status, message } => {
                assert_eq!(status, None);
                assert_eq!(message, "line 1: bad; again");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_without_data() {
        let err = parse_response("{}").unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedResponse(_)));

        let err = parse_response("not json").unwrap_err();
        assert!(matches!(err, AnalyzerError::Json(_)));
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("  upstream down \n"), "upstream down");
        assert_eq!(error_message(r#"{"errors":[{"message":"oops"}]}"#), "oops");
    }

    #[test]
    fn test_cancelled_before_sending() {
        let flag = Arc::new(AtomicBool::new(true));
        let client = DgraphClient::new(&StoreConfig::default())
            .unwrap()
            .with_cancel_flag(Arc::clone(&flag));

        let err = client.query("{ q(func: has(node_key)) { uid } }").unwrap_err();
        assert!(matches!(err, AnalyzerError::Cancelled));
    }

    #[test]
    fn test_cancel_interrupts_backoff() {
        let flag = Arc::new(AtomicBool::new(false));
        let client = DgraphClient::new(&StoreConfig::default())
            .unwrap()
            .with_cancel_flag(Arc::clone(&flag));

        let setter = {
            let flag = Arc::clone(&flag);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                flag.store(true, Ordering::Relaxed);
            })
        };

        let started = Instant::now();
        let err = client.backoff(Duration::from_secs(30)).unwrap_err();
        setter.join().unwrap();

        assert!(matches!(err, AnalyzerError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    }

    #[test]
    fn test_backoff_without_cancel_waits_out_delay() {
        let client = DgraphClient::new(&StoreConfig::default()).unwrap();
        let started = Instant::now();
        client.backoff(Duration::from_millis(60)).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let config = StoreConfig {
            endpoint: "http://alpha:8080/".to_string(),
            ..StoreConfig::default()
        };
        let client = DgraphClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://alpha:8080");
    }

    #[test]
    fn test_unreachable_store_is_http_error() {
        let config = StoreConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            timeout_ms: 500,
            ..StoreConfig::default()
        };
        let client = DgraphClient::new(&config)
            .unwrap()
            .with_retry_policy(RetryPolicy::none());

        // An HTTP proxy in the environment may answer with a 5xx instead.
        let err = client.query("{}").unwrap_err();
        assert!(
            matches!(err, AnalyzerError::Http(_) | AnalyzerError::Backend { .. }),
            "got {err:?}"
        );
    }
}
