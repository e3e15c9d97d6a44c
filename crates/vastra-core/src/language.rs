//! Language detection — best-effort guess of the message language.
//!
//! Detection sits on the hot path of every turn, so callers go through
//! [`detect_or_default`], which bounds latency and never fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, VastraError};

/// A language detector returning ISO 639-1 style codes ("en", "kn", ...).
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Detector name for logs.
    fn name(&self) -> &str;

    async fn detect(&self, text: &str) -> Result<String>;
}

/// Classifies text by the Unicode script of its letters.
///
/// Kannada wins whenever any Kannada letter is present, since mixed
/// messages are usually Kannada with English loanwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    fn classify(text: &str) -> Option<&'static str> {
        let mut devanagari = 0usize;
        let mut latin = 0usize;

        for c in text.chars() {
            match c {
                '\u{0C80}'..='\u{0CFF}' => return Some("kn"),
                '\u{0900}'..='\u{097F}' => devanagari += 1,
                c if c.is_ascii_alphabetic() => latin += 1,
                _ => {}
            }
        }

        if devanagari == 0 && latin == 0 {
            None
        } else if devanagari >= latin {
            Some("hi")
        } else {
            Some("en")
        }
    }
}

#[async_trait]
impl LanguageDetector for ScriptDetector {
    fn name(&self) -> &str {
        "script"
    }

    async fn detect(&self, text: &str) -> Result<String> {
        Self::classify(text)
            .map(str::to_string)
            .ok_or_else(|| VastraError::Detection("no letters to detect from".to_string()))
    }
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct DetectResponse {
    language: String,
}

/// Delegates detection to an HTTP service.
///
/// POSTs `{"text": ...}` and expects `{"language": "<code>"}` back.
pub struct HttpDetector {
    client: Client,
    endpoint: String,
}

impl HttpDetector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LanguageDetector for HttpDetector {
    fn name(&self) -> &str {
        "http"
    }

    async fn detect(&self, text: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&DetectRequest { text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VastraError::Detection(format!(
                "detector at {} returned {}",
                self.endpoint, status
            )));
        }

        let body: DetectResponse = resp.json().await?;
        let code = body.language.trim().to_lowercase();
        if code.is_empty() {
            return Err(VastraError::Detection("detector returned an empty code".to_string()));
        }
        Ok(code)
    }
}

/// Outcome of a bounded detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detected {
    pub language: String,
    /// True when the default was substituted.
    pub fell_back: bool,
}

/// Detect with a deadline, substituting `default` on error or timeout.
pub async fn detect_or_default(
    detector: &dyn LanguageDetector,
    text: &str,
    default: &str,
    deadline: Duration,
) -> Detected {
    let fallback = |reason: String| {
        warn!(detector = detector.name(), %reason, "language detection failed, using {default}");
        Detected {
            language: default.to_string(),
            fell_back: true,
        }
    };

    match tokio::time::timeout(deadline, detector.detect(text)).await {
        Ok(Ok(language)) => {
            debug!(detector = detector.name(), %language, "language detected");
            Detected {
                language,
                fell_back: false,
            }
        }
        Ok(Err(e)) => fallback(e.to_string()),
        Err(_) => fallback(format!("timed out after {}ms", deadline.as_millis())),
    }
}
