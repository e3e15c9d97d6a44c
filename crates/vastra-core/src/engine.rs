//! Conversation engine — one turn from raw message to reply.
//!
//! Flow per turn:
//!   1. empty message → fixed prompt, no session touched
//!   2. detect language (bounded, falls back to the default)
//!   3. refresh the caller's session, then enforce session capacity
//!   4. under the session lock: append history, boundary checks,
//!      extract keywords, resolve links, classify, store context
//!   5. render the template for the outcome

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{DetectorKind, VastraConfig};
use crate::error::{Result, VastraError};
use crate::intent::{Intent, Signals, Topic, classify};
use crate::keywords::extract_keywords;
use crate::language::{HttpDetector, LanguageDetector, ScriptDetector, detect_or_default};
use crate::lexicon::{KANNADA_RED, SAREE_COLOR_TERMS, SAREE_SWATCHES};
use crate::links::{KeywordGroup, find_keyword_links};
use crate::scope::{contains_term, is_gratitude, is_greeting, is_out_of_scope};
use crate::session::{ConversationContext, Session, SessionStore};
use crate::templates::{GENERAL_KEY, TemplateCatalog, TomlCatalog, fill};

const EMPTY_MESSAGE_KEY: &str = "empty_message";

/// How a turn was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyCategory {
    EmptyMessage,
    Greeting,
    Gratitude,
    OutOfScope,
    Classified,
}

impl ReplyCategory {
    pub const ALL: [ReplyCategory; 5] = [
        Self::EmptyMessage,
        Self::Greeting,
        Self::Gratitude,
        Self::OutOfScope,
        Self::Classified,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::EmptyMessage => "empty_message",
            Self::Greeting => "greeting",
            Self::Gratitude => "gratitude",
            Self::OutOfScope => "out_of_scope",
            Self::Classified => "classified",
        }
    }
}

/// Why the classifier chose what it chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub intent: Intent,
    pub rule: &'static str,
    pub tier: u8,
    pub keywords: Vec<String>,
    pub links: BTreeSet<KeywordGroup>,
}

/// A rendered reply.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub response: String,
    pub category: ReplyCategory,
    /// Set for classified turns only.
    pub intent: Option<Intent>,
    pub language: String,
    /// Present (and empty) on classified turns.
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,
}

struct TurnOutcome {
    category: ReplyCategory,
    previous: Option<Intent>,
    trace: Option<Trace>,
}

/// The responder: session store, language detector and template catalog.
pub struct Engine {
    config: VastraConfig,
    store: Arc<SessionStore>,
    detector: Arc<dyn LanguageDetector>,
    catalog: Arc<dyn TemplateCatalog>,
    detector_fallbacks: AtomicU64,
}

impl Engine {
    pub fn new(
        config: VastraConfig,
        detector: Arc<dyn LanguageDetector>,
        catalog: Arc<dyn TemplateCatalog>,
    ) -> Self {
        let store = Arc::new(SessionStore::new(config.memory.session_limits()));
        Self {
            config,
            store,
            detector,
            catalog,
            detector_fallbacks: AtomicU64::new(0),
        }
    }

    /// Build the detector and catalog named by `config`.
    pub fn from_config(config: VastraConfig) -> Result<Self> {
        config.validate()?;

        let detector: Arc<dyn LanguageDetector> = match config.language.detector {
            DetectorKind::Script => Arc::new(ScriptDetector),
            DetectorKind::Http => {
                let endpoint = config.language.endpoint.clone().ok_or_else(|| {
                    VastraError::Config("language.endpoint is not set".to_string())
                })?;
                Arc::new(HttpDetector::new(endpoint))
            }
        };

        let catalog = match &config.templates.path {
            Some(path) => TomlCatalog::with_overrides(path)?,
            None => TomlCatalog::builtin()?,
        };

        info!(
            detector = detector.name(),
            templates = catalog.keys().len(),
            "engine ready"
        );
        Ok(Self::new(config, detector, Arc::new(catalog)))
    }

    pub fn config(&self) -> &VastraConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Turns whose language fell back to the default.
    pub fn detector_fallbacks(&self) -> u64 {
        self.detector_fallbacks.load(Ordering::Relaxed)
    }

    /// Answer one message for `session_id` (the default session if absent).
    pub async fn respond(&self, session_id: Option<&str>, message: &str) -> Reply {
        let message = message.trim();
        let default_lang = self.config.language.default.clone();

        if message.is_empty() {
            return Reply {
                response: self.render(EMPTY_MESSAGE_KEY, &default_lang, &[]),
                category: ReplyCategory::EmptyMessage,
                intent: None,
                language: default_lang,
                images: None,
                trace: None,
            };
        }

        let key = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.config.default_session.as_str());

        let detected = detect_or_default(
            self.detector.as_ref(),
            message,
            &default_lang,
            self.config.language.timeout(),
        )
        .await;
        if detected.fell_back {
            self.detector_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        let lang = detected.language;

        // The caller's own session must look active before any purge runs.
        let now = Utc::now();
        self.store.touch(key, now);
        self.store
            .enforce_capacity(now, self.config.memory.capacity_policy());

        let outcome = self
            .store
            .with_session(key, now, |session| self.run_turn(session, message));

        let response = match &outcome.trace {
            None => self.render(outcome.category.label(), &lang, &[]),
            Some(trace) => {
                let (template, vars) = response_key(trace.intent, message, outcome.previous);
                let vars: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
                self.render(&template, &lang, &vars)
            }
        };

        debug!(
            session = key,
            language = %lang,
            category = outcome.category.label(),
            intent = ?outcome.trace.as_ref().map(|t| t.intent.label()),
            "turn answered"
        );

        let intent = outcome.trace.as_ref().map(|t| t.intent);
        Reply {
            response,
            category: outcome.category,
            intent,
            language: lang,
            images: intent.map(|_| Vec::new()),
            trace: outcome.trace,
        }
    }

    /// Classify `message` against `context` without touching any session.
    pub fn classify_only(&self, context: &ConversationContext, message: &str) -> Trace {
        let keywords = extract_keywords(message);
        let links = find_keyword_links(&keywords, &context.keywords, self.config.memory.link_window);
        let decision = classify(&Signals::new(
            message,
            context.last_intent,
            &context.keywords,
            &links,
        ));
        Trace {
            intent: decision.intent,
            rule: decision.rule,
            tier: decision.tier,
            keywords,
            links,
        }
    }

    fn run_turn(&self, session: &mut Session, message: &str) -> TurnOutcome {
        let memory = &self.config.memory;
        session.push_history(message, memory.max_history);

        let previous = session.context.last_intent;
        let boundary = |category| TurnOutcome {
            category,
            previous,
            trace: None,
        };

        if is_greeting(message) {
            return boundary(ReplyCategory::Greeting);
        }
        if is_gratitude(message) {
            return boundary(ReplyCategory::Gratitude);
        }
        if is_out_of_scope(message, &session.history, memory.context_window) {
            return boundary(ReplyCategory::OutOfScope);
        }

        let trace = self.classify_only(&session.context, message);
        debug!(rule = trace.rule, tier = trace.tier, intent = %trace.intent, links = ?trace.links, "classified");

        session.record_context(
            message,
            trace.intent.settled(),
            &trace.keywords,
            trace.links.clone(),
            memory.max_keywords,
        );

        TurnOutcome {
            category: ReplyCategory::Classified,
            previous,
            trace: Some(trace),
        }
    }

    fn render(&self, key: &str, lang: &str, vars: &[(&str, &str)]) -> String {
        let body = self
            .catalog
            .lookup(key, lang)
            .or_else(|| self.catalog.lookup(GENERAL_KEY, lang))
            .unwrap_or_default();
        fill(body, vars)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn mentions_red(text: &str) -> bool {
    contains_term(text, "red") || contains_term(text, KANNADA_RED)
}

/// Pick the template key (and placeholder values) for a classified turn.
fn response_key(
    intent: Intent,
    message: &str,
    previous: Option<Intent>,
) -> (String, Vec<(&'static str, String)>) {
    let text = message.to_lowercase();
    let topic = match intent {
        Intent::Continue(t) => return (t.label().to_string(), Vec::new()),
        Intent::Topic(t) => t,
    };

    let key = match topic {
        Topic::ColorStylingOffice if contains_term(&text, "red") => "color_styling_office.red_black",
        Topic::KanchipuramSaree if mentions_red(&text) => "kanchipuram_saree.red",
        Topic::SareeColorChange => {
            let swatch = SAREE_SWATCHES.iter().find(|c| contains_term(&text, c));
            let color = match swatch {
                Some(c) => Some(*c),
                None if mentions_red(&text) => return ("kanchipuram_saree.red".to_string(), Vec::new()),
                None => SAREE_COLOR_TERMS.iter().find(|c| contains_term(&text, c)).copied(),
            };
            return match color {
                Some(color) => (
                    topic.label().to_string(),
                    vec![("color", color.to_string()), ("color_title", title_case(color))],
                ),
                None => (Topic::KanchipuramSaree.label().to_string(), Vec::new()),
            };
        }
        Topic::CompleteLook if previous.is_some_and(|p| p.label().contains("office")) => {
            "complete_office_look"
        }
        other => other.label(),
    };
    (key.to_string(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::from_config(VastraConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_message_skips_session() {
        let e = engine();
        let reply = e.respond(Some("s"), "   ").await;
        assert_eq!(reply.category, ReplyCategory::EmptyMessage);
        assert_eq!(reply.response, "Please ask me something about fashion or beauty!");
        assert!(reply.images.is_none());
        assert!(e.store().is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_uses_default() {
        let e = engine();
        e.respond(None, "wedding outfit").await;
        e.respond(Some("  "), "party outfit").await;
        assert_eq!(e.store().keys(), vec!["default".to_string()]);
        assert_eq!(e.store().snapshot("default").unwrap().history.len(), 2);
    }

    #[tokio::test]
    async fn test_greeting_leaves_context() {
        let e = engine();
        let reply = e.respond(Some("s"), "hi").await;
        assert_eq!(reply.category, ReplyCategory::Greeting);
        assert!(reply.response.starts_with("Hello!"));
        assert!(reply.intent.is_none());
        let session = e.store().snapshot("s").unwrap();
        assert_eq!(session.history, vec!["hi"]);
        assert!(session.context.last_intent.is_none());
    }

    #[tokio::test]
    async fn test_kannada_reply() {
        let e = engine();
        let reply = e.respond(Some("s"), "ಮದುವೆ ವಸ್ತ್ರ").await;
        assert_eq!(reply.language, "kn");
        assert_eq!(reply.intent, Some(Topic::Wedding.into()));
        assert_eq!(reply.response, e.catalog.body("wedding", "kn").unwrap());
    }

    #[tokio::test]
    async fn test_detector_fallback_counted() {
        let e = engine();
        // digits and fashion history: in scope, but no letters to detect
        e.respond(Some("s"), "saree").await;
        let reply = e.respond(Some("s"), "2").await;
        assert_eq!(reply.language, "en");
        assert_eq!(e.detector_fallbacks(), 1);
    }

    #[tokio::test]
    async fn test_saree_color_reply_and_settle() {
        let e = engine();
        e.respond(Some("s"), "kanchipuram saree").await;
        let reply = e.respond(Some("s"), "green").await;
        assert_eq!(reply.intent, Some(Topic::SareeColorChange.into()));
        assert!(reply.response.starts_with("**Green Kanchipuram Saree"));
        let ctx = e.store().snapshot("s").unwrap().context;
        assert_eq!(ctx.last_intent, Some(Topic::KanchipuramSaree.into()));

        let reply = e.respond(Some("s"), "blue").await;
        assert!(reply.response.starts_with("**Blue Kanchipuram Saree"));

        let reply = e.respond(Some("s"), "red").await;
        assert_eq!(reply.response, e.catalog.body("kanchipuram_saree.red", "en").unwrap());
    }

    #[tokio::test]
    async fn test_office_red_black_variant() {
        let e = engine();
        e.respond(Some("s"), "office wear ideas").await;
        let reply = e.respond(Some("s"), "red and black").await;
        assert_eq!(reply.intent, Some(Topic::ColorStylingOffice.into()));
        assert_eq!(
            reply.response,
            e.catalog.body("color_styling_office.red_black", "en").unwrap()
        );

        // other colors borrow the office body
        e.respond(Some("t"), "office wear ideas").await;
        let reply = e.respond(Some("t"), "navy").await;
        assert_eq!(reply.intent, Some(Topic::ColorStylingOffice.into()));
        assert_eq!(reply.response, e.catalog.body("formal_office", "en").unwrap());
    }

    #[tokio::test]
    async fn test_continuation_renders_base_topic() {
        let e = engine();
        e.respond(Some("s"), "festival outfit").await;
        let reply = e.respond(Some("s"), "show me").await;
        assert_eq!(reply.intent, Some(Intent::Continue(Topic::Festival)));
        assert_eq!(reply.response, e.catalog.body("festival", "en").unwrap());
        assert_eq!(reply.images, Some(Vec::new()));
    }

    #[test]
    fn test_response_key_complete_look_after_office() {
        let (key, _) = response_key(
            Topic::CompleteLook.into(),
            "complete look",
            Some(Topic::CasualOffice.into()),
        );
        assert_eq!(key, "complete_office_look");
        let (key, _) = response_key(Topic::CompleteLook.into(), "complete look", None);
        assert_eq!(key, "complete_look");
    }

    #[test]
    fn test_classify_only_is_pure() {
        let e = engine();
        let ctx = ConversationContext {
            last_intent: Some(Topic::FormalOffice.into()),
            ..Default::default()
        };
        let a = e.classify_only(&ctx, "red");
        let b = e.classify_only(&ctx, "red");
        assert_eq!(a, b);
        assert_eq!(a.intent, Topic::ColorStylingOffice.into());
        assert_eq!(a.keywords, vec!["red"]);
        assert!(e.store().is_empty());
    }
}
