//! # Vastra Core
//!
//! Intent resolution and contextual continuation for a rule-based, bilingual
//! fashion & beauty responder. Everything with decision logic lives here:
//! the lexicon, keyword extraction, keyword links, the scope check, the intent
//! cascade, and the bounded per-session context store. The hub and the CLI
//! only wrap this crate.

pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod keywords;
pub mod language;
pub mod lexicon;
pub mod links;
pub mod scope;
pub mod session;
pub mod templates;

pub use config::VastraConfig;
pub use engine::{Engine, Reply, ReplyCategory};
pub use error::{Result, VastraError};
pub use intent::{Intent, Topic};
pub use session::SessionStore;
