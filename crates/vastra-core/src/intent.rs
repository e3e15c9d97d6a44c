//! Intent classifier — an ordered, first-match-wins rule cascade.
//!
//! Priority lives in [`RULES`]: a static table of named rules walked top to
//! bottom by [`classify`]. Context-driven rules (tiers 1–5) come before the
//! message-only keyword rules (tier 6), then a bare continuation fallback
//! and finally `general`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VastraError;
use crate::lexicon::*;
use crate::links::KeywordGroup;
use crate::scope::{contains_any, contains_term, word_count};

const CONTINUE_SUFFIX: &str = "_continue";

/// A resolved conversation topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    MenOffice,
    MenWedding,
    MenParty,
    MenCasual,
    ColorStylingOffice,
    FormalOffice,
    CasualOffice,
    WeddingMakeup,
    Wedding,
    PartyMakeup,
    Party,
    SareeColorChange,
    KanchipuramSaree,
    Makeup,
    CompleteOfficeLook,
    CompleteWeddingLook,
    CompleteLook,
    Festival,
    Vacation,
    CasualWear,
    Saree,
    OutfitGeneral,
    General,
}

impl Topic {
    pub const ALL: [Topic; 23] = [
        Self::MenOffice,
        Self::MenWedding,
        Self::MenParty,
        Self::MenCasual,
        Self::ColorStylingOffice,
        Self::FormalOffice,
        Self::CasualOffice,
        Self::WeddingMakeup,
        Self::Wedding,
        Self::PartyMakeup,
        Self::Party,
        Self::SareeColorChange,
        Self::KanchipuramSaree,
        Self::Makeup,
        Self::CompleteOfficeLook,
        Self::CompleteWeddingLook,
        Self::CompleteLook,
        Self::Festival,
        Self::Vacation,
        Self::CasualWear,
        Self::Saree,
        Self::OutfitGeneral,
        Self::General,
    ];

    /// Stable snake_case label, also used as the template key.
    pub fn label(self) -> &'static str {
        match self {
            Self::MenOffice => "men_office",
            Self::MenWedding => "men_wedding",
            Self::MenParty => "men_party",
            Self::MenCasual => "men_casual",
            Self::ColorStylingOffice => "color_styling_office",
            Self::FormalOffice => "formal_office",
            Self::CasualOffice => "casual_office",
            Self::WeddingMakeup => "wedding_makeup",
            Self::Wedding => "wedding",
            Self::PartyMakeup => "party_makeup",
            Self::Party => "party",
            Self::SareeColorChange => "saree_color_change",
            Self::KanchipuramSaree => "kanchipuram_saree",
            Self::Makeup => "makeup",
            Self::CompleteOfficeLook => "complete_office_look",
            Self::CompleteWeddingLook => "complete_wedding_look",
            Self::CompleteLook => "complete_look",
            Self::Festival => "festival",
            Self::Vacation => "vacation",
            Self::CasualWear => "casual_wear",
            Self::Saree => "saree",
            Self::OutfitGeneral => "outfit_general",
            Self::General => "general",
        }
    }

    /// Office-class topics that men's and color follow-ups build on.
    pub fn is_office(self) -> bool {
        matches!(self, Self::FormalOffice | Self::CasualOffice | Self::OutfitGeneral)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Topic {
    type Err = VastraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .copied()
            .find(|t| t.label() == s)
            .ok_or_else(|| VastraError::Other(format!("unknown intent: {s}")))
    }
}

/// Classifier output: a topic, or a continuation of an earlier topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Intent {
    Topic(Topic),
    Continue(Topic),
}

impl Intent {
    /// The underlying topic, continuation or not.
    pub fn topic(self) -> Topic {
        match self {
            Self::Topic(t) | Self::Continue(t) => t,
        }
    }

    pub fn is_continuation(self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// Carry this intent forward one turn. Continuing a continuation keeps
    /// the same base topic.
    pub fn continued(self) -> Intent {
        Self::Continue(self.topic())
    }

    /// Whether this is exactly `topic` (continuations do not count).
    pub fn is(self, topic: Topic) -> bool {
        self == Self::Topic(topic)
    }

    /// The intent stored for the next turn. A saree color change settles
    /// back into the Kanchipuram topic so further colors keep working.
    pub fn settled(self) -> Intent {
        match self {
            Self::Topic(Topic::SareeColorChange) => Self::Topic(Topic::KanchipuramSaree),
            other => other,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Topic(t) => t.label().to_string(),
            Self::Continue(t) => format!("{}{CONTINUE_SUFFIX}", t.label()),
        }
    }
}

impl From<Topic> for Intent {
    fn from(topic: Topic) -> Self {
        Self::Topic(topic)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic(t) => write!(f, "{t}"),
            Self::Continue(t) => write!(f, "{t}{CONTINUE_SUFFIX}"),
        }
    }
}

impl FromStr for Intent {
    type Err = VastraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix(CONTINUE_SUFFIX) {
            Some(base) => Ok(Self::Continue(base.parse()?)),
            None => Ok(Self::Topic(s.parse()?)),
        }
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.label()
    }
}

impl TryFrom<String> for Intent {
    type Error = VastraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ─── Signals ─────────────────────────────────────────────

/// Everything a rule may look at for one turn.
#[derive(Debug)]
pub struct Signals<'a> {
    /// Lower-cased message.
    pub text: String,
    /// Intent stored by the previous classified turn.
    pub last_intent: Option<Intent>,
    /// Keywords accumulated in the session before this turn.
    pub prev_keywords: &'a [String],
    /// Groups linking this turn's keywords to the recent ones.
    pub links: &'a BTreeSet<KeywordGroup>,
}

/// How many trailing keywords the continuation overlap test inspects.
const CONTINUATION_KEYWORD_WINDOW: usize = 5;

impl<'a> Signals<'a> {
    pub fn new(
        message: &str,
        last_intent: Option<Intent>,
        prev_keywords: &'a [String],
        links: &'a BTreeSet<KeywordGroup>,
    ) -> Self {
        Self {
            text: message.to_lowercase(),
            last_intent,
            prev_keywords,
            links,
        }
    }

    fn has(&self, terms: &[&str]) -> bool {
        contains_any(&self.text, terms)
    }

    fn words(&self) -> usize {
        word_count(&self.text)
    }

    /// Message is exactly one of `phrases` once trimmed.
    fn is_exactly(&self, phrases: &[&str]) -> bool {
        phrases.contains(&self.text.trim())
    }

    fn last_is_any(&self, topics: &[Topic]) -> bool {
        self.last_intent
            .is_some_and(|last| topics.iter().any(|t| last.is(*t)))
    }

    fn last_label_contains(&self, needle: &str) -> bool {
        self.last_intent
            .is_some_and(|last| contains_term(&last.label(), needle))
    }

    fn linked(&self, group: KeywordGroup) -> bool {
        self.links.contains(&group)
    }

    fn office_context(&self) -> bool {
        self.last_intent.is_some_and(|last| match last {
            Intent::Topic(t) => t.is_office(),
            Intent::Continue(_) => false,
        }) || self.linked(KeywordGroup::Office)
    }

    fn wedding_context(&self) -> bool {
        self.last_is_any(&[Topic::Wedding, Topic::WeddingMakeup]) || self.linked(KeywordGroup::Wedding)
    }

    fn party_context(&self) -> bool {
        self.last_is_any(&[Topic::Party, Topic::PartyMakeup]) || self.linked(KeywordGroup::Party)
    }

    fn saree_context(&self) -> bool {
        self.last_is_any(&[Topic::Saree, Topic::KanchipuramSaree]) || self.linked(KeywordGroup::Saree)
    }

    fn recent_keywords(&self) -> &[String] {
        let start = self.prev_keywords.len().saturating_sub(CONTINUATION_KEYWORD_WINDOW);
        &self.prev_keywords[start..]
    }

    /// Short follow-up carrying a continuation word after a classified turn.
    fn continuation_gate(&self) -> bool {
        self.last_intent.is_some() && self.words() <= 10 && self.has(CONTINUATION_TERMS)
    }
}

// ─── Rule table ──────────────────────────────────────────

/// A named rule in the cascade.
pub struct Rule {
    pub name: &'static str,
    pub tier: u8,
    pub apply: fn(&Signals<'_>) -> Option<Intent>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .finish()
    }
}

/// The outcome of running the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub intent: Intent,
    /// Name of the rule that fired.
    pub rule: &'static str,
    pub tier: u8,
}

fn when(cond: bool, topic: Topic) -> Option<Intent> {
    cond.then_some(Intent::Topic(topic))
}

/// The cascade, highest priority first.
pub static RULES: &[Rule] = &[
    // Tier 1: men's follow-up to an occasion
    Rule {
        name: "men_after_office",
        tier: 1,
        apply: |s| when(s.has(MALE_TERMS) && s.office_context(), Topic::MenOffice),
    },
    Rule {
        name: "men_after_wedding",
        tier: 1,
        apply: |s| {
            let ctx = s.last_is_any(&[Topic::Wedding]) || s.linked(KeywordGroup::Wedding);
            when(s.has(MALE_TERMS) && ctx, Topic::MenWedding)
        },
    },
    Rule {
        name: "men_after_party",
        tier: 1,
        apply: |s| {
            let ctx = s.last_is_any(&[Topic::Party]) || s.linked(KeywordGroup::Party);
            when(s.has(MALE_TERMS) && ctx, Topic::MenParty)
        },
    },
    Rule {
        name: "men_after_casual",
        tier: 1,
        apply: |s| when(s.has(MALE_TERMS) && s.last_is_any(&[Topic::CasualWear]), Topic::MenCasual),
    },
    // Tier 2: color question about office wear
    Rule {
        name: "office_color",
        tier: 2,
        apply: |s| {
            when(
                s.office_context() && s.has(OFFICE_COLOR_TERMS) && s.words() <= 15,
                Topic::ColorStylingOffice,
            )
        },
    },
    // Tier 3: bare dress-code word under office context
    Rule {
        name: "office_dress_code",
        tier: 3,
        apply: |s| {
            if !(s.office_context() && s.is_exactly(BARE_STYLE_WORDS)) {
                return None;
            }
            if s.has(FORMAL_TERMS) {
                Some(Topic::FormalOffice.into())
            } else {
                Some(Topic::CasualOffice.into())
            }
        },
    },
    // Tier 4: bare topic word under an occasion or saree context
    Rule {
        name: "wedding_bare_word",
        tier: 4,
        apply: |s| {
            if !s.wedding_context() {
                None
            } else if s.is_exactly(BARE_MAKEUP_WORDS) {
                Some(Topic::WeddingMakeup.into())
            } else if s.is_exactly(BARE_OUTFIT_WORDS) {
                Some(Topic::Wedding.into())
            } else {
                None
            }
        },
    },
    Rule {
        name: "party_bare_word",
        tier: 4,
        apply: |s| {
            if !s.party_context() {
                None
            } else if s.is_exactly(BARE_MAKEUP_WORDS) {
                Some(Topic::PartyMakeup.into())
            } else if s.is_exactly(BARE_PARTY_OUTFIT_WORDS) {
                Some(Topic::Party.into())
            } else {
                None
            }
        },
    },
    Rule {
        name: "saree_color",
        tier: 4,
        apply: |s| {
            when(
                s.saree_context() && s.has(SAREE_COLOR_TERMS) && s.words() <= 3,
                Topic::SareeColorChange,
            )
        },
    },
    // Tier 5: generic continuation of the previous topic
    Rule {
        name: "continue_recent_keyword",
        tier: 5,
        apply: |s| {
            if !s.continuation_gate() {
                return None;
            }
            let overlap = s.recent_keywords().iter().any(|kw| contains_term(&s.text, kw));
            overlap.then(|| s.last_intent.map(Intent::continued)).flatten()
        },
    },
    Rule {
        name: "continue_wedding",
        tier: 5,
        apply: |s| {
            let wedding_thread = s.last_label_contains("wedding")
                || contains_term(&s.recent_keywords().join(" "), KANNADA_WEDDING);
            when(
                s.continuation_gate() && wedding_thread && s.has(WEDDING_TERMS),
                Topic::Wedding,
            )
        },
    },
    Rule {
        name: "continue_office",
        tier: 5,
        apply: |s| {
            if s.continuation_gate() && s.last_label_contains("office") && s.has(OFFICE_TERMS) {
                s.last_intent
            } else {
                None
            }
        },
    },
    // Tier 6: explicit vocabulary in the message
    Rule {
        name: "formal_outfit",
        tier: 6,
        apply: |s| when(s.has(FORMAL_TERMS) && s.has(FORMAL_OUTFIT_TERMS), Topic::FormalOffice),
    },
    Rule {
        name: "makeup",
        tier: 6,
        apply: |s| {
            if !s.has(MAKEUP_TERMS) {
                None
            } else if s.has(WEDDING_MAKEUP_OCCASION_TERMS) {
                Some(Topic::WeddingMakeup.into())
            } else if s.has(EVENING_TERMS) {
                Some(Topic::PartyMakeup.into())
            } else {
                Some(Topic::Makeup.into())
            }
        },
    },
    Rule {
        name: "kanchipuram",
        tier: 6,
        apply: |s| when(s.has(KANCHIPURAM_TERMS), Topic::KanchipuramSaree),
    },
    Rule {
        name: "complete_look",
        tier: 6,
        apply: |s| {
            if !(s.has(COMPLETENESS_TERMS) && s.has(LOOK_TERMS)) {
                None
            } else if s.has(COMPLETE_OFFICE_TERMS) {
                Some(Topic::CompleteOfficeLook.into())
            } else if s.has(WEDDING_TERMS) {
                Some(Topic::CompleteWeddingLook.into())
            } else {
                Some(Topic::CompleteLook.into())
            }
        },
    },
    Rule {
        name: "office",
        tier: 6,
        apply: |s| {
            if !s.has(OFFICE_TERMS) {
                None
            } else if s.has(SMART_CASUAL_TERMS) {
                Some(Topic::CasualOffice.into())
            } else {
                Some(Topic::FormalOffice.into())
            }
        },
    },
    Rule {
        name: "wedding",
        tier: 6,
        apply: |s| when(s.has(WEDDING_TERMS), Topic::Wedding),
    },
    Rule {
        name: "party",
        tier: 6,
        apply: |s| when(s.has(PARTY_TERMS), Topic::Party),
    },
    Rule {
        name: "festival",
        tier: 6,
        apply: |s| when(s.has(FESTIVAL_TERMS), Topic::Festival),
    },
    Rule {
        name: "vacation",
        tier: 6,
        apply: |s| when(s.has(VACATION_TERMS), Topic::Vacation),
    },
    Rule {
        name: "casual_wear",
        tier: 6,
        apply: |s| when(s.has(&["casual"]) && s.has(&["wear"]), Topic::CasualWear),
    },
    Rule {
        name: "saree",
        tier: 6,
        apply: |s| when(s.has(SAREE_TERMS), Topic::Saree),
    },
    Rule {
        name: "outfit",
        tier: 6,
        apply: |s| when(s.has(OUTFIT_TERMS), Topic::OutfitGeneral),
    },
    // Tier 7: bare continuation
    Rule {
        name: "continue_fallback",
        tier: 7,
        apply: |s| {
            if s.has(FALLBACK_CONTINUATION_TERMS) {
                s.last_intent.map(Intent::continued)
            } else {
                None
            }
        },
    },
    // Tier 8
    Rule {
        name: "general",
        tier: 8,
        apply: |_| Some(Topic::General.into()),
    },
];

/// Run the cascade and report the first rule that fires.
pub fn classify(signals: &Signals<'_>) -> Decision {
    RULES
        .iter()
        .find_map(|rule| {
            (rule.apply)(signals).map(|intent| Decision {
                intent,
                rule: rule.name,
                tier: rule.tier,
            })
        })
        .unwrap_or(Decision {
            intent: Topic::General.into(),
            rule: "general",
            tier: 8,
        })
}
