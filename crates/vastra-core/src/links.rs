//! Resolves which topic groups the current message shares with the
//! recent keyword history.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scope::contains_any;

/// How many trailing history keywords take part in link resolution.
pub const DEFAULT_LINK_WINDOW: usize = 15;

/// A named group of related terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordGroup {
    Office,
    Wedding,
    Party,
    Saree,
    Lehenga,
    Kurta,
    Makeup,
    Hair,
    Jewelry,
    Outfit,
    Shoes,
    Accessories,
    Color,
    Style,
}

impl KeywordGroup {
    /// Groups in matching priority order.
    pub const ALL: [KeywordGroup; 14] = [
        Self::Office,
        Self::Wedding,
        Self::Party,
        Self::Saree,
        Self::Lehenga,
        Self::Kurta,
        Self::Makeup,
        Self::Hair,
        Self::Jewelry,
        Self::Outfit,
        Self::Shoes,
        Self::Accessories,
        Self::Color,
        Self::Style,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Wedding => "wedding",
            Self::Party => "party",
            Self::Saree => "saree",
            Self::Lehenga => "lehenga",
            Self::Kurta => "kurta",
            Self::Makeup => "makeup",
            Self::Hair => "hair",
            Self::Jewelry => "jewelry",
            Self::Outfit => "outfit",
            Self::Shoes => "shoes",
            Self::Accessories => "accessories",
            Self::Color => "color",
            Self::Style => "style",
        }
    }

    /// Representative terms of the group.
    pub fn terms(self) -> &'static [&'static str] {
        match self {
            Self::Office => &[
                "office", "work", "professional", "formal", "casual", "smart", "business", "ಆಫೀಸ್",
                "ಕಾರ್ಯ",
            ],
            Self::Wedding => &[
                "wedding", "bridal", "marriage", "bride", "groom", "reception", "engagement",
                "ಮದುವೆ", "ವೆಡ್ಡಿಂಗ್", "traditional",
            ],
            Self::Party => &[
                "party", "celebration", "event", "cocktail", "ಪಾರ್ಟಿ", "evening", "night",
                "function", "gathering",
            ],
            Self::Saree => &[
                "saree", "sari", "ಸೀರೆ", "kanchipuram", "silk", "kanchi", "banarasi", "georgette",
                "chiffon",
            ],
            Self::Lehenga => &["lehenga", "choli", "ghagra", "chaniya"],
            Self::Kurta => &["kurta", "kurti", "salwar", "kameez", "churidar", "palazzo", "ethnic"],
            Self::Makeup => &[
                "makeup", "cosmetic", "ಮೇಕಪ್", "beauty", "lipstick", "foundation", "eyeshadow",
                "mascara", "kajal",
            ],
            Self::Hair => &["hair", "hairstyle", "haircut", "ಕೂದಲು", "bun", "ponytail", "braid", "hairdo"],
            Self::Jewelry => &[
                "jewelry", "jewellery", "ಆಭರಣ", "necklace", "earrings", "bracelet", "bangles", "ring",
                "ಬಳೆ",
            ],
            Self::Outfit => &[
                "outfit", "dress", "wear", "clothes", "ವಸ್ತ್ರ", "ಬಟ್ಟೆ", "look", "style", "attire",
                "ensemble",
            ],
            Self::Shoes => &[
                "shoes", "heels", "flats", "sandals", "boots", "sneakers", "footwear", "ಚಪ್ಪಲಿ",
                "ಬೂಟು",
            ],
            Self::Accessories => &[
                "accessories", "bag", "clutch", "purse", "handbag", "scarf", "belt", "watch", "ಕೈಚೀಲ",
            ],
            Self::Color => &[
                "red", "green", "blue", "yellow", "pink", "purple", "color", "colour", "ಬಣ್ಣ", "ಕೆಂಪು",
                "ನೀಲಿ", "ಹಸಿರು", "orange", "black", "white", "gold", "silver", "maroon", "navy",
                "burgundy", "beige",
            ],
            Self::Style => &[
                "traditional", "modern", "ethnic", "western", "fusion", "vintage", "chic", "elegant",
                "trendy", "ಶೈಲಿ",
            ],
        }
    }

    /// Whether `keyword` contains one of this group's terms.
    pub fn matches(self, keyword: &str) -> bool {
        contains_any(keyword, self.terms())
    }
}

impl fmt::Display for KeywordGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve keyword links between this turn and the recent past.
///
/// For each pair of (current keyword, one of the last `window` history
/// keywords) the first group, in [`KeywordGroup::ALL`] order, that both
/// sides match is recorded. A group seen on only one side never links.
pub fn find_keyword_links(
    current: &[String],
    history: &[String],
    window: usize,
) -> BTreeSet<KeywordGroup> {
    let recent = &history[history.len().saturating_sub(window)..];
    let mut links = BTreeSet::new();

    for cur in current {
        for prev in recent {
            if let Some(group) = KeywordGroup::ALL
                .iter()
                .copied()
                .find(|g| g.matches(cur) && g.matches(prev))
            {
                links.insert(group);
            }
        }
    }

    links
}
