//! Lexicon — static vocabulary shared by the scope check, keyword
//! extractor, link resolver and intent rules.
//!
//! Every list is lower-case; callers lower-case the message before
//! testing membership with [`crate::scope::contains_term`].

/// Vocabulary that marks a message as fashion/beauty related.
pub const SCOPE_VOCABULARY: &[&str] = &[
    // Clothing & outfits
    "fashion", "trends", "clothing", "outfits", "styling", "wardrobe", "apparel",
    "dress", "shirt", "pants", "jeans", "skirt", "style", "wear", "outfit", "look",
    "saree", "lehenga", "kurta", "kurti", "salwar", "kameez", "churidar", "palazzo",
    "blazer", "jacket", "coat", "sweater", "cardigan", "top", "blouse", "tunic",
    "shorts", "trousers", "gown", "jumpsuit", "romper", "suit", "tuxedo",
    // Occasions
    "wedding", "bride", "groom", "bridal", "marriage", "reception", "engagement",
    "office", "work", "formal", "casual", "party", "professional", "business",
    "festival", "celebration", "event", "ceremony", "function", "gathering",
    "date", "dinner", "lunch", "brunch", "cocktail", "evening", "night", "day",
    // Accessories & jewelry ("hat" is left out: it fires inside "what")
    "accessories", "shoes", "bags", "jewelry", "jewellery", "necklace", "earrings",
    "bracelet", "ring", "bangles", "anklet", "chain", "pendant", "brooch",
    "watch", "belt", "scarf", "stole", "dupatta", "shawl", "cap",
    "sunglasses", "glasses", "clutch", "purse", "handbag", "wallet",
    "heels", "flats", "sandals", "boots", "sneakers", "loafers", "pumps",
    // Makeup & beauty
    "makeup", "cosmetics", "skincare", "beauty", "hair", "nail", "manicure", "pedicure",
    "foundation", "concealer", "powder", "blush", "bronzer", "highlighter", "contour",
    "lipstick", "lipgloss", "lipliner", "eyeshadow", "eyeliner", "mascara", "kajal",
    "eyebrow", "brow", "primer", "setting", "spray", "perfume", "fragrance",
    "hairstyle", "haircut", "haircolor", "hairdo", "bun", "ponytail", "braid",
    // Colors
    "color", "colour", "red", "blue", "green", "yellow", "pink", "purple", "orange",
    "black", "white", "grey", "gray", "brown", "beige", "navy", "maroon", "burgundy",
    "gold", "silver", "bronze", "copper", "cream", "ivory", "peach", "coral", "mint",
    // Styles & attributes
    "traditional", "modern", "contemporary", "vintage", "retro", "classic", "trendy",
    "ethnic", "western", "indo-western", "fusion", "bohemian", "boho", "chic",
    "elegant", "sophisticated", "glamorous", "minimalist", "edgy", "sporty",
    "overall", "complete", "full", "entire", "whole", "perfect", "ideal",
    "smart", "sharp", "polished", "sleek", "stylish", "fashionable",
    // Fabrics
    "silk", "cotton", "linen", "wool", "chiffon", "georgette", "velvet", "satin",
    "denim", "leather", "suede", "lace", "net", "organza", "crepe", "rayon",
    // Brands & shopping
    "brand", "designer", "boutique", "store", "shop", "buy", "purchase", "price",
    "budget", "affordable", "expensive", "luxury", "premium", "collection",
    // Requests
    "tips", "advice", "idea", "suggestion", "recommend", "help", "need", "want",
    "settled", "something", "anything", "show", "tell", "give", "find", "choose",
    // Kannada
    "ಫ್ಯಾಷನ್", "ಮೇಕಪ್", "ಸೌಂದರ್ಯ", "ವಸ್ತ್ರ", "ಬಟ್ಟೆ", "ಸೀರೆ", "ಮದುವೆ", "ಶೈಲಿ", "ಆಭರಣ",
    "ಕೂದಲು", "ಚರ್ಮ", "ಸುಗಂಧ", "ಬಣ್ಣ", "ಕೆಂಪು", "ನೀಲಿ", "ಹಸಿರು", "ಹಳದಿ", "ಕಪ್ಪು", "ಬಿಳಿ",
    "ಚಪ್ಪಲಿ", "ಬೂಟು", "ಕೈಚೀಲ", "ಉಂಗುರ", "ಕಿವಿಯೋಲೆ", "ಕೊರಳು", "ಬಳೆ",
    "ಆಫೀಸ್", "ಪಾರ್ಟಿ", "ಕಾರ್ಯ", "ಔಪಚಾರಿಕ", "ಅನೌಪಚಾರಿಕ",
    // Transliterated English in Kannada script
    "ನೀಡ್", "ವೆಡ್ಡಿಂಗ್", "ಸಂಥಿಂಗ್", "ಐ", "ಫಾರ್", "ಲುಕ್", "ಸ್ಟೈಲ್",
];

/// Terms that keep a conversation in scope when they appear in recent history.
pub const SCOPE_CONTEXT_TERMS: &[&str] = &[
    "outfit", "wear", "style", "dress", "fashion", "makeup", "beauty", "wedding", "party",
    "office", "saree", "ಮದುವೆ", "ವಸ್ತ್ರ", "ಮೇಕಪ್",
];

pub const GREETING_TERMS: &[&str] = &["hi", "hello", "hey", "greetings", "namaste"];

pub const GRATITUDE_TERMS: &[&str] = &[
    "thank", "thanks", "thankyou", "thank you", "thx", "tq", "appreciate", "grateful",
    "धन्यवाद", "ಧನ್ಯವಾದ", "ಧನ್ಯವಾದಗಳು",
];

/// Domain-significant words pulled out of a message by the keyword extractor.
pub const EXTRACTOR_VOCABULARY: &[&str] = &[
    // Occasions
    "wedding", "party", "office", "casual", "formal", "bridal", "reception", "engagement",
    "festival", "ceremony", "function", "date", "dinner", "cocktail", "business",
    // Clothing
    "saree", "lehenga", "dress", "outfit", "kurta", "kurti", "salwar", "palazzo",
    "blazer", "jacket", "shirt", "pants", "jeans", "skirt", "gown", "jumpsuit",
    // Makeup & beauty
    "makeup", "cosmetic", "beauty", "lipstick", "foundation", "eyeshadow", "mascara",
    "hairstyle", "haircut", "skincare", "perfume", "nail", "manicure",
    // Accessories
    "jewelry", "necklace", "earrings", "bracelet", "bangles", "ring", "watch",
    "shoes", "heels", "flats", "sandals", "boots", "bag", "clutch", "purse",
    // Styles
    "traditional", "modern", "ethnic", "western", "fusion", "vintage", "chic",
    "elegant", "glamorous", "minimalist", "trendy", "classic", "contemporary",
    // Attributes
    "work", "professional", "smart", "style", "look", "complete", "overall", "full",
    // Colors
    "red", "green", "blue", "yellow", "pink", "purple", "orange", "black", "white",
    "gold", "silver", "maroon", "navy", "burgundy", "beige", "brown", "grey",
    // Fabrics
    "silk", "cotton", "chiffon", "georgette", "velvet", "satin", "denim", "lace",
    // Kannada
    "ಮದುವೆ", "ಪಾರ್ಟಿ", "ಆಫೀಸ್", "ಸೀರೆ", "ಮೇಕಪ್", "ವಸ್ತ್ರ", "ವೆಡ್ಡಿಂಗ್",
    "ಬಣ್ಣ", "ಕೆಂಪು", "ನೀಲಿ", "ಹಸಿರು", "ಶೈಲಿ", "ಆಭರಣ", "ಕೂದಲು",
    // Brands
    "kanchipuram", "banarasi", "kanchi", "designer", "brand",
];

// ─── Rule triggers ───────────────────────────────────────

pub const MALE_TERMS: &[&str] = &["men", "man", "male", "groom", "boy", "guy", "gentleman"];

pub const OFFICE_COLOR_TERMS: &[&str] = &[
    "red", "black", "white", "blue", "green", "grey", "navy", "burgundy", "pink", "yellow",
];

/// Colors recognised while a saree is being discussed.
pub const SAREE_COLOR_TERMS: &[&str] = &[
    "red", "green", "blue", "yellow", "pink", "purple", "orange", "black", "white", "gold",
    "silver", "maroon", "navy",
];

/// Colors that have a dedicated saree color-change body, in lookup order.
pub const SAREE_SWATCHES: &[&str] = &[
    "green", "blue", "pink", "yellow", "purple", "maroon", "gold", "orange",
];

/// Messages that are nothing but a dress-code word.
pub const BARE_STYLE_WORDS: &[&str] = &["formal", "casual", "smart casual", "professional", "smart"];

pub const BARE_MAKEUP_WORDS: &[&str] = &["makeup", "ಮೇಕಪ್", "cosmetic", "beauty"];

pub const BARE_OUTFIT_WORDS: &[&str] = &["outfit", "dress", "wear", "clothes", "ವಸ್ತ್ರ"];

pub const BARE_PARTY_OUTFIT_WORDS: &[&str] = &["outfit", "dress", "wear", "clothes"];

pub const CONTINUATION_TERMS: &[&str] = &[
    "yes", "yeah", "ok", "sure", "need", "want", "tell", "show", "give", "something",
    "anything", "more", "also", "ನೀಡ್", "ಸಂಥಿಂಗ್", "ಐ", "ಫಾರ್",
];

/// Shorter continuation list consulted only after every direct rule missed.
pub const FALLBACK_CONTINUATION_TERMS: &[&str] = &[
    "yes", "yeah", "ok", "sure", "need", "want", "tell", "show", "give", "something",
    "anything", "ನೀಡ್", "ಸಂಥಿಂಗ್",
];

pub const WEDDING_TERMS: &[&str] = &["wedding", "bridal", "ಮದುವೆ", "ವೆಡ್ಡಿಂಗ್"];

pub const WEDDING_MAKEUP_OCCASION_TERMS: &[&str] =
    &["wedding", "bridal", "traditional", "settled", "ಮದುವೆ", "ವೆಡ್ಡಿಂಗ್"];

pub const OFFICE_TERMS: &[&str] = &["office", "work", "professional"];

pub const FORMAL_TERMS: &[&str] = &["formal", "professional"];

pub const FORMAL_OUTFIT_TERMS: &[&str] = &["outfit", "dress", "wear", "look"];

pub const MAKEUP_TERMS: &[&str] =
    &["makeup", "cosmetic", "foundation", "lipstick", "eyeshadow", "ಮೇಕಪ್"];

pub const EVENING_TERMS: &[&str] = &["party", "evening", "night"];

pub const KANCHIPURAM_TERMS: &[&str] = &["kanchipuram", "kanchi", "kanjivaram"];

pub const COMPLETENESS_TERMS: &[&str] = &["overall", "complete", "full", "entire", "whole"];

pub const LOOK_TERMS: &[&str] = &["look", "style", "outfit"];

pub const COMPLETE_OFFICE_TERMS: &[&str] = &["casual", "office", "work"];

pub const SMART_CASUAL_TERMS: &[&str] = &["casual", "smart"];

pub const PARTY_TERMS: &[&str] = &["party", "celebration", "event"];

pub const FESTIVAL_TERMS: &[&str] = &["festival", "festive", "ಹಬ್ಬ", "ಉತ್ಸವ"];

pub const VACATION_TERMS: &[&str] = &["vacation", "holiday", "travel", "trip", "beach", "resort"];

pub const SAREE_TERMS: &[&str] = &["saree", "sari", "ಸೀರೆ"];

pub const OUTFIT_TERMS: &[&str] = &["outfit", "dress", "wear", "ವಸ್ತ್ರ", "clothes"];

/// Kannada "red", checked alongside the English word for the red Kanchipuram body.
pub const KANNADA_RED: &str = "ಕೆಂಪು";

/// Kannada "wedding", checked against recent keywords during continuation.
pub const KANNADA_WEDDING: &str = "ಮದುವೆ";
