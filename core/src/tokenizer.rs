use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PAID: Regex = Regex::new(r"(?i)paid").expect("valid regex");
    static ref FREE: Regex = Regex::new(r"(?i)free").expect("valid regex");
}

/// Price intent pulled out of a raw query, plus the text left for term matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    /// `Some(true)` for "paid", `Some(false)` for "free".
    pub paid: Option<bool>,
    pub text: String,
}

/// Detect "paid"/"free" anywhere in the query and strip every occurrence of the
/// matched keyword. "paid" wins when both are present.
pub fn extract_intent(raw: &str) -> Intent {
    let lower = raw.to_lowercase();
    if lower.contains("paid") {
        return Intent { paid: Some(true), text: PAID.replace_all(raw, "").trim().to_string() };
    }
    if lower.contains("free") {
        return Intent { paid: Some(false), text: FREE.replace_all(raw, "").trim().to_string() };
    }
    Intent { paid: None, text: raw.trim().to_string() }
}

/// Split text into lowercase words on whitespace, after NFKC normalization.
pub fn query_words(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Case-insensitive substring test. `needle` must already be lowercase.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
