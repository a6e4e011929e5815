//! Static synonym dictionary and one-hop query expansion.
//!
//! A query word that is a dictionary key pulls in every term mapped under it;
//! a word that appears as a term pulls in the key(s) that own it. Expansion
//! never chains: the terms added by one hop are not expanded again.

use crate::tokenizer::query_words;
use crate::{ReelError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    ("education", &["study", "learning", "school", "tutorial", "class", "exam", "course", "college", "university"]),
    ("fashion", &["style", "outfit", "clothing", "dress", "shopping", "wear", "trends", "model", "ootd"]),
    ("food", &["cooking", "recipe", "restaurant", "eating", "meal", "dinner", "lunch", "breakfast", "tasty", "yummy"]),
    ("tech", &["gadgets", "software", "coding", "programming", "computer", "mobile", "app", "developer", "hardware"]),
    ("travel", &["vacation", "trip", "holiday", "tourism", "flight", "hotel", "beach", "adventure", "explore"]),
    ("gaming", &["playing", "games", "streamer", "console", "pc", "playstation", "xbox", "nintendo", "entertainment"]),
    ("fitness", &["gym", "workout", "exercise", "health", "running", "yoga", "training", "diet"]),
    ("music", &["song", "concert", "singer", "band", "lyrics", "audio", "sound"]),
    ("pets", &["dog", "cat", "animals", "puppy", "kitten", "cute"]),
    ("business", &["marketing", "finance", "money", "startup", "entrepreneur", "career", "job"]),
    ("job", &["career", "work", "hiring", "resume"]),
    ("funny", &["comedy", "laugh", "meme", "joke", "prank"]),
    ("scenery", &["nature", "landscape", "view", "sunset", "sunrise"]),
    ("love", &["romance", "couple", "wedding", "relationship"]),
];

/// Immutable key → related-terms dictionary with a reverse index.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    forward: BTreeMap<String, Vec<String>>,
    /// term -> every key listing it
    reverse: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    /// Build a table, rejecting entries that break the dictionary invariants:
    /// keys and terms are lowercase and no key lists itself.
    pub fn new<I, K, T>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<T>)>,
        K: Into<String>,
        T: Into<String>,
    {
        let mut forward: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, terms) in entries {
            let key = key.into();
            if key.is_empty() || key != key.to_lowercase() {
                return Err(ReelError::InvalidInput(format!("synonym key {key:?} must be non-empty lowercase")));
            }
            let slot = forward.entry(key.clone()).or_default();
            for term in terms {
                let term = term.into();
                if term != term.to_lowercase() {
                    return Err(ReelError::InvalidInput(format!("synonym term {term:?} under {key:?} must be lowercase")));
                }
                if term == key {
                    return Err(ReelError::InvalidInput(format!("synonym key {key:?} lists itself")));
                }
                if !slot.contains(&term) {
                    slot.push(term);
                }
            }
        }

        let mut reverse: HashMap<String, Vec<String>> = HashMap::new();
        for (key, terms) in &forward {
            for term in terms {
                reverse.entry(term.clone()).or_default().push(key.clone());
            }
        }
        Ok(Self { forward, reverse })
    }

    /// Load a table from a JSON object of `"key": ["term", ...]`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(&data)?;
        let table = Self::new(raw)?;
        tracing::info!(path = %path.as_ref().display(), keys = table.len(), "loaded synonym table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn terms(&self, key: &str) -> Option<&[String]> {
        self.forward.get(key).map(Vec::as_slice)
    }

    /// Expand a free-text query into its words plus their one-hop synonyms.
    pub fn expand(&self, query: &str) -> ExpandedQuery {
        let words = query_words(query);
        let mut terms: BTreeSet<String> = words.iter().cloned().collect();
        for word in &words {
            if let Some(related) = self.forward.get(word) {
                terms.extend(related.iter().cloned());
            }
            if let Some(owners) = self.reverse.get(word) {
                terms.extend(owners.iter().cloned());
            }
        }
        ExpandedQuery { terms }
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        let entries = DEFAULT_SYNONYMS.iter().map(|(k, v)| (*k, v.to_vec()));
        Self::new(entries).expect("built-in synonym table is well formed")
    }
}

/// Deduplicated lowercase terms for one search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedQuery {
    terms: BTreeSet<String>,
}

impl ExpandedQuery {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn into_terms(self) -> BTreeSet<String> {
        self.terms
    }
}
