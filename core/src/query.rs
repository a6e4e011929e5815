//! Search query compilation and execution against a [`ReelStore`].
//!
//! A raw request goes through, in order: price intent extraction, synonym
//! expansion of the remaining text, category alias resolution, filter
//! assembly, sort selection, and finally execution with the trending
//! fallback when a non-empty query matched nothing.

use crate::category::CategoryAliases;
use crate::store::{ReelFilter, ReelStore, SortOrder};
use crate::synonyms::{ExpandedQuery, SynonymTable};
use crate::tokenizer::{contains_ci, extract_intent};
use crate::{Reel, Result};
use serde::Serialize;

pub const FALLBACK_MESSAGE: &str = "No exact matches found. Here are some trending reels you might like!";

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub page_size: usize,
    pub fallback_size: usize,
    /// How many of the most-viewed reels feed the trending tag count.
    pub trending_sample: usize,
    pub trending_limit: usize,
    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { page_size: 20, fallback_size: 10, trending_sample: 50, trending_limit: 10, suggestion_limit: 5 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub category: Option<String>,
    pub sort: SortOrder,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// Predicate over active reels: optional paid flag, optional category set,
/// optional match-any term clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub paid: Option<bool>,
    pub categories: Option<Vec<String>>,
    pub terms: Option<ExpandedQuery>,
}

impl SearchFilter {
    fn term_matches(terms: &ExpandedQuery, reel: &Reel) -> bool {
        terms.iter().any(|term| {
            contains_ci(&reel.title, term)
                || contains_ci(&reel.description, term)
                || contains_ci(&reel.category, term)
                || reel.tags.iter().any(|tag| contains_ci(tag, term))
                || reel.brand.as_deref().is_some_and(|brand| contains_ci(brand, term))
        })
    }
}

impl ReelFilter for SearchFilter {
    fn matches(&self, reel: &Reel) -> bool {
        if !reel.is_active() {
            return false;
        }
        if let Some(paid) = self.paid {
            if reel.is_paid != paid {
                return false;
            }
        }
        if let Some(categories) = &self.categories {
            if !categories.iter().any(|c| *c == reel.category) {
                return false;
            }
        }
        match &self.terms {
            Some(terms) => Self::term_matches(terms, reel),
            None => true,
        }
    }
}

/// A request reduced to what the store executes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Query text left after price keywords were stripped.
    pub text: String,
    pub filter: SearchFilter,
    pub sort: SortOrder,
    pub limit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub reels: Vec<Reel>,
    pub is_fallback: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub text: String,
}

/// Whether an empty primary result should be replaced by trending reels.
/// Only non-empty search text qualifies, judged after "paid"/"free" were
/// stripped: a bare price filter that matched nothing is a legitimate empty
/// browse.
pub fn should_fall_back(search_text: &str, primary: &[Reel]) -> bool {
    primary.is_empty() && !search_text.trim().is_empty()
}

pub struct SearchEngine {
    synonyms: SynonymTable,
    categories: CategoryAliases,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(synonyms: SynonymTable, categories: CategoryAliases, config: SearchConfig) -> Self {
        Self { synonyms, categories, config }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn compile(&self, request: &SearchRequest) -> CompiledQuery {
        let intent = extract_intent(&request.query);
        let terms = if intent.text.is_empty() {
            None
        } else {
            Some(self.synonyms.expand(&intent.text)).filter(|t| !t.is_empty())
        };
        let filter = SearchFilter {
            paid: intent.paid,
            categories: self.categories.resolve(request.category.as_deref()),
            terms,
        };
        CompiledQuery { text: intent.text, filter, sort: request.sort, limit: self.config.page_size }
    }

    pub fn search(&self, store: &dyn ReelStore, request: &SearchRequest) -> Result<SearchResult> {
        let compiled = self.compile(request);
        tracing::debug!(query = %request.query, ?compiled, "compiled search");
        let reels = store.find(&compiled.filter, Some(compiled.sort), compiled.limit)?;
        if should_fall_back(&compiled.text, &reels) {
            tracing::info!(query = %request.query, "no matches, serving trending fallback");
            return self.fallback(store);
        }
        Ok(SearchResult { reels, is_fallback: false, message: None })
    }

    /// Most-viewed active reels, ignoring every filter of the original request.
    pub fn fallback(&self, store: &dyn ReelStore) -> Result<SearchResult> {
        let reels = store.find(&|r: &Reel| r.is_active(), Some(SortOrder::MostViewed), self.config.fallback_size)?;
        Ok(SearchResult { reels, is_fallback: true, message: Some(FALLBACK_MESSAGE.to_string()) })
    }

    /// Keyword completions drawn from titles, brands and tags of matching reels.
    pub fn suggestions(&self, store: &dyn ReelStore, query: &str) -> Result<Vec<Suggestion>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let hit = |text: &str| contains_ci(text, &needle);
        let reels = store.find(
            &|r: &Reel| hit(r.title.as_str()) || r.tags.iter().any(|t| hit(t.as_str())) || r.brand.as_deref().is_some_and(|b| hit(b)),
            None,
            self.config.suggestion_limit,
        )?;

        let mut keywords: Vec<String> = Vec::new();
        let mut push = |text: &str| {
            if hit(text) && !keywords.iter().any(|k| k == text) {
                keywords.push(text.to_string());
            }
        };
        for reel in &reels {
            push(reel.title.as_str());
            if let Some(brand) = reel.brand.as_deref() {
                push(brand);
            }
            for tag in &reel.tags {
                push(tag.as_str());
            }
        }
        Ok(keywords
            .into_iter()
            .take(self.config.suggestion_limit)
            .map(|text| Suggestion { kind: SuggestionKind::Keyword, text })
            .collect())
    }

    pub fn trending(&self, store: &dyn ReelStore) -> Result<Vec<String>> {
        store.trending_tags(self.config.trending_sample, self.config.trending_limit)
    }

    /// Every active reel, newest first.
    pub fn feed(&self, store: &dyn ReelStore) -> Result<Vec<Reel>> {
        store.find(&|r: &Reel| r.is_active(), Some(SortOrder::Newest), usize::MAX)
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SynonymTable::default(), CategoryAliases::default(), SearchConfig::default())
    }
}
