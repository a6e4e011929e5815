//! Reel store contract and an in-memory implementation.

use crate::{Reel, Result};
use parking_lot::RwLock;
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

/// Predicate over reels used by [`ReelStore::find`].
pub trait ReelFilter {
    fn matches(&self, reel: &Reel) -> bool;
}

impl<F> ReelFilter for F
where
    F: Fn(&Reel) -> bool,
{
    fn matches(&self, reel: &Reel) -> bool {
        self(reel)
    }
}

/// Result ordering. All orders are descending; ties go to the smaller id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    MostLiked,
    MostViewed,
}

impl SortOrder {
    /// `most_liked` and `most_viewed` select those orders; anything else is newest first.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("most_liked") => Self::MostLiked,
            Some("most_viewed") => Self::MostViewed,
            _ => Self::Newest,
        }
    }

    pub fn compare(&self, a: &Reel, b: &Reel) -> Ordering {
        let primary = match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::MostLiked => b.like_count.cmp(&a.like_count),
            Self::MostViewed => b.view_count.cmp(&a.view_count),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Query-mostly access to persisted reels. Implementations must be safe for
/// concurrent readers.
pub trait ReelStore: Send + Sync {
    /// Reels matching `filter`, ordered by `sort` (store order when `None`),
    /// at most `limit` of them.
    fn find(&self, filter: &dyn ReelFilter, sort: Option<SortOrder>, limit: usize) -> Result<Vec<Reel>>;

    fn get(&self, id: &str) -> Result<Option<Reel>>;

    /// Insert or replace a reel by id.
    fn insert(&self, reel: Reel) -> Result<()>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Most frequent tags among the `sample` most-viewed active reels.
    fn trending_tags(&self, sample: usize, limit: usize) -> Result<Vec<String>> {
        let popular = self.find(&|r: &Reel| r.is_active(), Some(SortOrder::MostViewed), sample)?;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in popular.iter().flat_map(|r| r.tags.iter()) {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by_key(|&(tag, count)| (Reverse(count), tag));
        Ok(ranked.into_iter().take(limit).map(|(tag, _)| tag.to_string()).collect())
    }
}

/// Filter, order and cap an iterator of reels the way every store does.
pub fn select<I>(reels: I, filter: &dyn ReelFilter, sort: Option<SortOrder>, limit: usize) -> Vec<Reel>
where
    I: IntoIterator<Item = Reel>,
{
    let mut matched: Vec<Reel> = match sort {
        Some(_) => reels.into_iter().filter(|r| filter.matches(r)).collect(),
        None => reels.into_iter().filter(|r| filter.matches(r)).take(limit).collect(),
    };
    if let Some(order) = sort {
        matched.sort_by(|a, b| order.compare(a, b));
        matched.truncate(limit);
    }
    matched
}

/// Process-local store, in insertion order.
#[derive(Default)]
pub struct MemoryReelStore {
    reels: RwLock<Vec<Reel>>,
}

impl MemoryReelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reels<I: IntoIterator<Item = Reel>>(reels: I) -> Self {
        let store = Self::new();
        for reel in reels {
            store.upsert(reel);
        }
        store
    }

    fn upsert(&self, reel: Reel) {
        let mut reels = self.reels.write();
        match reels.iter_mut().find(|r| r.id == reel.id) {
            Some(slot) => *slot = reel,
            None => reels.push(reel),
        }
    }
}

impl ReelStore for MemoryReelStore {
    fn find(&self, filter: &dyn ReelFilter, sort: Option<SortOrder>, limit: usize) -> Result<Vec<Reel>> {
        let reels = self.reels.read();
        Ok(select(reels.iter().cloned(), filter, sort, limit))
    }

    fn get(&self, id: &str) -> Result<Option<Reel>> {
        Ok(self.reels.read().iter().find(|r| r.id == id).cloned())
    }

    fn insert(&self, reel: Reel) -> Result<()> {
        self.upsert(reel);
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.reels.read().len())
    }
}
