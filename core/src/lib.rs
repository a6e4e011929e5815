//! Domain core for the reel backend: query expansion, search compilation over a
//! reel store, and the image-to-video frame timeline.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod category;
pub mod error;
pub mod persist;
pub mod query;
pub mod render;
pub mod store;
pub mod synonyms;
pub mod timeline;
pub mod tokenizer;

pub use error::{ReelError, Result};

pub type ReelId = String;

/// Moderation state of a reel. Only `Active` reels are ever searchable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReelStatus {
    #[default]
    Active,
    Pending,
    Rejected,
}

/// A short video post, as far as search and generation care about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reel {
    pub id: ReelId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Brand of the advertised product, if any.
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub status: ReelStatus,
    /// Ingest time when the record carries none.
    #[serde(with = "time::serde::rfc3339", default = "OffsetDateTime::now_utc")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

fn default_category() -> String {
    "All".to_string()
}

impl Reel {
    pub fn is_active(&self) -> bool {
        self.status == ReelStatus::Active
    }
}
