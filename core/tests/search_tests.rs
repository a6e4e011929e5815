use reelcore::query::{SearchEngine, SearchRequest, FALLBACK_MESSAGE};
use reelcore::store::{MemoryReelStore, ReelStore, SortOrder};
use reelcore::synonyms::SynonymTable;
use reelcore::{Reel, ReelStatus};
use time::{Duration, OffsetDateTime};

fn reel(id: &str, title: &str, category: &str, views: u64, likes: u64, age_days: i64) -> Reel {
    Reel {
        id: id.into(),
        title: title.into(),
        description: String::new(),
        category: category.into(),
        tags: Vec::new(),
        brand: None,
        is_paid: false,
        view_count: views,
        like_count: likes,
        status: ReelStatus::Active,
        created_at: OffsetDateTime::UNIX_EPOCH + Duration::days(1000 - age_days),
        video_url: None,
        thumbnail_url: None,
    }
}

fn ids(reels: &[Reel]) -> Vec<&str> {
    reels.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn empty_query_expands_to_nothing() {
    assert!(SynonymTable::default().expand("").is_empty());
    assert!(SynonymTable::default().expand("   ").is_empty());
}

#[test]
fn key_expands_to_all_of_its_terms() {
    let table = SynonymTable::default();
    let expanded = table.expand("food");
    assert!(expanded.contains("food"));
    for term in table.terms("food").unwrap() {
        assert!(expanded.contains(term), "missing {term}");
    }
}

#[test]
fn term_promotes_its_root_but_not_siblings() {
    let expanded = SynonymTable::default().expand("Recipe");
    assert!(expanded.contains("recipe"));
    assert!(expanded.contains("food"));
    assert!(!expanded.contains("cooking"));
    assert_eq!(expanded.len(), 2);
}

#[test]
fn unknown_words_are_kept() {
    let expanded = SynonymTable::default().expand("zxqv blorp");
    assert_eq!(expanded.iter().collect::<Vec<_>>(), vec!["blorp", "zxqv"]);
}

#[test]
fn no_match_falls_back_to_most_viewed() {
    let mut reels: Vec<Reel> = (0..15).map(|i| reel(&format!("r{i:02}"), "daily vlog", "All", i * 10, 0, i as i64)).collect();
    let mut hidden = reel("hidden", "daily vlog", "All", 10_000, 0, 0);
    hidden.status = ReelStatus::Pending;
    reels.push(hidden);
    let store = MemoryReelStore::with_reels(reels);

    let result = SearchEngine::default().search(&store, &SearchRequest::new("quantum chromodynamics")).unwrap();
    assert!(result.is_fallback);
    assert_eq!(result.message.as_deref(), Some(FALLBACK_MESSAGE));
    assert_eq!(result.reels.len(), 10);
    assert!(result.reels.windows(2).all(|w| w[0].view_count > w[1].view_count));
    assert_eq!(result.reels[0].id, "r14");
    assert!(result.reels.iter().all(|r| r.is_active()));
}

#[test]
fn empty_query_browses_newest_first() {
    let reels: Vec<Reel> = (0..25).map(|i| reel(&format!("r{i:02}"), "clip", "All", 0, 0, i as i64)).collect();
    let store = MemoryReelStore::with_reels(reels);

    let request = SearchRequest::new("").category("All");
    let result = SearchEngine::default().search(&store, &request).unwrap();
    assert!(!result.is_fallback);
    assert_eq!(result.message, None);
    assert_eq!(result.reels.len(), 20);
    assert_eq!(result.reels[0].id, "r00");
    assert!(result.reels.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[test]
fn empty_query_with_no_matches_does_not_fall_back() {
    let store = MemoryReelStore::with_reels(vec![reel("a", "clip", "Food", 5, 0, 1)]);
    let result = SearchEngine::default().search(&store, &SearchRequest::new("").category("Gaming")).unwrap();
    assert!(!result.is_fallback);
    assert!(result.reels.is_empty());
}

#[test]
fn bare_price_keyword_with_no_matches_does_not_fall_back() {
    let store = MemoryReelStore::with_reels(vec![reel("free1", "clip", "All", 50, 0, 1)]);
    let engine = SearchEngine::default();

    let paid = engine.search(&store, &SearchRequest::new("paid")).unwrap();
    assert!(!paid.is_fallback);
    assert!(paid.reels.is_empty());

    let mut premium = reel("paid1", "clip", "All", 50, 0, 1);
    premium.is_paid = true;
    let store = MemoryReelStore::with_reels(vec![premium]);
    let free = engine.search(&store, &SearchRequest::new("  FREE ")).unwrap();
    assert!(!free.is_fallback);
    assert!(free.reels.is_empty());
}

#[test]
fn price_keyword_with_unmatched_text_still_falls_back() {
    let store = MemoryReelStore::with_reels(vec![reel("free1", "clip", "All", 50, 0, 1)]);
    let result = SearchEngine::default().search(&store, &SearchRequest::new("paid submarine")).unwrap();
    assert!(result.is_fallback);
    assert_eq!(ids(&result.reels), vec!["free1"]);
}

#[test]
fn fallback_ignores_category_and_price_filters() {
    let mut reels: Vec<Reel> = Vec::new();
    for i in 0..12u64 {
        let category = if i % 2 == 0 { "Food" } else { "Travel" };
        let mut r = reel(&format!("r{i:02}"), "daily vlog", category, i * 100, 0, i as i64);
        r.is_paid = i % 3 == 0;
        reels.push(r);
    }
    let store = MemoryReelStore::with_reels(reels);

    let request = SearchRequest::new("paid quantum chromodynamics").category("Gaming");
    let result = SearchEngine::default().search(&store, &request).unwrap();
    assert!(result.is_fallback);
    assert_eq!(result.reels.len(), 10);
    assert_eq!(result.reels[0].id, "r11");
    assert!(result.reels.windows(2).all(|w| w[0].view_count > w[1].view_count));
    assert!(result.reels.iter().all(|r| r.category != "Gaming"));
    assert!(result.reels.iter().any(|r| !r.is_paid));
    assert!(result.reels.iter().any(|r| r.category == "Food") && result.reels.iter().any(|r| r.category == "Travel"));
}

#[test]
fn tech_category_covers_its_aliases() {
    let store = MemoryReelStore::with_reels(vec![
        reel("a", "clip", "Technology", 0, 0, 1),
        reel("b", "clip", "Tech", 0, 0, 2),
        reel("c", "clip", "Computing", 0, 0, 3),
        reel("d", "clip", "Food", 0, 0, 4),
        reel("e", "clip", "Obscure", 0, 0, 5),
    ]);
    let engine = SearchEngine::default();

    let tech = engine.search(&store, &SearchRequest::new("").category("Tech")).unwrap();
    assert_eq!(ids(&tech.reels), vec!["a", "b", "c"]);

    let obscure = engine.search(&store, &SearchRequest::new("").category("Obscure")).unwrap();
    assert_eq!(ids(&obscure.reels), vec!["e"]);
}

#[test]
fn paid_query_filters_on_paid_flag() {
    let mut paid = reel("paid", "Rust course", "Education", 0, 0, 1);
    paid.is_paid = true;
    let free = reel("free", "Rust course", "Education", 0, 0, 2);
    let store = MemoryReelStore::with_reels(vec![paid, free]);
    let engine = SearchEngine::default();

    let result = engine.search(&store, &SearchRequest::new("paid course")).unwrap();
    assert_eq!(ids(&result.reels), vec!["paid"]);

    let result = engine.search(&store, &SearchRequest::new("Free course")).unwrap();
    assert_eq!(ids(&result.reels), vec!["free"]);
}

#[test]
fn synonyms_match_across_fields() {
    let mut tagged = reel("tagged", "My weekend", "All", 0, 0, 1);
    tagged.tags = vec!["Recipe".into()];
    let mut branded = reel("branded", "Unboxing", "All", 0, 0, 2);
    branded.brand = Some("Restaurant Supply Co".into());
    let described = Reel { description: "late night DINNER".into(), ..reel("described", "Night out", "All", 0, 0, 3) };
    let unrelated = reel("unrelated", "Skateboarding", "All", 0, 0, 4);
    let store = MemoryReelStore::with_reels(vec![tagged, branded, described, unrelated]);

    let result = SearchEngine::default().search(&store, &SearchRequest::new("food")).unwrap();
    assert!(!result.is_fallback);
    assert_eq!(ids(&result.reels), vec!["tagged", "branded", "described"]);
}

#[test]
fn sort_orders_apply() {
    let store = MemoryReelStore::with_reels(vec![
        reel("a", "cat video", "All", 100, 1, 3),
        reel("b", "cat video", "All", 1, 100, 2),
        reel("c", "cat video", "All", 50, 50, 1),
    ]);
    let engine = SearchEngine::default();

    let liked = engine.search(&store, &SearchRequest::new("cat").sort(SortOrder::MostLiked)).unwrap();
    assert_eq!(ids(&liked.reels), vec!["b", "c", "a"]);
    let viewed = engine.search(&store, &SearchRequest::new("cat").sort(SortOrder::MostViewed)).unwrap();
    assert_eq!(ids(&viewed.reels), vec!["a", "c", "b"]);
    let newest = engine.search(&store, &SearchRequest::new("cat")).unwrap();
    assert_eq!(ids(&newest.reels), vec!["c", "b", "a"]);
}

#[test]
fn suggestions_collect_matching_keywords() {
    let mut first = reel("a", "Cooking pasta", "Food", 0, 0, 1);
    first.tags = vec!["cooking".into(), "italian".into(), "Cooking".into()];
    let mut second = reel("b", "Camping trip", "Travel", 0, 0, 2);
    second.brand = Some("CookCamp".into());
    let store = MemoryReelStore::with_reels(vec![first, second]);
    let engine = SearchEngine::default();

    let texts: Vec<String> = engine.suggestions(&store, "COOK").unwrap().into_iter().map(|s| s.text).collect();
    assert_eq!(texts, vec!["Cooking pasta", "cooking", "Cooking", "CookCamp"]);
    assert!(engine.suggestions(&store, "").unwrap().is_empty());
}

#[test]
fn feed_lists_active_reels_newest_first() {
    let mut rejected = reel("x", "clip", "All", 0, 0, 0);
    rejected.status = ReelStatus::Rejected;
    let store = MemoryReelStore::with_reels(vec![reel("old", "clip", "All", 0, 0, 9), rejected, reel("new", "clip", "All", 0, 0, 1)]);
    let feed = SearchEngine::default().feed(&store).unwrap();
    assert_eq!(ids(&feed), vec!["new", "old"]);
    assert_eq!(store.len().unwrap(), 3);
}
