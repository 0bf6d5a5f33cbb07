//! Integration tests for the catalog engine over a mock listing

use gamedex_config::GamedexConfig;
use gamedex_engine::{
    CatalogEngine, CatalogError, CatalogView, ScrollMetrics, ScrollOutcome, ViewMode, render,
};
use gamedex_fetch::FetchError;
use gamedex_fetch::mock::MockListing;
use gamedex_library::{FAVORITES_KEY, GameId, GameRecord, RatingSort};
use gamedex_storage::{FileStore, KeyValueStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// 100 records: every eighth of the first 96 is an RPG (12 in total)
fn hundred_records() -> Vec<GameRecord> {
    (0..100)
        .map(|i| {
            let genre = if i % 8 == 0 && i < 96 { "RPG" } else { "Action" };
            GameRecord::new(i, format!("Game {}", i))
                .with_genres([genre])
                .with_platforms(["PC"])
                .with_rating((i % 5) as f64)
        })
        .collect()
}

fn engine_with(mock: MockListing) -> (CatalogEngine<MockListing>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = CatalogEngine::new(&GamedexConfig::default(), mock, store.clone());
    (engine, store)
}

fn engine_on_disk(dir: &TempDir) -> CatalogEngine<MockListing> {
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    CatalogEngine::new(&GamedexConfig::default(), MockListing::new(), store)
}

fn at_bottom() -> ScrollMetrics {
    ScrollMetrics::new(1200.0, 800.0, 2000.0)
}

#[tokio::test]
async fn test_genre_filter_and_page_bounds() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 3));

    let page = engine.load().await.unwrap();
    assert_eq!(page.total_count, 100);
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.records.len(), 32);
    assert!(engine.has_more_remote());

    let page = engine.set_genre_filter("RPG").unwrap();
    assert_eq!(page.total_count, 12);
    assert_eq!(page.total_pages, 1);
    assert!(page.filters_active);

    assert_eq!(engine.change_page(1).current_page, 1);
    assert_eq!(engine.change_page(-1).current_page, 1);
    assert_eq!(render::pagination_label(&engine.current_page()), "Page 1 / 1 (12 games)");
}

#[tokio::test]
async fn test_change_page_walks_local_pages() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 3));
    engine.load().await.unwrap();

    let page = engine.change_page(1);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.records[0].key(), "32");

    engine.change_page(1);
    let page = engine.change_page(1);
    assert_eq!(page.current_page, 4);
    assert_eq!(page.records.len(), 4);
    assert!(!page.has_next());

    assert_eq!(engine.change_page(1).current_page, 4);
}

#[tokio::test]
async fn test_change_page_ignores_extreme_deltas() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 3));
    assert_eq!(engine.change_page(i64::MAX).current_page, 1);

    engine.load().await.unwrap();
    engine.change_page(1);
    assert_eq!(engine.change_page(i64::MAX).current_page, 2);
    assert_eq!(engine.change_page(i64::MIN).current_page, 2);
}

#[tokio::test]
async fn test_filter_change_resets_to_first_page() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 3));
    engine.load().await.unwrap();
    engine.change_page(1);
    engine.change_page(1);

    let page = engine.set_rating_sort(RatingSort::Descending);
    assert_eq!(page.current_page, 1);
    assert_eq!(page.records[0].rating, Some(4.0));
    assert_eq!(page.records[0].key(), "4");
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_local() {
    let mut records = hundred_records();
    records.push(GameRecord::new(500, "The Legend of Zelda"));
    let mock = MockListing::new().with_page(1, records, 1);
    let (engine, _) = engine_with(mock);
    engine.load().await.unwrap();

    let page = engine.search("  ZELD ");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.records[0].name.as_deref(), Some("The Legend of Zelda"));

    let page = engine.search("");
    assert_eq!(page.total_count, 101);
    assert_eq!(engine.source().requests(), vec![1]);
}

#[tokio::test]
async fn test_empty_result_reports_active_filters() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 1));
    engine.load().await.unwrap();

    let page = engine.search("no such game");
    assert!(page.is_empty());
    assert_eq!(page.current_page, 1);
    assert_eq!(page.total_pages, 0);
    assert_eq!(
        render::empty_state(page.filters_active),
        ("No games found.", Some("Try modifying your filters or search."))
    );
}

#[tokio::test(start_paused = true)]
async fn test_debounced_search_applies_last_term() {
    let mut records = hundred_records();
    records.push(GameRecord::new(500, "The Legend of Zelda"));
    let (engine, _) = engine_with(MockListing::new().with_page(1, records, 1));
    engine.load().await.unwrap();

    let first = engine.search_debounced("game 1");
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        engine.search_debounced("zeld").await
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_none());
    let page = second.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(engine.criteria().search_term, "zeld");
}

#[tokio::test]
async fn test_failed_load_keeps_records_and_is_retryable() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 3));
    engine.load().await.unwrap();

    engine.source().fail_page(1, 503);
    let err = engine.load().await.unwrap_err();
    assert!(matches!(err, CatalogError::Network(FetchError::Status(503))));

    let page = engine.current_page();
    assert_eq!(page.total_count, 100);
    assert!(page.is_retryable());
    assert!(!engine.is_loading());

    engine.source().set_page(1, hundred_records(), 3);
    let page = engine.retry().await.unwrap();
    assert!(page.error.is_none());
    assert_eq!(page.total_count, 100);
}

#[tokio::test]
async fn test_first_load_failure_shows_error() {
    let (engine, _) = engine_with(MockListing::new());

    assert!(engine.load().await.is_err());
    let page = engine.current_page();
    assert!(page.is_empty());
    assert_eq!(page.error.as_deref(), Some("Server returned HTTP 404"));
}

#[tokio::test]
async fn test_concurrent_load_is_dropped() {
    let (engine, _) = engine_with(MockListing::gated().with_page(1, hundred_records(), 3));

    let release = async {
        tokio::task::yield_now().await;
        engine.source().release(1);
    };
    let (first, second, _) = tokio::join!(engine.load(), engine.load(), release);

    assert_eq!(first.unwrap().total_count, 100);
    // The dropped call saw the state before the first load settled
    assert_eq!(second.unwrap().total_count, 0);
    assert!(!engine.is_loading());
    assert_eq!(engine.source().requests(), vec![1]);
}

#[tokio::test]
async fn test_scroll_advances_then_extends_until_cap() {
    let (engine, _) = engine_with(MockListing::with_generated(1000, 100));
    engine.load().await.unwrap();

    let mut advanced = 0;
    let mut extended = 0;
    loop {
        match engine.on_scroll(at_bottom()).await {
            ScrollOutcome::Advanced(_) => advanced += 1,
            ScrollOutcome::Extended(_) => extended += 1,
            ScrollOutcome::Exhausted => break,
            other => panic!("unexpected scroll outcome: {:?}", other),
        }
    }

    assert_eq!(extended, 4);
    assert_eq!(engine.record_count(), 500);
    assert_eq!(engine.source().requests(), vec![1, 2, 3, 4, 5]);

    // ceil(500 / 32) = 16 pages, all walked from page 1
    assert_eq!(advanced, 15);
    assert_eq!(engine.current_page().current_page, 16);
}

#[tokio::test]
async fn test_scroll_stops_at_last_remote_page() {
    let (engine, _) = engine_with(MockListing::with_generated(150, 100));
    engine.load().await.unwrap();

    while engine.on_scroll(at_bottom()).await != ScrollOutcome::Exhausted {}

    assert_eq!(engine.record_count(), 150);
    assert!(!engine.has_more_remote());
    assert_eq!(engine.source().requests(), vec![1, 2]);
    assert_eq!(engine.current_page().current_page, 5);
}

#[tokio::test]
async fn test_extension_keeps_current_page() {
    let (engine, _) = engine_with(MockListing::with_generated(300, 100));
    engine.load().await.unwrap();
    for _ in 0..3 {
        assert!(matches!(
            engine.on_scroll(at_bottom()).await,
            ScrollOutcome::Advanced(_)
        ));
    }

    match engine.on_scroll(at_bottom()).await {
        ScrollOutcome::Extended(page) => {
            assert_eq!(page.current_page, 4);
            assert_eq!(page.total_count, 200);
            assert_eq!(page.total_pages, 7);
        }
        other => panic!("expected extension, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scroll_ignored_away_from_bottom_and_in_favorites() {
    let (engine, _) = engine_with(MockListing::with_generated(300, 100));
    engine.load().await.unwrap();

    let top = ScrollMetrics::new(0.0, 800.0, 2000.0);
    assert_eq!(engine.on_scroll(top).await, ScrollOutcome::Ignored);

    engine.toggle_view_mode();
    assert_eq!(engine.on_scroll(at_bottom()).await, ScrollOutcome::Ignored);
    assert_eq!(engine.current_page().current_page, 1);
}

#[tokio::test]
async fn test_overlapping_scroll_is_ignored() {
    let mock = MockListing::gated();
    mock.set_generated(300, 100);
    let (engine, _) = engine_with(mock);

    engine.source().release(1);
    engine.load().await.unwrap();
    for _ in 0..3 {
        engine.on_scroll(at_bottom()).await;
    }

    let release = async {
        tokio::task::yield_now().await;
        engine.source().release(1);
    };
    let (first, second, _) = tokio::join!(
        engine.on_scroll(at_bottom()),
        engine.on_scroll(at_bottom()),
        release
    );

    assert!(matches!(first, ScrollOutcome::Extended(_)));
    assert_eq!(second, ScrollOutcome::Ignored);
    assert_eq!(engine.source().requests(), vec![1, 2]);
}

#[tokio::test]
async fn test_failed_extension_leaves_records() {
    let mock = MockListing::with_generated(300, 100);
    mock.fail_page(2, 500);
    let (engine, _) = engine_with(mock);
    engine.load().await.unwrap();
    for _ in 0..3 {
        engine.on_scroll(at_bottom()).await;
    }

    let outcome = engine.on_scroll(at_bottom()).await;
    assert_eq!(outcome, ScrollOutcome::Failed("Server returned HTTP 500".to_string()));
    assert_eq!(engine.record_count(), 100);
    assert!(engine.current_page().error.is_none());
}

#[tokio::test]
async fn test_favorites_view_ignores_filters() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 1));
    engine.load().await.unwrap();

    let records = engine.current_page().records;
    engine.toggle_favorite(&records[1]);
    engine.toggle_favorite(&records[2]);
    engine.search("game 1");

    match engine.toggle_view_mode() {
        CatalogView::Favorites(favorites) => {
            assert_eq!(favorites.len(), 2);
            assert_eq!(favorites[0].key(), "1");
        }
        other => panic!("expected favorites view, got {:?}", other),
    }

    let page = engine.show_catalog();
    assert_eq!(engine.view_mode(), ViewMode::Catalog);
    assert!(page.filters_active);
}

#[tokio::test]
async fn test_removing_favorite_in_favorites_view() {
    let (engine, _) = engine_with(MockListing::new().with_page(1, hundred_records(), 1));
    engine.load().await.unwrap();

    let records = engine.current_page().records;
    engine.toggle_favorite(&records[3]);
    engine.toggle_favorite(&records[5]);
    assert!(engine.toggle_view_mode().is_favorites());

    match engine.toggle_favorite(&records[3]) {
        CatalogView::Favorites(favorites) => {
            assert_eq!(favorites.len(), 1);
            assert_eq!(favorites[0].key(), "5");
            assert!(favorites.iter().all(|f| f.id != records[3].id));
        }
        other => panic!("expected favorites view, got {:?}", other),
    }
    assert!(!engine.is_favorite(&records[3].id));
    assert_eq!(engine.favorites().len(), 1);
}

#[tokio::test]
async fn test_toggle_favorite_twice_restores_persisted_state() {
    let (engine, store) = engine_with(MockListing::new());
    engine.toggle_favorite(&GameRecord::new(1, "Kept"));
    let before = store.get_raw(FAVORITES_KEY).unwrap();

    let record = GameRecord::new(2, "Toggled");
    let view = engine.toggle_favorite(&record);
    assert!(!view.is_favorites());
    assert!(engine.is_favorite(&record.id));

    engine.toggle_favorite(&record);
    assert!(!engine.is_favorite(&record.id));
    assert_eq!(store.get_raw(FAVORITES_KEY).unwrap(), before);
}

#[tokio::test]
async fn test_favorite_without_rating_renders_na() {
    let (engine, _) = engine_with(MockListing::new());
    let record = GameRecord::new(42, "Mystery").with_rating(f64::NAN);
    engine.toggle_favorite(&record);

    let favorites = engine.favorites();
    let card = engine.card(&favorites[0]);
    assert_eq!(card.rating, "N/A");
    assert!(card.is_favorite);
    assert_eq!(card.favorite_label(), "Remove from favorites");
}

#[tokio::test]
async fn test_ratings_are_bounded_and_persist() {
    let dir = TempDir::new().unwrap();
    let id = GameId::from(7);

    {
        let engine = engine_on_disk(&dir);
        assert!(matches!(
            engine.set_rating(&id, 0),
            Err(CatalogError::InvalidRating(0))
        ));
        assert!(matches!(
            engine.set_rating(&id, 6),
            Err(CatalogError::InvalidRating(6))
        ));
        assert_eq!(engine.rating(&id), None);

        assert_eq!(engine.set_rating(&id, 4).unwrap(), 4);
        engine.toggle_favorite(&GameRecord::new(7, "Hades"));
    }

    let engine = engine_on_disk(&dir);
    assert_eq!(engine.rating(&id), Some(4));
    assert!(engine.is_favorite(&id));

    let record = engine.find(&id).unwrap();
    let details = engine.details(&record);
    assert_eq!(details.user_rating, Some(4));
    assert_eq!(details.stars, [true, true, true, true, false]);
}

#[tokio::test]
async fn test_unavailable_storage_keeps_session_state() {
    let (engine, store) = engine_with(MockListing::new());
    store.set_unavailable(true);

    let record = GameRecord::new(3, "Offline");
    engine.toggle_favorite(&record);
    assert!(engine.is_favorite(&record.id));
    assert!(store.get_raw(FAVORITES_KEY).unwrap().is_none());
}
