//! Display values for records and catalog pages
//!
//! Stateless: every function takes the record plus whatever store lookups it
//! needs and returns plain strings.

use crate::view::CatalogPage;
use chrono::NaiveDate;
use gamedex_library::{GameRecord, MAX_RATING};

pub const CARD_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x300?text=No+Image";
pub const DETAIL_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/800x400?text=No+Image";

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";
const NO_DESCRIPTION: &str = "No description available.";

/// Compact card for grid views
#[derive(Debug, Clone, PartialEq)]
pub struct GameCard {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub year: String,
    pub platform: String,
    pub rating: String,
    pub image: String,
    pub is_favorite: bool,
}

impl GameCard {
    pub fn favorite_label(&self) -> &'static str {
        favorite_label(self.is_favorite)
    }
}

/// Full detail view for one record
#[derive(Debug, Clone, PartialEq)]
pub struct GameDetails {
    pub id: String,
    pub title: String,
    pub image: String,
    pub genres: String,
    pub platforms: String,
    pub developers: String,
    pub publishers: String,
    pub rating: String,
    pub release_date: String,
    pub description: String,
    pub website: Option<String>,
    pub is_favorite: bool,
    pub user_rating: Option<u8>,
    /// `stars[i]` is filled when `i + 1 <= user_rating`
    pub stars: [bool; MAX_RATING as usize],
}

impl GameDetails {
    pub fn favorite_label(&self) -> &'static str {
        favorite_label(self.is_favorite)
    }
}

pub fn favorite_label(is_favorite: bool) -> &'static str {
    if is_favorite {
        "Remove from favorites"
    } else {
        "Add to favorites"
    }
}

pub fn card(record: &GameRecord, is_favorite: bool) -> GameCard {
    GameCard {
        id: record.key(),
        title: title(record),
        genre: record.genre_names().next().unwrap_or(UNKNOWN).to_string(),
        year: release_year(record.released.as_deref()),
        platform: record.platform_names().next().unwrap_or(UNKNOWN).to_string(),
        rating: rating_label(record.rating),
        image: image_or(record, CARD_PLACEHOLDER_IMAGE),
        is_favorite,
    }
}

pub fn details(record: &GameRecord, is_favorite: bool, user_rating: Option<u8>) -> GameDetails {
    let filled = user_rating.unwrap_or(0) as usize;
    let mut stars = [false; MAX_RATING as usize];
    for (i, star) in stars.iter_mut().enumerate() {
        *star = i < filled;
    }

    GameDetails {
        id: record.key(),
        title: title(record),
        image: image_or(record, DETAIL_PLACEHOLDER_IMAGE),
        genres: join_or_unknown(record.genre_names()),
        platforms: join_or_unknown(record.platform_names()),
        developers: join_or_unknown(record.developer_names()),
        publishers: join_or_unknown(record.publisher_names()),
        rating: rating_label(record.rating),
        release_date: release_date(record.released.as_deref()),
        description: record
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        website: record.website.clone().filter(|w| !w.is_empty()),
        is_favorite,
        user_rating,
        stars,
    }
}

/// One decimal, or "N/A" when missing or not finite
pub fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r.is_finite() => format!("{:.1}", r),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Year of an ISO `yyyy-mm-dd` date
pub fn release_year(released: Option<&str>) -> String {
    parse_release(released)
        .map(|date| date.format("%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `dd/mm/yyyy`
pub fn release_date(released: Option<&str>) -> String {
    parse_release(released)
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Headline and optional hint for an empty catalog page
pub fn empty_state(filters_active: bool) -> (&'static str, Option<&'static str>) {
    let hint = filters_active.then_some("Try modifying your filters or search.");
    ("No games found.", hint)
}

pub fn empty_favorites() -> &'static str {
    "No favorites yet."
}

pub fn pagination_label(page: &CatalogPage) -> String {
    format!(
        "Page {} / {} ({} games)",
        page.current_page,
        page.total_pages.max(1),
        page.total_count
    )
}

pub fn rating_confirmation(stars: u8) -> String {
    format!("Thank you! You rated this game {}/5 stars.", stars)
}

fn title(record: &GameRecord) -> String {
    record
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn image_or(record: &GameRecord, placeholder: &str) -> String {
    record
        .background_image
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

fn join_or_unknown<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined = names.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        UNKNOWN.to_string()
    } else {
        joined
    }
}

fn parse_release(released: Option<&str>) -> Option<NaiveDate> {
    let released = released?.trim();
    // Some records carry a full timestamp
    let date = released.get(..10).unwrap_or(released);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedex_library::GameId;

    #[test]
    fn test_card_defaults() {
        let mut record = GameRecord::new(42, "");
        record.name = None;

        let card = card(&record, false);
        assert_eq!(card.id, "42");
        assert_eq!(card.title, "Unknown");
        assert_eq!(card.genre, "Unknown");
        assert_eq!(card.year, "N/A");
        assert_eq!(card.platform, "Unknown");
        assert_eq!(card.rating, "N/A");
        assert_eq!(card.image, CARD_PLACEHOLDER_IMAGE);
        assert_eq!(card.favorite_label(), "Add to favorites");
    }

    #[test]
    fn test_card_never_shows_nan() {
        let record = GameRecord::new(42, "Broken").with_rating(f64::NAN);
        assert_eq!(card(&record, true).rating, "N/A");

        let record = GameRecord::new(42, "Broken").with_rating(f64::INFINITY);
        assert_eq!(card(&record, true).rating, "N/A");
    }

    #[test]
    fn test_card_fields() {
        let record = GameRecord::new(7, "Hades")
            .with_rating(4.44)
            .with_released("2020-09-17")
            .with_genres(["Action", "RPG"])
            .with_platforms(["PC", "Nintendo Switch"]);

        let card = card(&record, true);
        assert_eq!(card.title, "Hades");
        assert_eq!(card.genre, "Action");
        assert_eq!(card.year, "2020");
        assert_eq!(card.platform, "PC");
        assert_eq!(card.rating, "4.4");
        assert_eq!(card.favorite_label(), "Remove from favorites");
    }

    #[test]
    fn test_details() {
        let mut record = GameRecord::new(GameId::from("abc"), "Celeste")
            .with_released("2018-01-25")
            .with_genres(["Platformer", "Indie"])
            .with_platforms(["PC", "Switch"]);
        record.background_image = Some("https://img.example/celeste.jpg".to_string());

        let details = details(&record, false, Some(3));
        assert_eq!(details.id, "abc");
        assert_eq!(details.genres, "Platformer, Indie");
        assert_eq!(details.platforms, "PC, Switch");
        assert_eq!(details.developers, "Unknown");
        assert_eq!(details.publishers, "Unknown");
        assert_eq!(details.release_date, "25/01/2018");
        assert_eq!(details.description, "No description available.");
        assert_eq!(details.image, "https://img.example/celeste.jpg");
        assert_eq!(details.stars, [true, true, true, false, false]);
        assert_eq!(details.website, None);
    }

    #[test]
    fn test_details_placeholder_and_unrated() {
        let details = details(&GameRecord::new(1, "Nothing"), false, None);
        assert_eq!(details.image, DETAIL_PLACEHOLDER_IMAGE);
        assert_eq!(details.release_date, "N/A");
        assert_eq!(details.stars, [false; 5]);
    }

    #[test]
    fn test_release_parsing() {
        assert_eq!(release_date(Some("2013-09-17T00:00:00Z")), "17/09/2013");
        assert_eq!(release_year(Some("not a date")), "N/A");
        assert_eq!(release_year(None), "N/A");
    }

    #[test]
    fn test_empty_state() {
        assert_eq!(empty_state(false), ("No games found.", None));
        assert_eq!(
            empty_state(true),
            ("No games found.", Some("Try modifying your filters or search."))
        );
    }

    #[test]
    fn test_pagination_label() {
        let mut page = CatalogPage {
            records: Vec::new(),
            current_page: 1,
            total_pages: 0,
            total_count: 0,
            filters_active: false,
            loading: false,
            error: None,
        };
        assert_eq!(pagination_label(&page), "Page 1 / 1 (0 games)");

        page.current_page = 2;
        page.total_pages = 4;
        page.total_count = 100;
        assert_eq!(pagination_label(&page), "Page 2 / 4 (100 games)");
    }

    #[test]
    fn test_rating_confirmation() {
        assert_eq!(
            rating_confirmation(4),
            "Thank you! You rated this game 4/5 stars."
        );
    }
}
