//! Non-interactive subcommands

use std::path::Path;

use anyhow::{Context, Result, bail};
use gamedex_config::GamedexConfig;
use gamedex_engine::render::{self, GameCard, GameDetails};
use gamedex_engine::{CatalogEngine, CatalogPage};
use gamedex_fetch::ListingSource;
use gamedex_library::{GameId, GameRecord};

use crate::cli_types::FilterArgs;

/// Apply search, filters and sort in the same order the browser does
pub(crate) fn apply_filters<L: ListingSource>(
    engine: &CatalogEngine<L>,
    filters: &FilterArgs,
) -> Result<CatalogPage> {
    let mut page = engine.current_page();
    if let Some(term) = &filters.search {
        page = engine.search(term);
    }
    if let Some(genre) = &filters.genre {
        page = engine.set_genre_filter(genre)?;
    }
    if let Some(platform) = &filters.platform {
        page = engine.set_platform_filter(platform)?;
    }
    if let Some(sort) = filters.sort {
        page = engine.set_rating_sort(sort);
    }
    Ok(page)
}

pub(crate) async fn browse<L: ListingSource>(
    engine: &CatalogEngine<L>,
    filters: &FilterArgs,
    page_number: usize,
) -> Result<()> {
    engine.load().await.context("Failed to load the catalog")?;
    let mut page = apply_filters(engine, filters)?;

    while page.current_page < page_number && page.has_next() {
        page = engine.change_page(1);
    }
    if page.current_page != page_number.max(1) {
        tracing::warn!(
            "Page {} is out of range, showing page {}",
            page_number,
            page.current_page
        );
    }

    print_page(engine, &page);
    Ok(())
}

pub(crate) fn favorites<L: ListingSource>(engine: &CatalogEngine<L>) {
    let favorites = engine.favorites();
    if favorites.is_empty() {
        println!("{}", render::empty_favorites());
        return;
    }

    for card in engine.cards(&favorites) {
        println!("{}", card_line(&card));
    }
    println!();
    println!("{} favorites", favorites.len());
}

pub(crate) async fn toggle_favorite<L: ListingSource>(
    engine: &CatalogEngine<L>,
    id: &str,
) -> Result<()> {
    let record = find_or_load(engine, id).await?;
    engine.toggle_favorite(&record);

    let title = render::card(&record, false).title;
    if engine.is_favorite(&record.id) {
        println!("Added {} to favorites", title);
    } else {
        println!("Removed {} from favorites", title);
    }
    Ok(())
}

pub(crate) fn rate<L: ListingSource>(engine: &CatalogEngine<L>, id: &str, stars: i64) -> Result<()> {
    let stars = engine.set_rating(&GameId::from(id), stars)?;
    println!("{}", render::rating_confirmation(stars));
    Ok(())
}

pub(crate) async fn show<L: ListingSource>(engine: &CatalogEngine<L>, id: &str) -> Result<()> {
    let record = find_or_load(engine, id).await?;
    print_details(&engine.details(&record));
    Ok(())
}

pub(crate) async fn filters<L: ListingSource>(engine: &CatalogEngine<L>) -> Result<()> {
    if let Err(e) = engine.load().await {
        tracing::warn!("Showing configured filters only: {}", e);
    }

    let options = engine.filter_options();
    println!("Genres:    all, {}", options.genres.join(", "));
    println!("Platforms: all, {}", options.platforms.join(", "));

    if !options.discovered.genres.is_empty() {
        let discovered: Vec<_> = options.discovered.genres.iter().map(String::as_str).collect();
        println!();
        println!("Genres in catalog:    {}", discovered.join(", "));
    }
    if !options.discovered.platforms.is_empty() {
        let discovered: Vec<_> = options
            .discovered
            .platforms
            .iter()
            .map(String::as_str)
            .collect();
        println!("Platforms in catalog: {}", discovered.join(", "));
    }
    Ok(())
}

pub(crate) fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    GamedexConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Favorites are checked first so known games resolve without the network
async fn find_or_load<L: ListingSource>(engine: &CatalogEngine<L>, id: &str) -> Result<GameRecord> {
    let id = GameId::from(id);
    if let Some(record) = engine.find(&id) {
        return Ok(record);
    }

    engine.load().await.context("Failed to load the catalog")?;
    engine
        .find(&id)
        .with_context(|| format!("No game with id {} in the loaded catalog", id))
}

fn print_page<L: ListingSource>(engine: &CatalogEngine<L>, page: &CatalogPage) {
    if page.is_empty() {
        let (headline, hint) = render::empty_state(page.filters_active);
        println!("{}", headline);
        if let Some(hint) = hint {
            println!("{}", hint);
        }
    } else {
        for card in engine.cards(&page.records) {
            println!("{}", card_line(&card));
        }
    }

    println!();
    println!("{}", render::pagination_label(page));
}

pub(crate) fn card_line(card: &GameCard) -> String {
    format!(
        "{} {:>6}  {:<40} {:<12} {:<14} {:>4}  {}",
        if card.is_favorite { "★" } else { " " },
        card.id,
        truncate(&card.title, 40),
        truncate(&card.genre, 12),
        truncate(&card.platform, 14),
        card.year,
        card.rating
    )
}

fn print_details(details: &GameDetails) {
    println!("{} (#{})", details.title, details.id);
    println!();
    println!("Genres:     {}", details.genres);
    println!("Platforms:  {}", details.platforms);
    println!("Developers: {}", details.developers);
    println!("Publishers: {}", details.publishers);
    println!("Released:   {}", details.release_date);
    println!("Rating:     {}", details.rating);
    println!("Your stars: {}", stars_line(&details.stars));
    if let Some(website) = &details.website {
        println!("Website:    {}", website);
    }
    println!("Image:      {}", details.image);
    println!();
    println!("{}", details.description);
    println!();
    println!("[{}]", details.favorite_label());
}

pub(crate) fn stars_line(stars: &[bool]) -> String {
    stars
        .iter()
        .map(|&filled| if filled { '★' } else { '☆' })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
