//! Search, filter and sort derivation over a record set

use crate::platform::{PlatformFamily, fold_platform_family};
use crate::record::GameRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Ordering applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSort {
    /// Keep fetch order
    #[default]
    None,
    Ascending,
    Descending,
}

impl RatingSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingSort::None => "none",
            RatingSort::Ascending => "asc",
            RatingSort::Descending => "desc",
        }
    }
}

impl FromStr for RatingSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(RatingSort::None),
            "asc" | "ascending" => Ok(RatingSort::Ascending),
            "desc" | "descending" => Ok(RatingSort::Descending),
            other => Err(format!("unknown rating sort: {}", other)),
        }
    }
}

/// Compound criteria applied by [`derive`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Lowercased, trimmed name substring; empty keeps all
    pub search_term: String,
    /// Exact genre name; `None` means "all"
    pub genre: Option<String>,
    /// Platform family; `None` means "all"
    pub platform: Option<PlatformFamily>,
    pub rating_sort: RatingSort,
}

impl FilterCriteria {
    /// Normalize and set the search term
    pub fn set_search(&mut self, term: &str) {
        self.search_term = normalize_search_term(term);
    }

    /// Whether any narrowing criterion is set (sorting alone does not count)
    pub fn is_active(&self) -> bool {
        !self.search_term.is_empty() || self.genre.is_some() || self.platform.is_some()
    }
}

/// Lowercase and trim a raw search input
pub fn normalize_search_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Apply search, genre, platform and rating sort to `records`.
///
/// Pure: the output depends only on the inputs. The sort is stable, so ties
/// keep fetch order.
pub fn derive(records: &[GameRecord], criteria: &FilterCriteria) -> Vec<GameRecord> {
    let mut filtered: Vec<GameRecord> = records
        .iter()
        .filter(|record| matches_search(record, &criteria.search_term))
        .filter(|record| matches_genre(record, criteria.genre.as_deref()))
        .filter(|record| matches_platform(record, criteria.platform.as_ref()))
        .cloned()
        .collect();

    match criteria.rating_sort {
        RatingSort::None => {}
        RatingSort::Ascending => {
            filtered.sort_by(|a, b| a.rating_or_zero().total_cmp(&b.rating_or_zero()))
        }
        RatingSort::Descending => {
            filtered.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()))
        }
    }

    tracing::debug!(
        "Derived {} of {} records (search={:?}, genre={:?}, platform={:?}, sort={})",
        filtered.len(),
        records.len(),
        criteria.search_term,
        criteria.genre,
        criteria.platform.as_ref().map(PlatformFamily::as_str),
        criteria.rating_sort.as_str()
    );

    filtered
}

fn matches_search(record: &GameRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    record
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(term))
}

fn matches_genre(record: &GameRecord, genre: Option<&str>) -> bool {
    match genre {
        None => true,
        Some(genre) => record.genre_names().any(|name| name == genre),
    }
}

fn matches_platform(record: &GameRecord, family: Option<&PlatformFamily>) -> bool {
    match family {
        None => true,
        Some(family) => record.platform_names().any(|name| family.matches(name)),
    }
}

/// Distinct genres and platform families seen so far.
///
/// Grows incrementally: each batch is absorbed on its own, earlier records
/// are never rescanned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub genres: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the genres and folded platform families of `records`
    pub fn absorb(&mut self, records: &[GameRecord]) {
        for record in records {
            self.genres
                .extend(record.genre_names().map(str::to_string));
            self.platforms.extend(
                record
                    .platform_names()
                    .map(|name| fold_platform_family(name).as_str().to_string()),
            );
        }
    }
}
