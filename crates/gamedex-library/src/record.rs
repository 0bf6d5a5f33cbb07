//! Game records as served by the listing API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Game identifier. The API uses integers, but string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameId {
    Number(i64),
    Text(String),
}

impl GameId {
    /// Key used for persisted lookups (`"42"` for both `42` and `"42"`)
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameId::Number(n) => write!(f, "{}", n),
            GameId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for GameId {
    fn from(id: i64) -> Self {
        GameId::Number(id)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(n) => GameId::Number(n),
            Err(_) => GameId::Text(id.to_string()),
        }
    }
}

/// `{ "name": ... }` entries used for genres, developers and publishers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    #[serde(default)]
    pub name: Option<String>,
}

impl NamedEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// `{ "platform": { "name": ... } }` entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformEntry {
    #[serde(default)]
    pub platform: Option<NamedEntity>,
}

impl PlatformEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            platform: Some(NamedEntity::new(name)),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.platform.as_ref()?.name.as_deref()
    }
}

/// A game as returned by the listing API.
///
/// Every field but `id` may be missing or `null`. Fields the client does not
/// model are kept in `extra` so a favorite snapshot stores the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Release date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,

    /// Aggregate rating, 0.0 - 5.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub genres: Vec<NamedEntity>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub platforms: Vec<PlatformEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub developers: Vec<NamedEntity>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub publishers: Vec<NamedEntity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl GameRecord {
    /// Create a record with only an id and a name
    pub fn new(id: impl Into<GameId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            released: None,
            rating: None,
            background_image: None,
            genres: Vec::new(),
            platforms: Vec::new(),
            description: None,
            developers: Vec::new(),
            publishers: Vec::new(),
            website: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_released(mut self, released: impl Into<String>) -> Self {
        self.released = Some(released.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(NamedEntity::new).collect();
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(PlatformEntry::new).collect();
        self
    }

    /// Persisted lookup key for this record
    pub fn key(&self) -> String {
        self.id.key()
    }

    /// Rating used for sorting: missing or non-finite counts as 0
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.filter(|r| r.is_finite()).unwrap_or(0.0)
    }

    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().filter_map(|g| g.name.as_deref())
    }

    pub fn platform_names(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().filter_map(PlatformEntry::name)
    }

    pub fn developer_names(&self) -> impl Iterator<Item = &str> {
        self.developers.iter().filter_map(|d| d.name.as_deref())
    }

    pub fn publisher_names(&self) -> impl Iterator<Item = &str> {
        self.publishers.iter().filter_map(|p| p.name.as_deref())
    }
}
