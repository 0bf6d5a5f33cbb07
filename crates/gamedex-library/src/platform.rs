//! Platform family folding
//!
//! Raw platform names ("PlayStation 5", "Xbox Series S/X", "Nintendo Switch",
//! "PC") are grouped into a handful of families for filtering.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Normalized platform category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlatformFamily {
    Pc,
    PlayStation,
    Xbox,
    Switch,
    /// Uncategorized platform, kept under its literal name
    Other(String),
}

/// Fold a raw platform name into its family.
///
/// Rules are checked in order: PlayStation, Xbox, Switch, PC. Matching is
/// case-sensitive.
pub fn fold_platform_family(name: &str) -> PlatformFamily {
    if PlatformFamily::PlayStation.matches(name) {
        PlatformFamily::PlayStation
    } else if PlatformFamily::Xbox.matches(name) {
        PlatformFamily::Xbox
    } else if PlatformFamily::Switch.matches(name) {
        PlatformFamily::Switch
    } else if PlatformFamily::Pc.matches(name) {
        PlatformFamily::Pc
    } else {
        PlatformFamily::Other(name.to_string())
    }
}

impl PlatformFamily {
    /// Label shown in filter options
    pub fn as_str(&self) -> &str {
        match self {
            PlatformFamily::Pc => "PC",
            PlatformFamily::PlayStation => "PlayStation",
            PlatformFamily::Xbox => "Xbox",
            PlatformFamily::Switch => "Switch",
            PlatformFamily::Other(name) => name,
        }
    }

    /// Whether a raw platform name belongs to this family when filtering.
    ///
    /// Each family tests its own substrings independently of the folding
    /// order, so "PlayStation PC" matches both `PlayStation` and `Pc`.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            PlatformFamily::PlayStation => name.contains("PlayStation"),
            PlatformFamily::Xbox => name.contains("Xbox"),
            PlatformFamily::Switch => name.contains("Switch") || name.contains("Nintendo Switch"),
            PlatformFamily::Pc => name == "PC" || name.contains("PC") || name == "Windows",
            PlatformFamily::Other(literal) => name == literal,
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformFamily {
    type Err = Infallible;

    /// Parse a filter label. Unknown labels become `Other`.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Ok(match label {
            "PC" => PlatformFamily::Pc,
            "PlayStation" => PlatformFamily::PlayStation,
            "Xbox" => PlatformFamily::Xbox,
            "Switch" => PlatformFamily::Switch,
            other => PlatformFamily::Other(other.to_string()),
        })
    }
}
