//! Core types for search result records and provider identification.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Highest priority rank a provider may assign.
pub const TOP_RANK: i32 = 0;

/// Lowest priority rank a provider may assign.
pub const BOTTOM_RANK: i32 = 9;

/// How a result is presented. The presentation layer dispatches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    /// Opens a settings screen when selected.
    Intent,
    /// Carries an inline toggle that can be flipped without navigating.
    InlineSwitch,
    /// A previously submitted query.
    SavedQuery,
}

impl ViewType {
    /// Returns the raw payload code used by presentation layers.
    pub fn code(&self) -> i32 {
        match self {
            Self::Intent => 0,
            Self::InlineSwitch => 2,
            Self::SavedQuery => 4,
        }
    }

    /// Maps a raw payload code back to a view type.
    ///
    /// Returns `None` for codes with no renderer; callers decide how to
    /// surface that.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Intent),
            2 => Some(Self::InlineSwitch),
            4 => Some(Self::SavedQuery),
            _ => None,
        }
    }

    /// Returns a short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::InlineSwitch => "inline_switch",
            Self::SavedQuery => "saved_query",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Process-unique key identifying a result provider.
///
/// Two deliveries under the same key come from the same logical provider,
/// and the later one replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(Cow<'static, str>);

impl ProviderId {
    /// The local settings database provider.
    pub const DATABASE: ProviderId = ProviderId(Cow::Borrowed("search.DatabaseResultProvider"));

    /// The installed-application provider.
    pub const INSTALLED_APPS: ProviderId =
        ProviderId(Cow::Borrowed("search.InstalledAppResultProvider"));

    /// Creates a provider id from any string key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ProviderId {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

/// A single search result delivered by a provider.
///
/// Equality compares every field; two records with the same `stable_id`
/// but different content are "the same item, changed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Identity that survives across updates.
    pub stable_id: i64,
    /// Priority, lower is better. Nominally within `TOP_RANK..=BOTTOM_RANK`.
    pub rank: i32,
    /// Rendering discriminant.
    pub view_type: ViewType,
    /// Primary display text.
    pub title: String,
    /// Secondary display text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Navigation path leading to the result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<String>,
}

impl ResultRecord {
    /// Creates a record with no summary or breadcrumbs.
    pub fn new(stable_id: i64, rank: i32, view_type: ViewType, title: impl Into<String>) -> Self {
        Self {
            stable_id,
            rank,
            view_type,
            title: title.into(),
            summary: None,
            breadcrumbs: Vec::new(),
        }
    }

    /// Sets the summary line.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the breadcrumb path.
    pub fn with_breadcrumbs<I, S>(mut self, breadcrumbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breadcrumbs = breadcrumbs.into_iter().map(Into::into).collect();
        self
    }

    /// Total ordering key: rank first, stable id breaks ties.
    pub fn sort_key(&self) -> (i32, i64) {
        (self.rank, self.stable_id)
    }

    /// Compares two records by [`sort_key`](Self::sort_key).
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
