//! Plex API response models

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Kind of library item, as reported in Plex's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
    Season,
    Episode,
    Artist,
    Album,
    Track,
    Collection,
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Name used in the `type` field and hub identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "show",
            Self::Season => "season",
            Self::Episode => "episode",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
            Self::Collection => "collection",
            Self::Other => "other",
        }
    }

    /// Numeric metadata type used by the library edit and collection endpoints
    pub fn type_id(&self) -> Option<u8> {
        match self {
            Self::Movie => Some(1),
            Self::Show => Some(2),
            Self::Season => Some(3),
            Self::Episode => Some(4),
            Self::Artist => Some(8),
            Self::Album => Some(9),
            Self::Track => Some(10),
            Self::Collection => Some(18),
            Self::Other => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the connected server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    /// Used to build `server://` item URIs
    pub machine_identifier: String,
    pub version: Option<String>,
}

/// A library section (e.g. "Movies")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySection {
    /// Section id as used in URLs
    pub key: String,
    pub title: String,
    pub kind: MediaType,
}

/// One entry of an account's watch history
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    pub title: String,
    pub rating_key: Option<String>,
    /// Opaque recency marker; history is already sorted newest first
    pub viewed_at: Option<DateTime<Utc>>,
    pub kind: MediaType,
}

/// A library item returned by search or collection listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub rating_key: String,
    pub title: String,
    pub year: Option<u32>,
    pub kind: MediaType,
}

/// A collection inside a library section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub rating_key: String,
    pub title: String,
    pub section_key: String,
    pub summary: Option<String>,
    pub child_count: Option<u32>,
}

// Internal response types for deserialization

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(rename = "MediaContainer")]
    pub media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediaContainer {
    #[serde(default)]
    pub machine_identifier: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "Metadata")]
    pub metadata: Vec<RawMetadata>,
    #[serde(default, rename = "Directory")]
    pub directory: Vec<RawDirectory>,
    #[serde(default, rename = "Hub")]
    pub hub: Vec<RawHub>,
    #[serde(default, rename = "Account")]
    pub account: Vec<RawAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMetadata {
    #[serde(default)]
    pub rating_key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<MediaType>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub child_count: Option<u32>,
    #[serde(default)]
    pub viewed_at: Option<i64>,
    #[serde(default, rename = "librarySectionID")]
    pub library_section_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDirectory {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHub {
    #[serde(default, rename = "type")]
    pub kind: Option<MediaType>,
    #[serde(default, rename = "Metadata")]
    pub metadata: Vec<RawMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAccount {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<RawDirectory> for LibrarySection {
    fn from(raw: RawDirectory) -> Self {
        Self {
            key: raw.key,
            title: raw.title,
            kind: raw.kind,
        }
    }
}

impl From<RawMetadata> for WatchEvent {
    fn from(raw: RawMetadata) -> Self {
        Self {
            title: raw.title.unwrap_or_default(),
            rating_key: raw.rating_key,
            viewed_at: raw
                .viewed_at
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            kind: raw.kind.unwrap_or(MediaType::Other),
        }
    }
}

impl RawMetadata {
    /// Items without a rating key cannot be referenced later and are dropped
    pub(crate) fn into_media_item(self) -> Option<MediaItem> {
        let rating_key = self.rating_key?;
        Some(MediaItem {
            rating_key,
            title: self.title.unwrap_or_default(),
            year: self.year,
            kind: self.kind.unwrap_or(MediaType::Other),
        })
    }

    pub(crate) fn into_collection(self, section_key: &str) -> Option<Collection> {
        let rating_key = self.rating_key?;
        let section_key = match self.library_section_id {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) => s,
            _ => section_key.to_string(),
        };
        Some(Collection {
            rating_key,
            title: self.title.unwrap_or_default(),
            section_key,
            summary: self.summary.filter(|s| !s.is_empty()),
            child_count: self.child_count,
        })
    }
}
