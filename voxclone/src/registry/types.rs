//! Voice registry record types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::path::PathBuf;

/// Default language code for voices registered without one.
pub const DEFAULT_LANGUAGE: &str = "en";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Parse an RFC 3339 timestamp, or a zone-less ISO 8601 one taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// A registered voice, stored under its id in the registry file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRecord {
    /// Display name
    pub name: String,
    /// Language code of the reference sample
    #[serde(default = "default_language")]
    pub language: String,
    /// When the voice was registered
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Reference sample used for cloning
    pub audio_path: PathBuf,
    /// Number of reference samples behind this voice
    #[serde(default)]
    pub samples_count: u32,
}

impl VoiceRecord {
    /// Create a record for a freshly uploaded single-sample voice.
    pub fn new(name: impl Into<String>, language: impl Into<String>, audio_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            created_at: Utc::now(),
            audio_path,
            samples_count: 1,
        }
    }
}

/// A record together with its id, as listed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceSummary {
    pub id: String,
    #[serde(flatten)]
    pub record: VoiceRecord,
}
