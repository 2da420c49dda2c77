//! Post visibility rules and publication dates

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use super::ValidationError;

/// Formats accepted for `pub_date` besides RFC 3339; read as UTC.
/// The first is what an HTML `datetime-local` input submits.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// The fields of a post that decide who may read it.
#[derive(Debug, Clone, Copy)]
pub struct Publication {
    pub author_id: Uuid,
    pub is_published: bool,
    pub pub_date: DateTime<Utc>,
    /// `None` when the post has no category
    pub category_published: Option<bool>,
}

impl Publication {
    /// Readable by anyone: published, due, and filed under a published category.
    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.pub_date <= now && self.category_published == Some(true)
    }

    /// Readable by `viewer`: public, or the viewer wrote it.
    pub fn is_visible_to(&self, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
        self.is_public(now) || viewer == Some(self.author_id)
    }
}

/// Parse a submitted publication date. Blank input means "now".
pub fn parse_pub_date(
    input: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ValidationError> {
    let raw = match input.map(str::trim) {
        None | Some("") => return Ok(now),
        Some(raw) => raw,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or(ValidationError::InvalidFormat {
            field: "pub_date",
            reason: "enter a valid date/time",
        })
}
