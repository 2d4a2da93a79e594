use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{app::AppId, lang};

/// One customer review, normalized. Field order here is the persisted
/// column order; the CSV header is derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub review_id: String,
    pub date: String,
    pub rating: Option<u32>,
    pub title: String,
    pub text: String,
    pub author: String,
    pub country: String,
    pub language: String,
    pub link: String,
}

/// Deterministic fallback identifier for entries the feed ships without an
/// id. SHA-256 over the six fields joined with `|` in fixed order, hex
/// encoded. Identical inputs must hash identically across runs and
/// platforms: this digest is what dedup keys on.
pub fn stable_id(
    country: &str,
    author: &str,
    date: &str,
    rating: &str,
    title: &str,
    text: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{country}|{author}|{date}|{rating}|{title}|{text}").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert a raw date representation to ISO-8601 in UTC, best-effort.
///
/// Tries RFC 3339, RFC 2822, then two common date layouts assumed UTC. On
/// failure the raw value passes through unchanged, so the `date` column may
/// carry non-ISO strings and consumers must tolerate that.
pub fn normalize_timestamp(raw: &str) -> String {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc).to_rfc3339();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return dt.with_timezone(&Utc).to_rfc3339();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc().to_rfc3339();
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_time(NaiveTime::MIN).and_utc().to_rfc3339();
    }
    raw.to_string()
}

fn label(entry: &Value, pointer: &str) -> String {
    entry
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

impl Review {
    /// Normalize one raw feed entry into a record.
    ///
    /// Every step is total. Missing id and link fall back to derived
    /// values, the rating is kept only when the raw label is all digits,
    /// and language detection runs over title and body together.
    pub fn from_entry(entry: &Value, country: &str, app_id: &AppId) -> Review {
        let title = label(entry, "/title/label");
        let text = label(entry, "/content/label");
        let author = label(entry, "/author/name/label");
        let rating_raw = label(entry, "/im:rating/label");
        let date = normalize_timestamp(&label(entry, "/updated/label"));

        let mut review_id = label(entry, "/id/label").trim().to_string();
        if review_id.is_empty() {
            review_id = stable_id(country, &author, &date, &rating_raw, &title, &text);
        }

        let mut link = label(entry, "/link/attributes/href").trim().to_string();
        if link.is_empty() {
            link = app_id.page_link(country);
        }

        let rating = if !rating_raw.is_empty() && rating_raw.chars().all(|c| c.is_ascii_digit()) {
            rating_raw.parse().ok()
        } else {
            None
        };

        let language = lang::detect(&format!("{title}\n{text}"));

        Review {
            review_id,
            date,
            rating,
            title,
            text,
            author,
            country: country.to_string(),
            language,
            link,
        }
    }
}
