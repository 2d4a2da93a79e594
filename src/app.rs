use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;

/// Numeric identifier of one app, as it appears in App Store links
/// (`https://apps.apple.com/us/app/some-name/id1234567890`).
///
/// The digits are kept as opaque text: leading zeros are preserved and the
/// value is never treated as a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppId(String);

impl AppId {
    /// Find an app id anywhere in a user-supplied link.
    ///
    /// Accepts anything containing `id<digits>`, not just well-formed store
    /// URLs, so pasted text with surrounding noise still works.
    pub fn parse(app_url: &str) -> Result<Self, Error> {
        static APP_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"id(\d+)").unwrap());

        let caps = APP_ID_RE
            .captures(app_url)
            .ok_or_else(|| Error::InvalidInput(app_url.to_string()))?;
        Ok(AppId(caps[1].to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical app-page link for one storefront. Pure composition; the
    /// page is not checked for existence. Used when a feed entry carries no
    /// per-review link of its own.
    pub fn page_link(&self, country: &str) -> String {
        format!("https://apps.apple.com/{country}/app/id{}", self.0)
    }

    /// Name of the per-app CSV store.
    pub fn store_filename(&self) -> String {
        format!("appstore_reviews_{}.csv", self.0)
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
