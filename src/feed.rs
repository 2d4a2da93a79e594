use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Value;

use crate::{app::AppId, error::Error, fetch::Client, review::Review};

/// Production feed host. Tests point [`Feed::with_host`] at a local fixture.
pub const FEED_HOST: &str = "https://itunes.apple.com";

/// Hard page cap per country; the feed itself rarely serves more.
pub const MAX_PAGES: u32 = 10;

// Country codes come straight from user input and land in a URL path
// segment, so encode anything that would break the path.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

/// Paginated reader of the customer-reviews feed.
pub struct Feed<'a> {
    client: &'a Client,
    host: String,
}

impl<'a> Feed<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self::with_host(client, FEED_HOST)
    }

    pub fn with_host(client: &'a Client, host: &str) -> Self {
        Self {
            client,
            host: host.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, app_id: &AppId, country: &str, page: u32) -> String {
        let country = utf8_percent_encode(country, PATH_SEGMENT_ENCODE_SET);
        if page == 1 {
            format!(
                "{}/{country}/rss/customerreviews/id={}/sortBy=mostRecent/json",
                self.host, app_id
            )
        } else {
            format!(
                "{}/{country}/rss/customerreviews/page={page}/id={}/sortBy=mostRecent/json",
                self.host, app_id
            )
        }
    }

    /// Walk the feed pages for one country and normalize every raw entry.
    ///
    /// Stops at [`MAX_PAGES`], at the exhaustion signal (a page whose entry
    /// list is missing, not an array, or holds nothing beyond the feed's
    /// self-description), or once `max_results` entries have been processed;
    /// the cap may cut a page short. Fetch failures propagate; there is no
    /// per-page skip.
    pub fn collect(
        &self,
        app_id: &AppId,
        country: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<Review>, Error> {
        let mut reviews = Vec::new();
        let mut processed = 0usize;

        for page in 1..=MAX_PAGES {
            let url = self.page_url(app_id, country, page);
            let data = self.client.get_json(&url)?;

            let entries = data.pointer("/feed/entry").and_then(Value::as_array);
            // The first element is always the feed's self-description, never
            // a review, so a list of one is as empty as no list at all.
            let Some(entries) = entries.filter(|e| e.len() > 1) else {
                break;
            };

            for entry in &entries[1..] {
                processed += 1;
                if max_results.is_some_and(|cap| processed > cap) {
                    return Ok(reviews);
                }
                reviews.push(Review::from_entry(entry, country, app_id));
            }
        }

        Ok(reviews)
    }
}
