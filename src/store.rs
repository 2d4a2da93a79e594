use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{app::AppId, review::Review};

/// On-disk CSV corpus for one app id.
///
/// The dialect is fixed: UTF-8, header row, every field quoted, backslash
/// as the escape character, `\n` terminator. Every run rewrites the whole
/// file; there is no in-place append.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn open(dir: &Path, app_id: &AppId) -> Self {
        Self {
            path: dir.join(app_id.store_filename()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the existing corpus. A missing file is an empty corpus, not an
    /// error. Rows missing some of the fixed columns come back with empty
    /// fields and regain the full column set on the next persist.
    pub fn load(&self) -> anyhow::Result<Vec<Review>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("opening {}", self.path.display()));
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .double_quote(false)
            .escape(Some(b'\\'))
            .from_reader(file);

        let mut corpus = Vec::new();
        for row in reader.deserialize() {
            let review: Review =
                row.with_context(|| format!("reading {}", self.path.display()))?;
            corpus.push(review);
        }
        Ok(corpus)
    }

    /// Union the existing corpus with newly collected records.
    ///
    /// Existing rows come first and win on `review_id` conflict; a new
    /// record also loses to an earlier new record with the same id. The
    /// final pass re-dedups the whole corpus because prior runs or manual
    /// edits may have left duplicates in the store itself.
    pub fn merge(existing: Vec<Review>, new: Vec<Review>) -> Vec<Review> {
        let mut seen: HashSet<String> =
            existing.iter().map(|r| r.review_id.clone()).collect();

        let mut corpus = existing;
        for review in new {
            if seen.insert(review.review_id.clone()) {
                corpus.push(review);
            }
        }

        let mut kept = HashSet::new();
        corpus.retain(|r| kept.insert(r.review_id.clone()));
        corpus
    }

    /// Replace the store with the given corpus.
    ///
    /// Writes a sibling temp file and renames it over the store path, so a
    /// crash mid-write never leaves a truncated corpus behind. Concurrent
    /// writers for the same app id still race whole-file: last writer wins.
    pub fn persist(&self, corpus: &[Review]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("csv.tmp");
        {
            let file = fs::File::create(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            let mut writer = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Always)
                .double_quote(false)
                .escape(b'\\')
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(file);
            for review in corpus {
                writer
                    .serialize(review)
                    .with_context(|| format!("writing {}", tmp.display()))?;
            }
            writer
                .flush()
                .with_context(|| format!("flushing {}", tmp.display()))?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, text: &str) -> Review {
        Review {
            review_id: id.to_string(),
            date: "2024-05-01T14:00:00+00:00".to_string(),
            rating: Some(5),
            title: "Great app".to_string(),
            text: text.to_string(),
            author: "alice".to_string(),
            country: "us".to_string(),
            language: "eng".to_string(),
            link: format!("https://example.com/{id}"),
        }
    }

    fn store(dir: &Path) -> Store {
        Store::open(dir, &AppId::parse("id42").unwrap())
    }

    #[test]
    fn missing_store_loads_as_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).load().unwrap().is_empty());
    }

    #[test]
    fn persist_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());

        let mut rows = vec![review("a", "first"), review("b", "second")];
        rows[1].rating = None;
        rows[1].text = "tricky \"quoted\", text\nwith a newline".to_string();

        s.persist(&rows).unwrap();
        let loaded = s.load().unwrap();
        assert_eq!(loaded, rows);
        // No temp file left behind.
        assert!(!dir.path().join("appstore_reviews_42.csv.tmp").exists());
    }

    #[test]
    fn store_dialect_quotes_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        s.persist(&[review("a", "first")]).unwrap();

        let raw = fs::read_to_string(s.path()).unwrap();
        let mut lines = raw.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"review_id\",\"date\",\"rating\",\"title\",\"text\",\"author\",\"country\",\"language\",\"link\""
        );
        assert!(lines.next().unwrap().starts_with("\"a\",\"2024-05-01T14:00:00+00:00\",\"5\","));
    }

    #[test]
    fn merge_keeps_existing_copy_on_conflict() {
        let existing = vec![review("a", "old a"), review("b", "old b")];
        let new = vec![review("b", "new b"), review("c", "new c")];

        let corpus = Store::merge(existing, new);
        let ids: Vec<&str> = corpus.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(corpus[1].text, "old b");
    }

    #[test]
    fn merge_dedups_within_the_new_batch() {
        // The same review seen under two storefronts collapses to the
        // first-merged copy.
        let mut ru = review("x", "same review");
        ru.country = "ru".to_string();
        let us = review("x", "same review");

        let corpus = Store::merge(Vec::new(), vec![us, ru]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].country, "us");
    }

    #[test]
    fn merge_drops_pre_existing_duplicates() {
        let existing = vec![review("a", "first copy"), review("a", "stray duplicate")];
        let corpus = Store::merge(existing, Vec::new());
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].text, "first copy");
    }

    #[test]
    fn merge_then_persist_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());

        let batch = vec![review("a", "one"), review("b", "two")];
        let corpus = Store::merge(s.load().unwrap(), batch.clone());
        s.persist(&corpus).unwrap();
        let first = fs::read_to_string(s.path()).unwrap();

        let corpus = Store::merge(s.load().unwrap(), batch);
        s.persist(&corpus).unwrap();
        let second = fs::read_to_string(s.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(s.load().unwrap().len(), 2);
    }

    #[test]
    fn load_backfills_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());

        // A store written before the language column existed.
        fs::write(
            s.path(),
            "\"review_id\",\"date\",\"rating\",\"title\",\"text\",\"author\",\"country\",\"link\"\n\
             \"a\",\"2024-05-01\",\"4\",\"t\",\"x\",\"bob\",\"de\",\"https://example.com/a\"\n",
        )
        .unwrap();

        let loaded = s.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].language, "");
        assert_eq!(loaded[0].rating, Some(4));

        // The next persist restores the full fixed column set.
        s.persist(&loaded).unwrap();
        let raw = fs::read_to_string(s.path()).unwrap();
        assert!(raw.lines().next().unwrap().contains("\"language\""));
    }
}
