use std::path::Path;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::{
    app::AppId,
    cli::{Cli, Command},
    feed::Feed,
    fetch::Client,
    review::Review,
    store::Store,
};

mod app;
mod cli;
mod error;
mod feed;
mod fetch;
mod lang;
mod review;
mod store;
#[cfg(test)]
mod testutil;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Collect {
            app_url,
            countries,
            max,
            dir,
            feed_host,
        } => collect(&app_url, &countries, max, &dir, &feed_host),
        Command::Show { app_url, tail, dir } => show(&app_url, tail, &dir),
    }
}

fn collect(
    app_url: &str,
    countries: &[String],
    max: Option<usize>,
    dir: &Path,
    feed_host: &str,
) -> anyhow::Result<()> {
    let countries = cli::normalize_countries(countries);
    let app_id = AppId::parse(app_url)?;

    let client = Client::new();
    let feed = Feed::with_host(&client, feed_host);

    let bar = ProgressBar::new(countries.len() as u64)
        .with_style(ProgressStyle::with_template("{bar:24} {pos}/{len} {msg}")?);

    // All countries must collect cleanly before anything touches the store:
    // a failed run persists nothing.
    let mut collected = Vec::new();
    for country in &countries {
        bar.set_message(country.clone());
        match feed.collect(&app_id, country, max) {
            Ok(mut reviews) => collected.append(&mut reviews),
            Err(err) => {
                bar.finish_and_clear();
                eprintln!("{} {err}", "✗".red());
                return Err(err.into());
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    let store = Store::open(dir, &app_id);
    let existing = store.load()?;
    let before = existing.len();
    let corpus = Store::merge(existing, collected);
    store.persist(&corpus)?;

    eprintln!(
        "{} {} reviews in store ({} new)",
        "✓".green(),
        corpus.len(),
        corpus.len() - before
    );
    println!("{}", store.path().display());
    Ok(())
}

fn show(app_url: &str, tail: usize, dir: &Path) -> anyhow::Result<()> {
    let app_id = AppId::parse(app_url)?;
    let corpus = Store::open(dir, &app_id).load()?;

    let skip = corpus.len().saturating_sub(tail);
    for review in &corpus[skip..] {
        println!("{}", format_row(review));
    }
    Ok(())
}

fn format_row(review: &Review) -> String {
    let rating = review.rating.map(|r| r.to_string()).unwrap_or_default();
    format!(
        "{}\t{}\t{}\t{}\t{}",
        review.date, review.country, rating, review.author, review.title
    )
}
