//! feed_app: pages through a remote photo feed and prints what arrives.
//!
//! Usage: `feed_app [config.ron]`
mod config;
mod logging;
mod photo;

use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{Context, Result};
use feed_engine::{FeedFetcher, FetchOutcome};
use feed_logging::{feed_debug, feed_info};

use crate::config::AppConfig;
use crate::photo::{Photo, PhotoParser};

const PAGE_TIMEOUT: Duration = Duration::from_secs(120);

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => config::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    }
    .with_env_overrides(|name| std::env::var(name).ok());

    logging::initialize(config.log, config.log_level());
    if config.api_key.is_empty() {
        feed_info!("No API key configured; requests are sent without credentials");
    }

    let parser = Arc::new(PhotoParser::new(config.image_size));
    let fetcher = FeedFetcher::with_settings(config.endpoint(), config.transport_settings(), parser)
        .context("starting feed fetcher")?;

    let (tx, rx) = mpsc::channel::<FetchOutcome<Photo>>();
    let sender = tx.clone();
    fetcher.refresh_feed(config.page_size, move |outcome| {
        let _ = sender.send(outcome);
    });

    let mut pages = 0u32;
    loop {
        let photos = rx
            .recv_timeout(PAGE_TIMEOUT)
            .context("waiting for page")?
            .context("fetching page")?;
        if photos.is_empty() {
            break;
        }

        pages += 1;
        println!(
            "page {pages}: +{} photos, {} in feed",
            photos.len(),
            fetcher.count()
        );
        for photo in &photos {
            feed_debug!(
                "{} {}x{} -> {} {}",
                photo.id,
                photo.width,
                photo.height,
                photo.display_height,
                photo.url
            );
        }

        if config.max_pages.is_some_and(|max| pages >= max) {
            break;
        }
        let sender = tx.clone();
        fetcher.request_next_page(config.page_size, move |outcome| {
            let _ = sender.send(outcome);
        });
    }

    println!("{} photos loaded over {pages} pages", fetcher.count());
    Ok(())
}
