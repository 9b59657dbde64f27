use crate::{error::ScrapeError, util::try_sel};
use anyhow::Result;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::trace;
use url::Url;

/// Anything that can hand us the rendered HTML of a page
pub trait PageSource {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Load `url` until something matching `css` is present, and return the page body.
/// Gives up with `ScrapeError::Timeout` once `bound` has passed.
pub async fn wait_for<S: PageSource>(
    source: &S,
    url: &Url,
    css: &str,
    bound: Duration,
    poll: Duration,
) -> Result<String> {
    let selector = try_sel(css)?;
    let start = Instant::now();

    loop {
        let remaining = bound.saturating_sub(start.elapsed());
        let body = match tokio::time::timeout(remaining, source.fetch(url)).await {
            Ok(res) => res?,
            Err(_) => break,
        };
        if has_match(&body, &selector) {
            trace!(css, elapsed = ?start.elapsed(), "Found element");
            return Ok(body);
        }
        if start.elapsed() + poll >= bound {
            break;
        }
        trace!(css, "Element not present yet, polling again...");
        tokio::time::sleep(poll).await;
    }

    Err(ScrapeError::Timeout {
        what: css.into(),
        after: bound,
    }
    .into())
}

fn has_match(body: &str, selector: &Selector) -> bool {
    Html::parse_document(body).select(selector).next().is_some()
}
