//! Windowed news fetching, normalization and cross-window deduplication.

use chrono::{Duration, Utc};
use regex::{Captures, Regex};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api_types::{ApiArticle, NewsApiResponse};
use crate::models::{Article, Window};

const SEARCH_URL: &str = "https://newsapi.org/v2/everything";
const DESCRIPTION_CAP: usize = 500;

/// Search parameters forwarded to the news API. The engine owns no
/// configuration of its own; callers pass these through.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub query: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            query: "geopolitics economy markets finance".to_string(),
            language: "en".to_string(),
            page_size: 30,
        }
    }
}

/// Outcome of a single window fetch. Only `Auth` alters control flow in the
/// fan-out; `Transient` degrades the window to an empty list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("news API rejected the key (HTTP {status})")]
    Auth { status: u16 },

    #[error("window fetch failed: {0}")]
    Transient(String),
}

/// Deterministic 16-hex dedup hash from title, source and publish time.
pub fn news_hash(title: &str, source: &str, published_at: &str) -> String {
    let raw = format!(
        "{}|{}|{}",
        title.trim(),
        source.trim(),
        published_at.trim()
    )
    .to_lowercase();
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(&digest[..8])
}

fn truncate_chars(s: &str, cap: usize) -> String {
    s.chars().take(cap).collect()
}

/// Normalize one provider article into our internal record.
pub fn normalize_article(raw: ApiArticle, window: Window) -> Article {
    let title = raw.title.unwrap_or_default();
    let source = raw
        .source
        .as_ref()
        .map(|s| s.name().to_string())
        .unwrap_or_default();
    let published_at = raw.published_at.unwrap_or_default();
    Article {
        hash: news_hash(&title, &source, &published_at),
        title,
        description: truncate_chars(&raw.description.unwrap_or_default(), DESCRIPTION_CAP),
        source,
        published_at,
        url: raw.url.unwrap_or_default(),
        window,
        region: None,
        topic: None,
        fetched_at: String::new(),
    }
}

/// Fetch one lookback window. Returns normalized articles; an empty key
/// yields an empty list without touching the network.
pub fn fetch_window(
    client: &Client,
    api_key: &str,
    window: Window,
    opts: &FetchOptions,
) -> Result<Vec<Article>, FetchError> {
    if api_key.is_empty() {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let from = (now - Duration::days(window.lookback_days()))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();
    let to = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    debug!("Fetching news window - window={}, from={}", window, from);
    let start = std::time::Instant::now();

    let page_size = opts.page_size.to_string();
    let resp = client
        .get(SEARCH_URL)
        .query(&[
            ("q", opts.query.as_str()),
            ("language", opts.language.as_str()),
            ("sortBy", "publishedAt"),
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("pageSize", page_size.as_str()),
            ("apiKey", api_key),
        ])
        .send()
        // reqwest errors can echo the full URL, key included
        .map_err(|e| FetchError::Transient(mask_sensitive_params(&e.to_string())))?;

    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::Auth {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Err(FetchError::Transient(format!("HTTP {}", status)));
    }

    let body: NewsApiResponse = resp
        .json()
        .map_err(|e| FetchError::Transient(format!("decoding body: {}", e)))?;

    let articles: Vec<Article> = body
        .articles
        .into_iter()
        .filter(|a| a.title.as_deref().map_or(false, |t| !t.is_empty()))
        .map(|a| normalize_article(a, window))
        .collect();

    debug!(
        "Window fetch completed - window={}, duration={:.2}s, articles={}",
        window,
        start.elapsed().as_secs_f32(),
        articles.len()
    );
    Ok(articles)
}

/// Fetch every window shortest-first and merge by hash: the first window to
/// produce a hash owns the article. An auth rejection stops further fetches
/// (a longer window cannot succeed with the same key) but keeps what was
/// already collected; any other failure degrades that window to empty.
pub fn fetch_all_windows(client: &Client, api_key: &str, opts: &FetchOptions) -> Vec<Article> {
    collect_windows(|window| fetch_window(client, api_key, window, opts))
}

fn collect_windows(
    mut fetch: impl FnMut(Window) -> Result<Vec<Article>, FetchError>,
) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Article> = Vec::new();

    for window in Window::ALL {
        match fetch(window) {
            Ok(articles) => {
                for art in articles {
                    if seen.insert(art.hash.clone()) {
                        merged.push(art);
                    }
                }
            }
            Err(FetchError::Auth { status }) => {
                warn!(
                    "News API key rejected (HTTP {}) on window {} - skipping remaining windows",
                    status, window
                );
                break;
            }
            Err(FetchError::Transient(reason)) => {
                warn!("News fetch failed (window={}): {}", window, reason);
            }
        }
    }
    merged
}

static SENSITIVE_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:apiKey|api_key|key|token|secret|password|access_token)=)([^&\s]+)")
        .unwrap()
});

/// Mask credential-bearing query params before a URL can reach the logs.
pub fn mask_sensitive_params(url: &str) -> String {
    SENSITIVE_PARAMS
        .replace_all(url, |caps: &Captures| {
            let value = &caps[2];
            if value.chars().count() <= 6 {
                format!("{}***", &caps[1])
            } else {
                let prefix: String = value.chars().take(4).collect();
                format!("{}{}***", &caps[1], prefix)
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_types::ApiSource;

    fn stub_article(hash: &str) -> Article {
        Article {
            hash: hash.to_string(),
            title: "T".to_string(),
            description: String::new(),
            source: "S".to_string(),
            published_at: "2025-01-01T00:00:00Z".to_string(),
            url: String::new(),
            window: Window::H24,
            region: None,
            topic: None,
            fetched_at: String::new(),
        }
    }

    #[test]
    fn hash_is_deterministic() {
        let h1 = news_hash("Title", "Source", "2025-01-01T00:00:00Z");
        let h2 = news_hash("Title", "Source", "2025-01-01T00:00:00Z");
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_is_case_insensitive() {
        let h1 = news_hash("TITLE", "SOURCE", "2025-01-01T00:00:00Z");
        let h2 = news_hash("title", "source", "2025-01-01T00:00:00z");
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_articles_hash_differently() {
        let h1 = news_hash("Title A", "Source", "2025-01-01T00:00:00Z");
        let h2 = news_hash("Title B", "Source", "2025-01-01T00:00:00Z");
        assert_ne!(h1, h2);
    }

    #[test]
    fn hash_is_16_hex_chars() {
        let h = news_hash("Title", "Source", "2025-01-01T00:00:00Z");
        assert_eq!(h.len(), 16);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn normalize_extracts_nested_source() {
        let raw = ApiArticle {
            title: Some("Test Title".to_string()),
            description: Some("Some description".to_string()),
            source: Some(ApiSource::Named {
                name: Some("Reuters".to_string()),
            }),
            published_at: Some("2025-01-01T12:00:00Z".to_string()),
            url: Some("https://example.com/article".to_string()),
        };
        let art = normalize_article(raw, Window::H24);
        assert_eq!(art.title, "Test Title");
        assert_eq!(art.source, "Reuters");
        assert_eq!(art.window, Window::H24);
        assert_eq!(art.hash.len(), 16);
    }

    #[test]
    fn normalize_tolerates_missing_fields() {
        let raw = ApiArticle {
            title: Some("Minimal".to_string()),
            description: None,
            source: None,
            published_at: None,
            url: None,
        };
        let art = normalize_article(raw, Window::D7);
        assert_eq!(art.title, "Minimal");
        assert_eq!(art.source, "");
        assert_eq!(art.window, Window::D7);
    }

    #[test]
    fn normalize_caps_description() {
        let raw = ApiArticle {
            title: Some("T".to_string()),
            description: Some("x".repeat(1000)),
            source: None,
            published_at: None,
            url: None,
        };
        let art = normalize_article(raw, Window::H24);
        assert_eq!(art.description.chars().count(), 500);
    }

    #[test]
    fn auth_failure_stops_after_first_window() {
        let mut calls = 0;
        let result = collect_windows(|_| {
            calls += 1;
            Err(FetchError::Auth { status: 401 })
        });
        assert!(result.is_empty());
        assert_eq!(calls, 1);
    }

    #[test]
    fn transient_failures_do_not_abort_remaining_windows() {
        let mut calls = 0;
        let result = collect_windows(|_| {
            calls += 1;
            Err(FetchError::Transient("timeout".to_string()))
        });
        assert!(result.is_empty());
        assert_eq!(calls, Window::ALL.len());
    }

    #[test]
    fn same_hash_across_windows_kept_once() {
        let result = collect_windows(|_| Ok(vec![stub_article("samehash")]));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn shortest_window_owns_the_article() {
        let result = collect_windows(|window| {
            let mut art = stub_article("shared");
            art.window = window;
            Ok(vec![art])
        });
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].window, Window::H24);
    }

    #[test]
    fn auth_failure_keeps_earlier_windows() {
        let mut calls = 0;
        let result = collect_windows(|window| {
            calls += 1;
            if window == Window::H24 {
                Ok(vec![stub_article("first")])
            } else {
                Err(FetchError::Auth { status: 403 })
            }
        });
        assert_eq!(result.len(), 1);
        assert_eq!(calls, 2);
    }

    #[test]
    fn masks_api_key_in_urls() {
        let url = "https://newsapi.org/v2/everything?q=rates&apiKey=secret123456";
        let masked = mask_sensitive_params(url);
        assert!(!masked.contains("secret123456"));
        assert!(masked.contains("apiKey=secr***"));
    }

    #[test]
    fn masks_short_values_entirely() {
        let masked = mask_sensitive_params("https://x.test/?token=abc");
        assert!(masked.contains("token=***"));
        assert!(!masked.contains("abc"));
    }
}
