//! Wire types for the news-search API.
//!
//! Everything is optional or defaulted: provider payloads drop fields
//! without notice, and a malformed article must never fail the window.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "totalResults")]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
pub struct ApiArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<ApiSource>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Some providers nest the source (`{"name": "Reuters"}`), others send a
/// bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiSource {
    Named {
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
}

impl ApiSource {
    pub fn name(&self) -> &str {
        match self {
            ApiSource::Named { name } => name.as_deref().unwrap_or(""),
            ApiSource::Plain(s) => s,
        }
    }
}
