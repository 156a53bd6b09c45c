//! Macro-trend news analytics engine.
//!
//! Turns raw news articles across several recency windows into a
//! structured, auditable market-narrative payload: windowed fetch with
//! content-hash dedup, deterministic region/topic classification, a
//! news-of-the-day scorer, cross-window trend diffs and a SQLite store.
//! The downstream report generator consumes [`MacroPayload`] or its
//! plain-text rendering.

pub mod api_types;
pub mod budget;
pub mod classifier;
pub mod fetch;
pub mod models;
pub mod news_of_day;
pub mod orchestrator;
pub mod out_models;
pub mod render;
pub mod store;
pub mod trend;

pub use fetch::FetchOptions;
pub use models::{Article, Window};
pub use news_of_day::ScoreWeights;
pub use orchestrator::MacroEngine;
pub use out_models::MacroPayload;
pub use render::format_macro_payload_for_llm;
pub use store::NewsStore;
