//! Everything that knows about the target site: endpoint client, payload
//! types, URL templates, and normalization of raw items.

pub mod http;
pub mod normalize;
pub mod types;
pub mod urls;

pub use http::{
    GamesFilter, GamesSource, RetryPolicy, SiteClient, SiteConfig, DEFAULT_BASE_URL, DEFAULT_LANG,
};
pub use normalize::{CategoryTable, Normalizer};
pub use types::{Category, GameRecord};
