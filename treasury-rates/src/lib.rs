pub mod config;
pub mod data;
pub mod error;

// Re-export commonly used types
pub use config::FeedConfig;
pub use data::{DecimalContext, Element, RateKind, RateSet, TreasuryClient};
pub use error::{FeedError, FeedResult};
