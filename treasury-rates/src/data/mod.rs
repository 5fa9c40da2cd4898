pub mod extract;
pub mod feed;
pub mod treasury;
pub mod types;

pub use extract::{extract_rates, rates_from_document};
pub use feed::{children_with_suffix, last_entry, parse, unique_child_with_suffix, Element};
pub use treasury::TreasuryClient;
pub use types::{DecimalContext, RateKind, RateSet, DEFAULT_PRECISION};
