pub mod compliance;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod series;
pub mod totals;

pub use compliance::{classify, ComplianceStatus, ExpiryEntry};
pub use config::Config;
pub use series::TimeSeriesTable;
pub use totals::{TotalsMap, TotalsResolver, TotalsStrategy};
