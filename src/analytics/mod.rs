pub mod aggregate;
pub mod service;
pub mod source;

pub use aggregate::{Dashboard, PeriodBounds};
pub use service::{AnalyticsParams, AnalyticsService};
pub use source::{AnalyticsSource, PgAnalyticsSource};
