//! Summary service: the cache-first request pipeline and its builder.

mod builder;
mod summary;

pub use builder::{DEFAULT_TIMEOUT, SummaryServiceBuilder};
pub use summary::{SummaryOutcome, SummaryService, SummarySource};
