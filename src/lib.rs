//! Collects GitHub commits, pull requests, and issues into one cross-referenced
//! [`model::ActivityReport`]: rate-limited primary fetch, heuristic commit-to-PR
//! association, bounded enrichment, and order-independent rollups.

pub mod association;
pub mod cli;
pub mod enrichment;
pub mod ext;
pub mod fetch;
pub mod github;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod rate_limiter;
pub mod stats;
pub mod util;

pub use pipeline::{ActivityPipeline, ActivityRequest, ActivityScope};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
