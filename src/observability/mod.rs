//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! node client, pipeline, poller, registry produce:
//!     → tracing events (structured fields: network, tx_id, stage, round)
//!     → metrics.rs (counters, histograms through the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs installs the subscriber (binaries only)
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a global subscriber or recorder itself
//! - Node access tokens are never logged

pub mod logging;
pub mod metrics;
