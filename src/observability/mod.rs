//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ledger client, submission pipeline, election service produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! Private keys never appear in events or labels.

pub mod logging;
pub mod metrics;
