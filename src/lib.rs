//! # freshlist
//!
//! Enrich curated project lists with repository freshness metadata.
//!
//! freshlist takes a markdown catalog of projects (an "awesome list"), looks
//! up each entry's most recent activity date against the GitHub API, and
//! writes the enriched, ordered result set as a CSV table. The heart of the
//! crate is a concurrent fetch engine that respects the API's rate limit,
//! retries transient failures with exponential backoff, and degrades
//! permanent failures to empty results instead of aborting the batch — a run
//! always terminates with exactly one row per entry, in input order.
//!
//! ## Design Philosophy
//!
//! - **Complete results over fail-fast** - A missing repository or an access
//!   denial costs one empty cell, never the batch
//! - **Deterministic output** - Results are assembled by input index, not
//!   completion order
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to progress events, no polling
//!   required
//!
//! ## Quick Start
//!
//! ```no_run
//! use freshlist::{ApiConfig, Config, Pipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         api: ApiConfig {
//!             token: std::env::var("GITHUB_ACCESS_TOKEN").ok(),
//!             ..ApiConfig::default()
//!         },
//!         ..Config::default()
//!     };
//!
//!     let pipeline = Pipeline::new(config)?;
//!
//!     // Subscribe to progress events
//!     let mut events = pipeline.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     pipeline
//!         .run_file(Path::new("README.md"), Path::new("site/projects.csv"))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Activity lookup with the retry protocol
pub mod fetcher;
/// GitHub REST API client and the `ActivityApi` seam
pub mod github;
/// CSV table output
pub mod output;
/// Markdown catalog parsing
pub mod parser;
/// Pipeline orchestration
pub mod pipeline;
/// URL resolution into fetchable targets
pub mod resolver;
/// Retry decision logic
pub mod retry;
/// Batch scheduling with bounded concurrency
pub mod scheduler;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, BatchConfig, Config, RetryConfig};
pub use error::{ApiError, Error, Result};
pub use fetcher::ActivityFetcher;
pub use github::{ActivityApi, GitHubClient, RepoMetadata};
pub use parser::ListParser;
pub use pipeline::Pipeline;
pub use retry::{RetryDecision, RetryPolicy};
pub use scheduler::BatchScheduler;
pub use types::{Entry, Event, FetchResult, ResolvedTarget, TargetKind};
