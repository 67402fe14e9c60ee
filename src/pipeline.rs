//! Pipeline orchestration
//!
//! [`Pipeline`] wires the collaborators together: the document parser feeds
//! the batch scheduler, the scheduler drives resolver + fetcher over the
//! shared API client, and the completed, ordered result set is handed to the
//! table writer. Consumers subscribe to progress events instead of polling.
//!
//! Lookup degradations never surface as errors here — a run always produces
//! one result per parsed entry. Only configuration, pattern, and output I/O
//! failures are returned as `Err`.

use crate::config::Config;
use crate::fetcher::ActivityFetcher;
use crate::github::{ActivityApi, GitHubClient};
use crate::output;
use crate::parser::ListParser;
use crate::scheduler::BatchScheduler;
use crate::types::{Event, FetchResult};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the progress event channel; slow subscribers lag rather than
/// block the pipeline
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Drives a catalog document through the concurrent fetch engine
pub struct Pipeline<A = GitHubClient> {
    config: Config,
    api: Arc<A>,
    parser: ListParser,
    events: broadcast::Sender<Event>,
}

impl Pipeline<GitHubClient> {
    /// Create a pipeline with the production GitHub client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: Config) -> crate::Result<Self> {
        let client = GitHubClient::new(&config.api)?;
        Self::with_client(config, client)
    }
}

impl<A: ActivityApi + 'static> Pipeline<A> {
    /// Create a pipeline over any [`ActivityApi`] implementation
    ///
    /// Used by tests and by embedders talking to a non-default API host.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_client(config: Config, api: A) -> crate::Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            parser: ListParser::new()?,
            api: Arc::new(api),
            events,
            config,
        })
    }

    /// Subscribe to progress events
    ///
    /// Events are advisory; dropping the receiver never affects a run.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Enrich all entries found in `document`
    ///
    /// Always returns exactly one result per parsed entry, in document
    /// order; entries whose lookups degraded carry an empty activity date.
    pub async fn run(&self, document: &str) -> Vec<FetchResult> {
        let entries = self.parser.parse(document);
        tracing::info!(entries = entries.len(), "Parsed catalog document");

        let fetcher = Arc::new(ActivityFetcher::new(Arc::clone(&self.api), &self.config));
        let scheduler = BatchScheduler::new(fetcher, &self.config, self.events.clone());
        let results = scheduler.run(entries).await;

        self.events
            .send(Event::Completed {
                total_entries: results.len(),
            })
            .ok();
        tracing::info!(results = results.len(), "Run completed");

        results
    }

    /// Read a catalog document from `input`, enrich it, and write the CSV
    /// table to `output`
    ///
    /// The table is written once, after the whole run completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or the output cannot be
    /// written; lookup degradations do not.
    pub async fn run_file(&self, input: &Path, output: &Path) -> crate::Result<Vec<FetchResult>> {
        let document = tokio::fs::read_to_string(input).await?;
        let results = self.run(&document).await;
        output::write_csv(output, &results)?;
        tracing::info!(path = %output.display(), rows = results.len(), "Table written");
        Ok(results)
    }
}
