//! Batch scheduling — bounded-concurrency waves with ordered assembly
//!
//! [`BatchScheduler`] fans entries out across concurrent fetch tasks in
//! discrete synchronized waves: entries are partitioned into consecutive
//! batches of `batch_size`, one tokio task is spawned per entry in the
//! current batch, and the scheduler blocks on a counting join until every
//! task in the batch has terminated before releasing the next. Peak
//! concurrency is therefore exactly `batch_size`, and an explicit pause
//! between batches further eases API pressure.
//!
//! Results are assembled by original index, not completion order, so the
//! output sequence always matches the input sequence — one result per
//! entry, no matter which tasks finished first or failed.

use crate::config::Config;
use crate::fetcher::ActivityFetcher;
use crate::github::ActivityApi;
use crate::resolver;
use crate::types::{Entry, Event, FetchResult, TargetKind};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Runs entries through the fetch engine in synchronized batches
pub struct BatchScheduler<A> {
    fetcher: Arc<ActivityFetcher<A>>,
    batch: crate::config::BatchConfig,
    events: broadcast::Sender<Event>,
}

impl<A: ActivityApi + 'static> BatchScheduler<A> {
    /// Create a scheduler over a shared fetcher
    pub fn new(
        fetcher: Arc<ActivityFetcher<A>>,
        config: &Config,
        events: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            fetcher,
            batch: config.batch.clone(),
            events,
        }
    }

    /// Process all entries, returning one result per entry in input order
    ///
    /// A single task's failure never aborts sibling tasks or later batches;
    /// failed slots are filled with empty-date results so the output stays
    /// complete.
    pub async fn run(&self, entries: Vec<Entry>) -> Vec<FetchResult> {
        let total = entries.len();
        let batch_size = self.batch.batch_size.max(1);
        let total_batches = total.div_ceil(batch_size);

        let mut slots: Vec<Option<FetchResult>> = (0..total).map(|_| None).collect();

        for (batch_index, chunk) in entries.chunks(batch_size).enumerate() {
            tracing::info!(
                batch = batch_index + 1,
                total_batches,
                size = chunk.len(),
                "Starting batch"
            );
            self.events
                .send(Event::BatchStarted {
                    index: batch_index,
                    total: total_batches,
                    size: chunk.len(),
                })
                .ok();

            let mut handles = Vec::with_capacity(chunk.len());
            for (offset, entry) in chunk.iter().enumerate() {
                let index = batch_index * batch_size + offset;
                let entry = entry.clone();
                let fetcher = Arc::clone(&self.fetcher);
                let events = self.events.clone();

                handles.push(tokio::spawn(async move {
                    let result = process_entry(&fetcher, entry).await;
                    events
                        .send(Event::EntryProcessed {
                            name: result.entry.name.clone(),
                            repo: result.repo.clone(),
                            last_activity: result.last_activity,
                        })
                        .ok();
                    (index, result)
                }));
            }

            // Barrier: batch N+1 never starts before batch N fully drains
            for outcome in join_all(handles).await {
                match outcome {
                    Ok((index, result)) => slots[index] = Some(result),
                    Err(e) => {
                        // Slot stays empty here and is filled from the
                        // original entry below
                        tracing::error!(error = %e, "Fetch task failed");
                    }
                }
            }

            self.events
                .send(Event::BatchCompleted {
                    index: batch_index,
                    total: total_batches,
                })
                .ok();

            if batch_index + 1 < total_batches {
                tokio::time::sleep(self.batch.batch_pause).await;
            }
        }

        slots
            .into_iter()
            .zip(entries)
            .map(|(slot, entry)| slot.unwrap_or_else(|| FetchResult::empty(entry)))
            .collect()
    }
}

/// Resolve one entry and run it through the fetcher
async fn process_entry<A: ActivityApi>(fetcher: &ActivityFetcher<A>, entry: Entry) -> FetchResult {
    let target = resolver::resolve(&entry.url);
    let repo = if target.kind == TargetKind::GitRepo {
        target.identifier.clone()
    } else {
        String::new()
    };

    tracing::debug!(
        name = %entry.name,
        target = %if repo.is_empty() { entry.url.as_str() } else { repo.as_str() },
        "Processing entry"
    );

    let last_activity = fetcher.fetch(&target).await;

    FetchResult {
        is_git_repo: resolver::is_github_url(&entry.url),
        is_registry: resolver::is_cran_url(&entry.url),
        entry,
        last_activity,
        repo,
    }
}

#[cfg(test)]
mod tests;
