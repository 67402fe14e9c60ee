//! BatchScheduler tests — batch sizing, barrier semantics, ordered assembly

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::ApiError;
use crate::github::RepoMetadata;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-repo scripted behavior: sleep to simulate a round-trip, then answer.
struct RepoScript {
    sleep: Duration,
    response: Result<NaiveDate, ApiError>,
}

/// API double that records each call's start and end instants per repo.
struct TimedApi {
    scripts: HashMap<String, RepoScript>,
    windows: Mutex<Vec<(String, Instant, Instant)>>,
}

impl TimedApi {
    fn new(scripts: HashMap<String, RepoScript>) -> Self {
        Self {
            scripts,
            windows: Mutex::new(Vec::new()),
        }
    }

    fn windows(&self) -> Vec<(String, Instant, Instant)> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityApi for TimedApi {
    async fn repository_metadata(&self, repo: &str) -> Result<RepoMetadata, ApiError> {
        let started = Instant::now();
        let script = self.scripts.get(repo);
        if let Some(script) = script {
            tokio::time::sleep(script.sleep).await;
        }
        let ended = Instant::now();
        self.windows
            .lock()
            .unwrap()
            .push((repo.to_string(), started, ended));

        match script {
            Some(script) => match &script.response {
                Ok(date) => Ok(RepoMetadata {
                    latest_commit: Utc
                        .from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()),
                }),
                Err(ApiError::NotFound { repo }) => Err(ApiError::NotFound { repo: repo.clone() }),
                Err(ApiError::Forbidden { repo }) => {
                    Err(ApiError::Forbidden { repo: repo.clone() })
                }
                Err(other) => Err(ApiError::Status {
                    status: 500,
                    message: format!("unsupported script error: {other}"),
                }),
            },
            None => Err(ApiError::NotFound {
                repo: repo.to_string(),
            }),
        }
    }

    async fn rate_limit_reset(&self) -> Result<DateTime<Utc>, ApiError> {
        Ok(Utc::now())
    }
}

fn entry(name: &str, url: &str) -> Entry {
    Entry {
        name: name.to_string(),
        section: "Tools".to_string(),
        url: url.to_string(),
        description: format!("{name} description"),
    }
}

fn repo_entries(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|i| {
            entry(
                &format!("project-{i}"),
                &format!("https://github.com/acme/r{i}"),
            )
        })
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn test_config(batch_size: usize, batch_pause: Duration) -> Config {
    let mut config = Config::default();
    config.batch.batch_size = batch_size;
    config.batch.batch_pause = batch_pause;
    config.batch.courtesy_delay = Duration::ZERO;
    config
}

fn scheduler_over(
    api: Arc<TimedApi>,
    config: &Config,
) -> (BatchScheduler<TimedApi>, broadcast::Receiver<Event>) {
    let (events, receiver) = broadcast::channel(256);
    let fetcher = Arc::new(ActivityFetcher::new(api, config));
    (BatchScheduler::new(fetcher, config, events), receiver)
}

fn drain_events(receiver: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn five_entries_with_batch_size_two_form_three_batches() {
    let scripts = (0..5)
        .map(|i| {
            (
                format!("acme/r{i}"),
                RepoScript {
                    sleep: Duration::ZERO,
                    response: Ok(date(2024, 1, 1)),
                },
            )
        })
        .collect();
    let api = Arc::new(TimedApi::new(scripts));
    let config = test_config(2, Duration::from_millis(10));
    let (scheduler, mut receiver) = scheduler_over(api, &config);

    let results = scheduler.run(repo_entries(5)).await;

    assert_eq!(results.len(), 5);

    let sizes: Vec<usize> = drain_events(&mut receiver)
        .into_iter()
        .filter_map(|event| match event {
            Event::BatchStarted { size, total, .. } => {
                assert_eq!(total, 3);
                Some(size)
            }
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn next_batch_starts_only_after_previous_batch_fully_drains() {
    // Uneven round-trips inside each batch: the barrier must hold the next
    // batch until the slowest sibling terminates
    let scripts = (0..5)
        .map(|i| {
            (
                format!("acme/r{i}"),
                RepoScript {
                    sleep: Duration::from_millis(if i % 2 == 0 { 80 } else { 10 }),
                    response: Ok(date(2024, 1, 1)),
                },
            )
        })
        .collect();
    let api = Arc::new(TimedApi::new(scripts));
    let config = test_config(2, Duration::from_millis(10));
    let (scheduler, _receiver) = scheduler_over(Arc::clone(&api), &config);

    scheduler.run(repo_entries(5)).await;

    // Group observed call windows by the batch their entry belonged to
    let windows = api.windows();
    assert_eq!(windows.len(), 5);
    let batch_of = |repo: &str| -> usize {
        let i: usize = repo.trim_start_matches("acme/r").parse().unwrap();
        i / 2
    };

    for later in 1..3 {
        let earlier_end = windows
            .iter()
            .filter(|(repo, _, _)| batch_of(repo) == later - 1)
            .map(|(_, _, end)| *end)
            .max()
            .unwrap();
        let later_start = windows
            .iter()
            .filter(|(repo, _, _)| batch_of(repo) == later)
            .map(|(_, start, _)| *start)
            .min()
            .unwrap();
        assert!(
            later_start >= earlier_end,
            "batch {later} started before batch {} drained",
            later - 1
        );
    }
}

#[tokio::test]
async fn results_preserve_input_order_regardless_of_completion_order() {
    // Earlier entries in each batch take longer, so completion order inverts
    let scripts = (0..6)
        .map(|i| {
            (
                format!("acme/r{i}"),
                RepoScript {
                    sleep: Duration::from_millis(60 - (i as u64 % 3) * 25),
                    response: Ok(date(2020 + i as i32, 1, 1)),
                },
            )
        })
        .collect();
    let api = Arc::new(TimedApi::new(scripts));
    let config = test_config(3, Duration::from_millis(5));
    let (scheduler, _receiver) = scheduler_over(api, &config);

    let entries = repo_entries(6);
    let results = scheduler.run(entries.clone()).await;

    assert_eq!(results.len(), entries.len());
    for (result, entry) in results.iter().zip(&entries) {
        assert_eq!(&result.entry, entry, "output order must match input order");
    }
    assert_eq!(results[4].last_activity, Some(date(2024, 1, 1)));
}

#[tokio::test]
async fn one_failing_entry_never_aborts_its_siblings() {
    let mut scripts: HashMap<String, RepoScript> = (0..4)
        .map(|i| {
            (
                format!("acme/r{i}"),
                RepoScript {
                    sleep: Duration::from_millis(10),
                    response: Ok(date(2024, 5, 1)),
                },
            )
        })
        .collect();
    scripts.insert(
        "acme/r1".to_string(),
        RepoScript {
            sleep: Duration::from_millis(10),
            response: Err(ApiError::NotFound {
                repo: "acme/r1".to_string(),
            }),
        },
    );
    let api = Arc::new(TimedApi::new(scripts));
    let config = test_config(4, Duration::from_millis(5));
    let (scheduler, _receiver) = scheduler_over(api, &config);

    let results = scheduler.run(repo_entries(4)).await;

    assert_eq!(results.len(), 4);
    assert_eq!(results[1].last_activity, None, "failed entry degrades");
    for i in [0, 2, 3] {
        assert_eq!(
            results[i].last_activity,
            Some(date(2024, 5, 1)),
            "sibling {i} must complete normally"
        );
    }
}

#[tokio::test]
async fn mixed_target_kinds_set_flags_and_repo_identifier() {
    let scripts = HashMap::from([(
        "acme/r0".to_string(),
        RepoScript {
            sleep: Duration::ZERO,
            response: Ok(date(2024, 3, 1)),
        },
    )]);
    let api = Arc::new(TimedApi::new(scripts));
    let config = test_config(10, Duration::ZERO);
    let (scheduler, _receiver) = scheduler_over(api, &config);

    let entries = vec![
        entry("a", "https://github.com/acme/r0"),
        entry("b", "https://cran.r-project.org/package=b"),
        entry("c", "ftp://somewhere/else"),
    ];
    let results = scheduler.run(entries).await;

    assert!(results[0].is_git_repo);
    assert_eq!(results[0].repo, "acme/r0");
    assert_eq!(results[0].last_activity, Some(date(2024, 3, 1)));

    assert!(results[1].is_registry);
    assert!(!results[1].is_git_repo);
    assert_eq!(results[1].repo, "");
    assert_eq!(results[1].last_activity, Some(date(1999, 1, 1)));

    assert!(!results[2].is_git_repo);
    assert!(!results[2].is_registry);
    assert_eq!(results[2].last_activity, None);
}

#[tokio::test]
async fn entry_processed_events_cover_every_entry() {
    let scripts = (0..3)
        .map(|i| {
            (
                format!("acme/r{i}"),
                RepoScript {
                    sleep: Duration::ZERO,
                    response: Ok(date(2024, 1, 1)),
                },
            )
        })
        .collect();
    let api = Arc::new(TimedApi::new(scripts));
    let config = test_config(2, Duration::from_millis(5));
    let (scheduler, mut receiver) = scheduler_over(api, &config);

    scheduler.run(repo_entries(3)).await;

    let mut processed: Vec<String> = drain_events(&mut receiver)
        .into_iter()
        .filter_map(|event| match event {
            Event::EntryProcessed { name, .. } => Some(name),
            _ => None,
        })
        .collect();
    processed.sort();
    assert_eq!(processed, vec!["project-0", "project-1", "project-2"]);
}

#[tokio::test]
async fn empty_input_yields_empty_output() {
    let api = Arc::new(TimedApi::new(HashMap::new()));
    let config = test_config(2, Duration::from_millis(5));
    let (scheduler, mut receiver) = scheduler_over(api, &config);

    let results = scheduler.run(Vec::new()).await;

    assert!(results.is_empty());
    assert!(drain_events(&mut receiver).is_empty());
}
