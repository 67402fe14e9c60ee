//! Core types for freshlist

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One catalog item parsed from the source document
///
/// Immutable once parsed; the fetch engine never mutates entries, it only
/// pairs each with a [`FetchResult`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Project name (the markdown link text)
    pub name: String,

    /// Breadcrumb path of the headings above the entry, joined by " > ",
    /// excluding the topmost document heading
    pub section: String,

    /// Project URL (the markdown link target)
    pub url: String,

    /// Free-text description following the link
    pub description: String,
}

/// Classification of an entry's URL into a fetchable kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A repository on the known code-hosting domain, fetchable via the API
    GitRepo,
    /// A package on the known package registry; no repository to query
    PackageRegistry,
    /// Neither; the entry gets an empty activity date without any lookup
    Unknown,
}

/// An entry's URL resolved into something the fetcher knows how to handle
///
/// Derived deterministically from [`Entry::url`]; owned only for the duration
/// of the fetch call that uses it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// What the URL points at
    pub kind: TargetKind,

    /// `owner/repo` for [`TargetKind::GitRepo`], the original URL for
    /// [`TargetKind::PackageRegistry`], empty for [`TargetKind::Unknown`]
    pub identifier: String,
}

/// Final enriched record for one entry
///
/// Produced exactly once per [`Entry`], never mutated after creation. The
/// output table holds these in the same relative order as the input sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// The entry this result enriches
    pub entry: Entry,

    /// Most recent activity date, or `None` when the lookup degraded
    pub last_activity: Option<NaiveDate>,

    /// Whether the URL points at the code-hosting domain (substring check,
    /// independent of whether a repository identifier could be extracted)
    pub is_git_repo: bool,

    /// Whether the URL points at the package registry
    pub is_registry: bool,

    /// Canonical `owner/repo` identifier, or empty when none was extracted
    pub repo: String,
}

impl FetchResult {
    /// Build a degraded result for an entry whose worker produced nothing
    ///
    /// Used when a fetch task fails in a way the protocol did not capture
    /// (e.g. a panic); the slot is filled so the output stays complete.
    pub fn empty(entry: Entry) -> Self {
        Self {
            entry,
            last_activity: None,
            is_git_repo: false,
            is_registry: false,
            repo: String::new(),
        }
    }
}

/// Progress events emitted by the pipeline
///
/// Advisory only; events never affect correctness and sends to a channel with
/// no subscribers are silently dropped.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch of entries is starting
    BatchStarted {
        /// Zero-based batch index
        index: usize,
        /// Total number of batches in the run
        total: usize,
        /// Number of entries in this batch
        size: usize,
    },

    /// One entry finished (successfully or degraded)
    EntryProcessed {
        /// Entry name
        name: String,
        /// Resolved repository identifier, empty if none
        repo: String,
        /// Activity date the fetch produced, if any
        last_activity: Option<NaiveDate>,
    },

    /// All tasks in a batch have terminated
    BatchCompleted {
        /// Zero-based batch index
        index: usize,
        /// Total number of batches in the run
        total: usize,
    },

    /// The whole run finished; the result set is complete
    Completed {
        /// Number of entries processed
        total_entries: usize,
    },
}
