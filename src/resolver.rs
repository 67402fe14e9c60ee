//! URL resolution — classify an entry's URL into a fetchable target
//!
//! A total function over strings: every URL resolves to a [`ResolvedTarget`],
//! there are no side effects and no failure modes. The strict `owner/repo`
//! pattern deliberately rejects anything that is not exactly a repository
//! root (tree/blob paths, user profiles, trailing slashes), mirroring how
//! the output flags stay substring-based and permissive.

use crate::types::{ResolvedTarget, TargetKind};
use regex::Regex;
use std::sync::LazyLock;

/// Host of the known code-hosting domain
pub const GITHUB_HOST: &str = "github.com";

/// Host of the known package registry
pub const CRAN_HOST: &str = "cran.r-project.org";

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^https://github\.com/([\w-]+/[-\w.]+)$").expect("repo URL pattern is valid")
});

/// Classify a URL into a [`ResolvedTarget`]
///
/// - A strict `https://github.com/owner/repo` URL resolves to
///   [`TargetKind::GitRepo`] with the `owner/repo` identifier (a trailing
///   `.git` is trimmed).
/// - A URL containing the registry host resolves to
///   [`TargetKind::PackageRegistry`] with the URL itself as identifier.
/// - Everything else resolves to [`TargetKind::Unknown`] with an empty
///   identifier.
///
/// # Examples
///
/// ```
/// use freshlist::resolver::resolve;
/// use freshlist::TargetKind;
///
/// let target = resolve("https://github.com/acme/widget");
/// assert_eq!(target.kind, TargetKind::GitRepo);
/// assert_eq!(target.identifier, "acme/widget");
/// ```
pub fn resolve(url: &str) -> ResolvedTarget {
    if let Some(captures) = REPO_URL.captures(url) {
        let identifier = captures[1].trim_end_matches(".git").to_string();
        return ResolvedTarget {
            kind: TargetKind::GitRepo,
            identifier,
        };
    }

    if is_cran_url(url) {
        return ResolvedTarget {
            kind: TargetKind::PackageRegistry,
            identifier: url.to_string(),
        };
    }

    ResolvedTarget {
        kind: TargetKind::Unknown,
        identifier: String::new(),
    }
}

/// Whether the URL mentions the code-hosting domain at all
///
/// Permissive substring check used for the output `github` flag; a
/// github.com URL that is not `owner/repo`-shaped still reports `true` here
/// while resolving to [`TargetKind::Unknown`].
#[must_use]
pub fn is_github_url(url: &str) -> bool {
    url.contains(GITHUB_HOST)
}

/// Whether the URL mentions the package registry host
#[must_use]
pub fn is_cran_url(url: &str) -> bool {
    url.contains(CRAN_HOST)
}
