//! Issue tracker abstraction and the Linear implementation.

pub mod client;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

pub use client::{LinearClient, DEFAULT_LINEAR_API_URL};

use crate::graphql::ApiError;

/// Boxed future returned by [`IssueTracker`] methods.
pub type TrackerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Colour used when none is given for a new label.
pub const DEFAULT_LABEL_COLOR: &str = "#4752C4";

/// A label as returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Tracker-internal label id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// The subset of an issue needed to apply release labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker-internal issue id.
    pub id: String,
    /// Human identifier such as `ENG-123`.
    pub identifier: String,
    /// Issue title.
    #[serde(default)]
    pub title: String,
    /// Labels currently attached.
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// The authenticated user, returned by the connection test.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Operations the release pipeline needs from an issue tracker.
pub trait IssueTracker: Send + Sync {
    /// Checks that the credentials work.
    fn test_connection(&self) -> TrackerFuture<'_, Viewer>;

    /// Finds a label by exact name, creating it with `color` if absent.
    fn ensure_label<'a>(&'a self, name: &'a str, color: &'a str) -> TrackerFuture<'a, Label>;

    /// Looks up an issue by identifier; `Ok(None)` when it does not exist.
    fn get_issue<'a>(&'a self, identifier: &'a str) -> TrackerFuture<'a, Option<Issue>>;

    /// Attaches a label to an issue, keeping its other labels.
    fn add_label_to_issue<'a>(
        &'a self,
        issue_id: &'a str,
        label_id: &'a str,
    ) -> TrackerFuture<'a, Issue>;

    /// Detaches every version label, i.e. `prefix` followed by a digit.
    fn remove_version_labels<'a>(
        &'a self,
        issue: &'a Issue,
        prefix: &'a str,
    ) -> TrackerFuture<'a, Issue>;

    /// Posts a markdown comment on an issue.
    fn add_comment<'a>(&'a self, issue_id: &'a str, body: &'a str) -> TrackerFuture<'a, String>;
}
