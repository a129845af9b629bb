//! Shared test doubles for the tracker and branch source seams.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::branches::{BranchFuture, BranchSource};
use crate::graphql::ApiError;
use crate::linear::{Issue, IssueTracker, Label, TrackerFuture, Viewer};

/// Mock branch source with a fixed commit-to-branches table.
///
/// Unknown hashes resolve to no branches. Hashes registered with
/// [`with_failure`](Self::with_failure) return an error.
pub(crate) struct MockBranchSource {
    branches: HashMap<String, Vec<String>>,
    failures: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockBranchSource {
    pub(crate) fn new() -> Self {
        Self {
            branches: HashMap::new(),
            failures: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn with_branches(mut self, hash: &str, branches: &[&str]) -> Self {
        self.branches.insert(
            hash.to_string(),
            branches.iter().map(|b| (*b).to_string()).collect(),
        );
        self
    }

    pub(crate) fn with_failure(mut self, hash: &str) -> Self {
        self.failures.insert(hash.to_string());
        self
    }

    /// Returns a handle for counting lookups after the source has been
    /// moved into a resolver.
    pub(crate) fn call_handle(&self) -> LookupHandle {
        LookupHandle {
            calls: self.calls.clone(),
        }
    }
}

/// Shared handle to the lookups made against a [`MockBranchSource`].
pub(crate) struct LookupHandle {
    calls: Arc<Mutex<Vec<String>>>,
}

impl LookupHandle {
    pub(crate) fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl BranchSource for MockBranchSource {
    fn branches_for_commit<'a>(&'a self, hash: &'a str) -> BranchFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(hash.to_string());
            if self.failures.contains(hash) {
                return Err(anyhow!("lookup failed for {hash}"));
            }
            Ok(self.branches.get(hash).cloned().unwrap_or_default())
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// A call recorded by [`MockTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TrackerCall {
    TestConnection,
    EnsureLabel { name: String, color: String },
    GetIssue { identifier: String },
    AddLabel { issue: String, label: String },
    RemoveVersionLabels { issue: String, prefix: String },
    AddComment { issue: String, body: String },
}

/// In-memory issue tracker.
///
/// Issues registered with [`with_issue`](Self::with_issue) get the internal
/// id `id-<identifier>`. Every other identifier is reported as missing.
pub(crate) struct MockTracker {
    issues: HashMap<String, Issue>,
    failing_issues: HashSet<String>,
    label_error: bool,
    connection_error: Mutex<Option<ApiError>>,
    calls: Arc<Mutex<Vec<TrackerCall>>>,
}

impl MockTracker {
    pub(crate) fn new() -> Self {
        Self {
            issues: HashMap::new(),
            failing_issues: HashSet::new(),
            label_error: false,
            connection_error: Mutex::new(None),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn with_issue(mut self, identifier: &str) -> Self {
        self.issues.insert(
            identifier.to_string(),
            Issue {
                id: format!("id-{identifier}"),
                identifier: identifier.to_string(),
                title: format!("Issue {identifier}"),
                labels: Vec::new(),
            },
        );
        self
    }

    /// Makes label changes on `identifier` fail.
    pub(crate) fn with_failing_issue(mut self, identifier: &str) -> Self {
        self.failing_issues.insert(format!("id-{identifier}"));
        self
    }

    pub(crate) fn with_label_error(mut self) -> Self {
        self.label_error = true;
        self
    }

    /// The next connection test fails with `error`.
    pub(crate) fn with_connection_error(self, error: ApiError) -> Self {
        *self.connection_error.lock().unwrap() = Some(error);
        self
    }

    pub(crate) fn call_handle(&self) -> TrackerCallHandle {
        TrackerCallHandle {
            calls: self.calls.clone(),
        }
    }

    fn record(&self, call: TrackerCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn issue_by_id(&self, issue_id: &str) -> Option<Issue> {
        self.issues.values().find(|i| i.id == issue_id).cloned()
    }

    fn failure(message: &str) -> ApiError {
        ApiError::GraphQl {
            service: "Linear",
            message: message.to_string(),
        }
    }
}

/// Shared handle to the calls recorded by a [`MockTracker`].
pub(crate) struct TrackerCallHandle {
    calls: Arc<Mutex<Vec<TrackerCall>>>,
}

impl TrackerCallHandle {
    pub(crate) fn calls(&self) -> Vec<TrackerCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl IssueTracker for MockTracker {
    fn test_connection(&self) -> TrackerFuture<'_, Viewer> {
        Box::pin(async move {
            self.record(TrackerCall::TestConnection);
            if let Some(error) = self.connection_error.lock().unwrap().take() {
                return Err(error);
            }
            Ok(Viewer {
                id: "user-1".to_string(),
                name: "Release Bot".to_string(),
            })
        })
    }

    fn ensure_label<'a>(&'a self, name: &'a str, color: &'a str) -> TrackerFuture<'a, Label> {
        Box::pin(async move {
            self.record(TrackerCall::EnsureLabel {
                name: name.to_string(),
                color: color.to_string(),
            });
            if self.label_error {
                return Err(Self::failure("label creation failed"));
            }
            Ok(Label {
                id: format!("label-{name}"),
                name: name.to_string(),
            })
        })
    }

    fn get_issue<'a>(&'a self, identifier: &'a str) -> TrackerFuture<'a, Option<Issue>> {
        Box::pin(async move {
            self.record(TrackerCall::GetIssue {
                identifier: identifier.to_string(),
            });
            Ok(self.issues.get(identifier).cloned())
        })
    }

    fn add_label_to_issue<'a>(
        &'a self,
        issue_id: &'a str,
        label_id: &'a str,
    ) -> TrackerFuture<'a, Issue> {
        Box::pin(async move {
            self.record(TrackerCall::AddLabel {
                issue: issue_id.to_string(),
                label: label_id.to_string(),
            });
            if self.failing_issues.contains(issue_id) {
                return Err(Self::failure("issue update failed"));
            }
            self.issue_by_id(issue_id)
                .ok_or_else(|| Self::failure("Entity not found"))
        })
    }

    fn remove_version_labels<'a>(
        &'a self,
        issue: &'a Issue,
        prefix: &'a str,
    ) -> TrackerFuture<'a, Issue> {
        Box::pin(async move {
            self.record(TrackerCall::RemoveVersionLabels {
                issue: issue.identifier.clone(),
                prefix: prefix.to_string(),
            });
            Ok(issue.clone())
        })
    }

    fn add_comment<'a>(&'a self, issue_id: &'a str, body: &'a str) -> TrackerFuture<'a, String> {
        Box::pin(async move {
            self.record(TrackerCall::AddComment {
                issue: issue_id.to_string(),
                body: body.to_string(),
            });
            Ok(format!("comment-{issue_id}"))
        })
    }
}
