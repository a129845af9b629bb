//! Success phase: label the issues referenced by a published release.
//!
//! Every failure past this point is reported in the [`UpdateSummary`] and in
//! the log. Nothing here returns an error to the orchestrator.

use serde::Serialize;
use tracing::{error, info, warn};

use super::comment::{format_comment, label_color};
use super::{CommitRef, LinearContext, SuccessContext};
use crate::branches::BranchResolver;
use crate::config::{IssueSource, PluginConfig};
use crate::git::GitHubRepo;
use crate::graphql::ApiError;
use crate::issues::{IssueIds, IssueMatcher};
use crate::linear::{IssueTracker, Label};
use crate::utils::settings::get_env_var;

/// Behaviour switches for the success phase.
#[derive(Debug, Clone, Default)]
pub struct SuccessOptions {
    /// Remove older version labels first.
    pub remove_old_labels: bool,
    /// Comment on each updated issue.
    pub add_comment: bool,
    /// Only log what would change.
    pub dry_run: bool,
    /// Where identifiers come from.
    pub issue_source: IssueSource,
    /// Repository used for the release link in comments.
    pub github_repo: Option<GitHubRepo>,
}

impl SuccessOptions {
    /// Options from the plugin config.
    ///
    /// The repository for release links is `GITHUB_REPOSITORY` when set,
    /// otherwise whatever `repository_url` parses to.
    pub fn from_config(config: &PluginConfig, repository_url: Option<&str>) -> Self {
        let github_repo = get_env_var("GITHUB_REPOSITORY")
            .ok()
            .and_then(|slug| GitHubRepo::from_slug(&slug))
            .or_else(|| repository_url.and_then(GitHubRepo::from_url));

        Self {
            remove_old_labels: config.remove_old_labels,
            add_comment: config.add_comment,
            dry_run: config.dry_run,
            issue_source: config.issue_source,
            github_repo,
        }
    }
}

/// Result of updating one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Label (and comment) applied.
    Updated,
    /// A tracker call failed.
    Failed,
    /// The tracker does not know the identifier.
    NotFound,
}

/// Per-issue record in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdateResult {
    /// Identifier such as `ENG-123`.
    pub issue_id: String,
    /// What happened.
    pub outcome: Outcome,
    /// Error message for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IssueUpdateResult {
    fn new(issue_id: &str, outcome: Outcome, detail: Option<String>) -> Self {
        Self {
            issue_id: issue_id.to_string(),
            outcome,
            detail,
        }
    }
}

/// Aggregate outcome of the success phase.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    /// Version label name, once known.
    pub label: Option<String>,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Identifiers found for the release.
    pub issue_ids: Vec<String>,
    /// One entry per identifier that was processed.
    pub results: Vec<IssueUpdateResult>,
    /// Number of updated issues.
    pub updated: usize,
    /// Number of failed issues.
    pub failed: usize,
    /// Number of unknown identifiers.
    pub not_found: usize,
}

impl UpdateSummary {
    fn with_results(mut self, results: Vec<IssueUpdateResult>) -> Self {
        let count = |outcome| results.iter().filter(|r| r.outcome == outcome).count();
        self.updated = count(Outcome::Updated);
        self.failed = count(Outcome::Failed);
        self.not_found = count(Outcome::NotFound);
        self.results = results;
        self
    }
}

/// Collects the identifiers referenced by the release.
///
/// In branch mode the commits are mapped to their source branches first and
/// only branch names are searched; without a resolver nothing is found. In
/// commit mode the messages and bodies are searched directly.
pub async fn collect_issue_ids(
    source: IssueSource,
    matcher: &IssueMatcher,
    commits: &[CommitRef],
    resolver: Option<&BranchResolver>,
) -> IssueIds {
    match source {
        IssueSource::Commit => matcher.extract_all(commits.iter().flat_map(CommitRef::texts)),
        IssueSource::Branch => {
            let Some(resolver) = resolver else {
                warn!("No branch source available, skipping branch-based issue detection");
                return IssueIds::new();
            };
            let branches = resolver.resolve(commits).await;
            info!(
                source = resolver.source_name(),
                "Found {} source branch(es): {}",
                branches.len(),
                branches.iter().cloned().collect::<Vec<_>>().join(", ")
            );
            matcher.extract_all(branches.iter().map(String::as_str))
        }
    }
}

/// Runs the success phase.
pub async fn success(
    context: &LinearContext,
    options: &SuccessOptions,
    release: &SuccessContext,
    tracker: &dyn IssueTracker,
    resolver: Option<&BranchResolver>,
) -> UpdateSummary {
    let next = &release.next_release;
    let label_name = format!("{}{}", context.label_prefix, next.version);
    let mut summary = UpdateSummary {
        label: Some(label_name.clone()),
        dry_run: options.dry_run,
        ..UpdateSummary::default()
    };

    info!(
        "Updating Linear issues for release {} ({})",
        next.version,
        next.channel()
    );

    let matcher = match IssueMatcher::new(context.team_keys.as_deref()) {
        Ok(matcher) => matcher,
        Err(e) => {
            error!("Cannot match issues: {e}");
            return summary;
        }
    };

    let issue_ids =
        collect_issue_ids(options.issue_source, &matcher, &release.commits, resolver).await;
    summary.issue_ids = issue_ids.iter().cloned().collect();

    if issue_ids.is_empty() {
        info!("No Linear issues found for this release");
        return summary;
    }

    info!(
        "Found {} Linear issue(s): {}",
        issue_ids.len(),
        summary.issue_ids.join(", ")
    );

    if options.dry_run {
        info!("[Dry run] Would update issues: {}", summary.issue_ids.join(", "));
        info!("[Dry run] Would apply label: {label_name}");
        return summary;
    }

    let color = label_color(next.release_type());
    let label = match tracker.ensure_label(&label_name, color).await {
        Ok(label) => {
            info!("✓ Ensured label exists: {label_name}");
            label
        }
        Err(e) => {
            error!("Failed to ensure label {label_name}: {e}");
            let detail = format!("label {label_name} unavailable: {e}");
            let results = issue_ids
                .iter()
                .map(|id| IssueUpdateResult::new(id, Outcome::Failed, Some(detail.clone())))
                .collect();
            return summary.with_results(results);
        }
    };

    let comment = options
        .add_comment
        .then(|| format_comment(next, options.github_repo.as_ref()));

    let updates = issue_ids.iter().map(|issue_id| {
        update_issue(
            tracker,
            issue_id,
            &label,
            &context.label_prefix,
            options.remove_old_labels,
            comment.as_deref(),
        )
    });
    let results = futures::future::join_all(updates).await;
    let summary = summary.with_results(results);

    info!(
        "Linear update complete: {} updated, {} failed, {} not found",
        summary.updated, summary.failed, summary.not_found
    );

    summary
}

async fn update_issue(
    tracker: &dyn IssueTracker,
    issue_id: &str,
    label: &Label,
    label_prefix: &str,
    remove_old_labels: bool,
    comment: Option<&str>,
) -> IssueUpdateResult {
    let applied = apply_label(
        tracker,
        issue_id,
        label,
        label_prefix,
        remove_old_labels,
        comment,
    )
    .await;

    match applied {
        Ok(true) => {
            info!("✓ Updated issue {issue_id}");
            IssueUpdateResult::new(issue_id, Outcome::Updated, None)
        }
        Ok(false) => {
            warn!("Issue {issue_id} not found, skipping");
            IssueUpdateResult::new(issue_id, Outcome::NotFound, None)
        }
        Err(e) => {
            error!("Failed to update issue {issue_id}: {e}");
            IssueUpdateResult::new(issue_id, Outcome::Failed, Some(e.to_string()))
        }
    }
}

/// Applies the release to one issue; `Ok(false)` when the issue is unknown.
async fn apply_label(
    tracker: &dyn IssueTracker,
    issue_id: &str,
    label: &Label,
    label_prefix: &str,
    remove_old_labels: bool,
    comment: Option<&str>,
) -> Result<bool, ApiError> {
    let Some(issue) = tracker.get_issue(issue_id).await? else {
        return Ok(false);
    };

    if remove_old_labels {
        tracker.remove_version_labels(&issue, label_prefix).await?;
    }

    tracker.add_label_to_issue(&issue.id, &label.id).await?;

    if let Some(body) = comment {
        tracker.add_comment(&issue.id, body).await?;
    }

    Ok(true)
}
