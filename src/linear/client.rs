//! Linear GraphQL client.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{Issue, IssueTracker, Label, TrackerFuture, Viewer};
use crate::graphql::{ApiError, GraphQlClient};

/// Public Linear GraphQL endpoint.
pub const DEFAULT_LINEAR_API_URL: &str = "https://api.linear.app/graphql";

const VIEWER_QUERY: &str = r"
query TestConnection {
  viewer { id name }
}";

const FIND_LABEL_QUERY: &str = r"
query FindLabel($name: String!) {
  issueLabels(filter: { name: { eq: $name } }) {
    nodes { id name }
  }
}";

const CREATE_LABEL_MUTATION: &str = r"
mutation CreateLabel($name: String!, $color: String!) {
  issueLabelCreate(input: { name: $name, color: $color }) {
    issueLabel { id name }
  }
}";

const ISSUE_FIELDS: &str = "id identifier title labels { nodes { id name } }";

fn get_issue_query() -> String {
    format!("query GetIssue($identifier: String!) {{ issue(id: $identifier) {{ {ISSUE_FIELDS} }} }}")
}

fn add_label_mutation() -> String {
    format!(
        "mutation AddLabel($issueId: String!, $labelId: String!) {{ \
         issueAddLabel(id: $issueId, labelId: $labelId) {{ issue {{ {ISSUE_FIELDS} }} }} }}"
    )
}

fn remove_label_mutation() -> String {
    format!(
        "mutation RemoveLabel($issueId: String!, $labelId: String!) {{ \
         issueRemoveLabel(id: $issueId, labelId: $labelId) {{ issue {{ {ISSUE_FIELDS} }} }} }}"
    )
}

const ADD_COMMENT_MUTATION: &str = r"
mutation AddComment($issueId: String!, $body: String!) {
  commentCreate(input: { issueId: $issueId, body: $body }) {
    comment { id }
  }
}";

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

/// Issue as shaped by the Linear schema (labels are a connection).
#[derive(Deserialize)]
struct IssueNode {
    id: String,
    identifier: String,
    #[serde(default)]
    title: String,
    labels: Nodes<Label>,
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        Self {
            id: node.id,
            identifier: node.identifier,
            title: node.title,
            labels: node.labels.nodes,
        }
    }
}

#[derive(Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindLabelData {
    issue_labels: Nodes<Label>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLabelData {
    issue_label_create: CreatedLabel,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedLabel {
    issue_label: Label,
}

#[derive(Deserialize)]
struct GetIssueData {
    issue: Option<IssueNode>,
}

#[derive(Deserialize)]
struct IssuePayload {
    issue: IssueNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddLabelData {
    issue_add_label: IssuePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveLabelData {
    issue_remove_label: IssuePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentData {
    comment_create: CommentPayload,
}

#[derive(Deserialize)]
struct CommentPayload {
    comment: CommentId,
}

#[derive(Deserialize)]
struct CommentId {
    id: String,
}

/// Returns `true` for labels of the form `<prefix><version>`.
///
/// The character after the prefix must be a digit so that a `v` prefix does
/// not claim labels such as `visual`.
pub fn is_version_label(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Linear API client.
#[derive(Clone)]
pub struct LinearClient {
    graphql: GraphQlClient,
}

impl LinearClient {
    /// Creates a client for the public Linear API.
    pub fn new(api_key: &str) -> Result<Self, ApiError> {
        Self::with_endpoint(api_key, DEFAULT_LINEAR_API_URL)
    }

    /// Creates a client for a specific GraphQL endpoint.
    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self, ApiError> {
        // Personal API keys are sent bare, without a `Bearer` scheme.
        let graphql = GraphQlClient::new("Linear", endpoint, api_key)?;
        Ok(Self { graphql })
    }
}

impl IssueTracker for LinearClient {
    fn test_connection(&self) -> TrackerFuture<'_, Viewer> {
        Box::pin(async move {
            let data: ViewerData = self.graphql.query(VIEWER_QUERY, json!({})).await?;
            debug!(viewer = %data.viewer.name, "Linear connection verified");
            Ok(data.viewer)
        })
    }

    fn ensure_label<'a>(&'a self, name: &'a str, color: &'a str) -> TrackerFuture<'a, Label> {
        Box::pin(async move {
            let found: FindLabelData = self
                .graphql
                .query(FIND_LABEL_QUERY, json!({ "name": name }))
                .await?;

            if let Some(label) = found.issue_labels.nodes.into_iter().next() {
                debug!(label = %label.name, id = %label.id, "Found existing label");
                return Ok(label);
            }

            let created: CreateLabelData = self
                .graphql
                .query(
                    CREATE_LABEL_MUTATION,
                    json!({ "name": name, "color": color }),
                )
                .await?;
            info!(label = %name, color = %color, "Created label");
            Ok(created.issue_label_create.issue_label)
        })
    }

    fn get_issue<'a>(&'a self, identifier: &'a str) -> TrackerFuture<'a, Option<Issue>> {
        Box::pin(async move {
            let result: Result<GetIssueData, ApiError> = self
                .graphql
                .query(&get_issue_query(), json!({ "identifier": identifier }))
                .await;

            match result {
                Ok(data) => Ok(data.issue.map(Issue::from)),
                // Linear reports unknown identifiers as a GraphQL error.
                Err(ApiError::GraphQl { message, .. }) => {
                    debug!(identifier, %message, "Issue lookup returned an error, treating as missing");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
    }

    fn add_label_to_issue<'a>(
        &'a self,
        issue_id: &'a str,
        label_id: &'a str,
    ) -> TrackerFuture<'a, Issue> {
        Box::pin(async move {
            let data: AddLabelData = self
                .graphql
                .query(
                    &add_label_mutation(),
                    json!({ "issueId": issue_id, "labelId": label_id }),
                )
                .await?;
            Ok(data.issue_add_label.issue.into())
        })
    }

    fn remove_version_labels<'a>(
        &'a self,
        issue: &'a Issue,
        prefix: &'a str,
    ) -> TrackerFuture<'a, Issue> {
        Box::pin(async move {
            let mut updated = issue.clone();
            let stale: Vec<&Label> = issue
                .labels
                .iter()
                .filter(|label| is_version_label(&label.name, prefix))
                .collect();

            for label in stale {
                let data: RemoveLabelData = self
                    .graphql
                    .query(
                        &remove_label_mutation(),
                        json!({ "issueId": issue.id, "labelId": label.id }),
                    )
                    .await?;
                debug!(issue = %issue.identifier, label = %label.name, "Removed version label");
                updated = data.issue_remove_label.issue.into();
            }

            Ok(updated)
        })
    }

    fn add_comment<'a>(&'a self, issue_id: &'a str, body: &'a str) -> TrackerFuture<'a, String> {
        Box::pin(async move {
            let data: CommentData = self
                .graphql
                .query(
                    ADD_COMMENT_MUTATION,
                    json!({ "issueId": issue_id, "body": body }),
                )
                .await?;
            Ok(data.comment_create.comment.id)
        })
    }
}
