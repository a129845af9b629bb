use anyhow::Result;
use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use linear_release::branches::{BranchResolver, BranchSet};
use linear_release::config::IssueSource;
use linear_release::git::GitBranchSource;
use linear_release::issues::IssueMatcher;
use linear_release::linear::LinearClient;
use linear_release::release::{
    collect_issue_ids, success, CommitRef, LinearContext, Outcome, SuccessContext, SuccessOptions,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test setup that creates a temporary git repository with a `main` branch
struct TestRepo {
    temp_dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(temp_dir.path(), &opts)?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(TestRepo { temp_dir, repo })
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Commits `content` on top of `parent` and moves `branch` to the new commit.
    fn commit_on(&self, branch: &str, parent: Option<Oid>, content: &str) -> Result<Oid> {
        fs::write(self.path().join("test.txt"), content)?;
        let mut index = self.repo.index()?;
        index.add_path(Path::new("test.txt"))?;
        index.write()?;

        let signature = Signature::now("Test User", "test@example.com")?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent_commit = parent.map(|oid| self.repo.find_commit(oid)).transpose()?;
        let parents: Vec<&git2::Commit> = parent_commit.iter().collect();

        let oid = self.repo.commit(
            Some(&format!("refs/heads/{branch}")),
            &signature,
            &signature,
            &format!("change on {branch}"),
            &tree,
            &parents,
        )?;
        Ok(oid)
    }

    fn set_ref(&self, name: &str, target: Oid) -> Result<()> {
        self.repo.reference(name, target, true, "test")?;
        Ok(())
    }
}

/// main: base
/// feature/ENG-1-login: base -> login
/// fix/OPS-7-crash: base -> crash
fn branching_repo() -> Result<(TestRepo, Oid, Oid, Oid)> {
    let repo = TestRepo::new()?;
    let base = repo.commit_on("main", None, "base")?;
    let login = repo.commit_on("feature/ENG-1-login", Some(base), "login")?;
    let crash = repo.commit_on("fix/OPS-7-crash", Some(base), "crash")?;
    Ok((repo, base, login, crash))
}

fn resolver(repo: &TestRepo) -> Result<BranchResolver> {
    Ok(BranchResolver::new(Box::new(GitBranchSource::open(
        repo.path(),
    )?)))
}

fn set(items: &[&str]) -> BranchSet {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn feature_commits_resolve_to_their_branches() -> Result<()> {
    let (repo, _base, login, crash) = branching_repo()?;
    let resolver = resolver(&repo)?;

    let branches = resolver
        .resolve(&[
            CommitRef::new(login.to_string()),
            CommitRef::new(crash.to_string()),
        ])
        .await;

    assert_eq!(branches, set(&["feature/ENG-1-login", "fix/OPS-7-crash"]));
    Ok(())
}

#[tokio::test]
async fn trunk_is_never_reported() -> Result<()> {
    let (repo, base, login, _crash) = branching_repo()?;
    // Fast-forward main onto the feature branch
    repo.set_ref("refs/heads/main", login)?;
    let resolver = resolver(&repo)?;

    let branches = resolver.resolve(&[CommitRef::new(login.to_string())]).await;
    assert_eq!(branches, set(&["feature/ENG-1-login"]));

    // Every branch contains the base commit; only main is dropped
    let branches = resolver.resolve(&[CommitRef::new(base.to_string())]).await;
    assert_eq!(branches, set(&["feature/ENG-1-login", "fix/OPS-7-crash"]));
    Ok(())
}

#[tokio::test]
async fn remote_tracking_branches_lose_their_prefix() -> Result<()> {
    let (repo, _base, login, _crash) = branching_repo()?;
    repo.set_ref("refs/remotes/origin/feature/ENG-9-remote", login)?;
    let resolver = resolver(&repo)?;

    let branches = resolver.resolve(&[CommitRef::new(login.to_string())]).await;
    assert_eq!(
        branches,
        set(&["feature/ENG-1-login", "feature/ENG-9-remote"])
    );
    Ok(())
}

#[tokio::test]
async fn unknown_commit_is_skipped() -> Result<()> {
    let (repo, _base, login, _crash) = branching_repo()?;
    let resolver = resolver(&repo)?;

    let branches = resolver
        .resolve(&[
            CommitRef::new("0000000000000000000000000000000000000000"),
            CommitRef::new(login.to_string()),
        ])
        .await;

    assert_eq!(branches, set(&["feature/ENG-1-login"]));
    Ok(())
}

#[tokio::test]
async fn branch_mode_finds_issues_from_local_branches() -> Result<()> {
    let (repo, _base, login, crash) = branching_repo()?;
    let resolver = resolver(&repo)?;
    let commits = vec![
        CommitRef::new(login.to_string()).with_message("feat: login (ENG-99)"),
        CommitRef::new(crash.to_string()),
    ];

    let all = collect_issue_ids(
        IssueSource::Branch,
        &IssueMatcher::any_team(),
        &commits,
        Some(&resolver),
    )
    .await;
    assert_eq!(all.into_iter().collect::<Vec<_>>(), vec!["ENG-1", "OPS-7"]);

    let eng_only = IssueMatcher::new(Some(&["ENG".to_string()][..]))?;
    let filtered = collect_issue_ids(IssueSource::Branch, &eng_only, &commits, Some(&resolver)).await;
    assert_eq!(filtered.into_iter().collect::<Vec<_>>(), vec!["ENG-1"]);
    Ok(())
}

fn issue_json(id: &str, identifier: &str, labels: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "identifier": identifier,
        "title": "Login page",
        "labels": { "nodes": labels }
    })
}

#[tokio::test]
async fn success_updates_linear_end_to_end() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("FindLabel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "issueLabels": { "nodes": [] } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("CreateLabel"))
        .and(body_string_contains("#FF9800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "issueLabelCreate": { "issueLabel": { "id": "lbl-new", "name": "v1.2.0" } } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("GetIssue"))
        .and(body_string_contains("\"ENG-1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "issue": issue_json(
                "uuid-1",
                "ENG-1",
                json!([{ "id": "lbl-old", "name": "v1.1.0" }, { "id": "lbl-bug", "name": "bug" }]),
            ) }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("GetIssue"))
        .and(body_string_contains("\"ENG-404\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Entity not found" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("RemoveLabel"))
        .and(body_string_contains("lbl-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "issueRemoveLabel": { "issue": issue_json(
                "uuid-1",
                "ENG-1",
                json!([{ "id": "lbl-bug", "name": "bug" }]),
            ) } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("AddLabel"))
        .and(body_string_contains("lbl-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "issueAddLabel": { "issue": issue_json(
                "uuid-1",
                "ENG-1",
                json!([{ "id": "lbl-bug", "name": "bug" }, { "id": "lbl-new", "name": "v1.2.0" }]),
            ) } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = LinearContext {
        api_key: "lin_api_test".to_string(),
        team_keys: Some(vec!["ENG".to_string()]),
        label_prefix: "v".to_string(),
        api_url: server.uri(),
    };
    let release: SuccessContext = serde_json::from_value(json!({
        "commits": [
            { "hash": "aaa", "message": "feat: login ENG-1" },
            { "hash": "bbb", "message": "fix: ENG-404 and OPS-2" }
        ],
        "nextRelease": { "version": "1.2.0", "type": "minor", "gitTag": "v1.2.0" }
    }))?;
    let options = SuccessOptions {
        remove_old_labels: true,
        issue_source: IssueSource::Commit,
        ..SuccessOptions::default()
    };
    let client = LinearClient::with_endpoint(&context.api_key, &context.api_url)?;

    let summary = success(&context, &options, &release, &client, None).await;

    assert_eq!(summary.label.as_deref(), Some("v1.2.0"));
    assert_eq!(summary.issue_ids, vec!["ENG-1", "ENG-404"]);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary
        .results
        .iter()
        .any(|r| r.issue_id == "ENG-404" && r.outcome == Outcome::NotFound));
    Ok(())
}
