//! Label colours and release comments.

use super::{NextRelease, ReleaseType};
use crate::git::GitHubRepo;
use crate::linear::DEFAULT_LABEL_COLOR;

/// Colour of the version label for a release type.
pub fn label_color(release_type: Option<ReleaseType>) -> &'static str {
    match release_type {
        Some(ReleaseType::Major) => "#F44336",
        Some(ReleaseType::Premajor) => "#E91E63",
        Some(ReleaseType::Minor) => "#FF9800",
        Some(ReleaseType::Preminor) => "#FFC107",
        Some(ReleaseType::Patch) => "#4CAF50",
        Some(ReleaseType::Prepatch) => "#8BC34A",
        Some(ReleaseType::Prerelease) => "#9C27B0",
        None => DEFAULT_LABEL_COLOR,
    }
}

/// Markdown comment announcing the release on an issue.
///
/// The release link is only added when both a git tag and the GitHub
/// repository are known.
pub fn format_comment(release: &NextRelease, repo: Option<&GitHubRepo>) -> String {
    let channel = release.channel();
    let (emoji, channel_text) = if channel == "latest" {
        ("🚀", "stable")
    } else {
        ("🔬", channel)
    };

    let mut comment = format!(
        "{emoji} **Released in `v{}`** ({channel_text})\n\n",
        release.version
    );

    if let (Some(tag), Some(repo)) = (release.git_tag.as_deref(), repo) {
        comment.push_str(&format!("[View release →]({})", repo.release_url(tag)));
    }

    comment
}
