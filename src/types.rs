//! Defines application domain data types.

use crate::github::responses::{
    self, CodeFrequency, CommitActivity, Contributor, IssueState, TrafficStats,
};
use anyhow::bail;
use chrono::{DateTime, Utc};
use core::fmt;
use std::str::FromStr;

// repository identity ------------------------------

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self { owner, name }
    }

    /// Name of the sibling repository holding the wiki pages.
    pub fn wiki_repo_name(&self) -> String {
        format!("{}.wiki", self.name)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = s.find('/');
        let r = match sep {
            Some(x) => {
                let name = &s[x + 1..];
                if name.is_empty() {
                    bail!("Expecting in `:owner/:name` format, but was `{}`.", s)
                }
                let name = name.to_owned();
                let owner = s[..x].to_owned();
                Self { owner, name }
            }
            None => {
                bail!("Expecting in `:owner/:name` format, but was `{}`.", s)
            }
        };
        Ok(r)
    }
}

impl TryFrom<&responses::Repository> for RepositoryId {
    type Error = anyhow::Error;

    fn try_from(repo: &responses::Repository) -> Result<Self, Self::Error> {
        repo.full_name.parse()
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct PartialRepositoryId {
    pub owner: Option<String>,
    pub name: String,
}

impl PartialRepositoryId {
    pub fn complete(self, default_owner: impl Into<String>) -> RepositoryId {
        let Self { owner, name } = self;
        RepositoryId { owner: owner.unwrap_or_else(|| default_owner.into()), name }
    }
}

impl FromStr for PartialRepositoryId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = s.find('/');
        let r = match sep {
            Some(x) => {
                let name = &s[x + 1..];
                if name.is_empty() {
                    bail!("Expecting in `:owner?/:name` format, but was `{}`.", s)
                }
                let name = name.to_owned();
                let owner = s[..x].to_owned().into();
                Self { owner, name }
            }
            None => Self { owner: None, name: s.into() },
        };
        Ok(r)
    }
}

// end: repository identity ------------------------------

// issues ------------------------------

/// An issue stamped with the name of the repository it was fetched from,
/// ready to merge into the flat all-repositories collection.
#[derive(PartialEq, Clone, Debug)]
pub struct Issue {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub comments: i64,
    pub repository_name: String,
}

impl Issue {
    pub fn stamp(wire: responses::Issue, repository_name: impl Into<String>) -> Self {
        let responses::Issue {
            id,
            number,
            title,
            body,
            state,
            created_at,
            updated_at,
            closed_at,
            comments,
        } = wire;
        Self {
            id,
            number,
            title,
            body,
            state,
            created_at,
            updated_at,
            closed_at,
            comments,
            repository_name: repository_name.into(),
        }
    }

    pub fn status(&self) -> IssueStatus {
        IssueStatus::classify(self.state, self.comments)
    }
}

/// Triage classification used by the QA workflow.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum IssueStatus {
    /// Open with no comments yet.
    New,
    /// Open with an ongoing discussion.
    Active,
    /// Closed, regardless of comments.
    Resolved,
}

impl IssueStatus {
    pub fn classify(state: IssueState, comments: i64) -> Self {
        match state {
            IssueState::Closed => IssueStatus::Resolved,
            IssueState::Open if comments > 0 => IssueStatus::Active,
            IssueState::Open => IssueStatus::New,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use IssueStatus::*;
        let s = match self {
            New => "new",
            Active => "active",
            Resolved => "resolved",
        };
        f.write_str(s)
    }
}

// end: issues ------------------------------

// discussions ------------------------------

#[derive(PartialEq, Clone, Debug)]
pub struct Discussion {
    pub id: String,
    pub number: i64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub category: String,
    pub is_answered: bool,
    pub comment_count: i64,
    pub upvote_count: i64,
}

// end: discussions ------------------------------

// stats ------------------------------

/// Per-repository statistics. Each field is populated by an independent
/// best-effort fetch; a failed sub-fetch leaves its field unset.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct RepoStats {
    pub traffic: Option<TrafficStats>,
    pub contributors: Vec<Contributor>,
    pub commit_activity: Vec<CommitActivity>,
    pub code_frequency: Vec<CodeFrequency>,
}

// end: stats ------------------------------

// wiki ------------------------------

#[derive(PartialEq, Clone, Debug)]
pub struct WikiPage {
    pub title: String,
    pub content: String,
    /// Content hash of the stored file. `None` until the page exists on the
    /// remote; required for an overwriting push.
    pub sha: Option<String>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RepoAsset {
    pub name: String,
    pub download_url: String,
}

// end: wiki ------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn test_repository_id_display() {
        assert_eq!(RepositoryId::new("mlf", "sample-repo").to_string(), "mlf/sample-repo");
    }

    #[test]
    fn test_parse_repository_id() {
        // trivial case
        assert_eq!(
            RepositoryId { owner: "mlf".to_owned(), name: "tracker".to_owned() },
            "mlf/tracker".parse().unwrap()
        );
        // missing owner
        assert_eq!(
            "Expecting in `:owner/:name` format, but was `tracker`.",
            "tracker".parse::<RepositoryId>().unwrap_err().to_string()
        );
        // missing name
        assert_eq!(
            "Expecting in `:owner/:name` format, but was `mlf/`.",
            "mlf/".parse::<RepositoryId>().unwrap_err().to_string()
        );
    }

    #[test]
    fn test_parse_partial_repository_id() {
        assert_eq!(
            PartialRepositoryId { owner: Some("mlf".to_owned()), name: "tracker".to_owned() },
            "mlf/tracker".parse().unwrap()
        );
        assert_eq!(
            PartialRepositoryId { owner: None, name: "tracker".to_owned() },
            "tracker".parse().unwrap()
        );
        assert_eq!(
            RepositoryId::new("mlf", "tracker"),
            "tracker".parse::<PartialRepositoryId>().unwrap().complete("mlf")
        );
    }

    #[test]
    fn test_wiki_repo_name() {
        assert_eq!(RepositoryId::new("mlf", "tracker").wiki_repo_name(), "tracker.wiki");
    }

    #[test]
    fn test_classify() {
        assert_eq!(IssueStatus::classify(IssueState::Open, 0), IssueStatus::New);
        assert_eq!(IssueStatus::classify(IssueState::Open, 3), IssueStatus::Active);
        assert_eq!(IssueStatus::classify(IssueState::Closed, 0), IssueStatus::Resolved);
        assert_eq!(IssueStatus::classify(IssueState::Closed, 3), IssueStatus::Resolved);
    }

    #[test]
    fn test_classify_properties() {
        fn closed_is_always_resolved(comments: i64) -> bool {
            IssueStatus::classify(IssueState::Closed, comments) == IssueStatus::Resolved
        }
        quickcheck(closed_is_always_resolved as fn(_) -> bool);

        fn open_follows_comment_count(comments: i64) -> bool {
            let expected = if comments > 0 { IssueStatus::Active } else { IssueStatus::New };
            IssueStatus::classify(IssueState::Open, comments) == expected
        }
        quickcheck(open_follows_comment_count as fn(_) -> bool);
    }
}
