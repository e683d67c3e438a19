use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub stargazers_count: i64,
    pub forks_count: i64,
    pub open_issues_count: Option<i64>,
    pub has_wiki: Option<bool>,
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Copy, Clone, Debug)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// Issue as it comes off the wire. The repository name is not part of the
/// response; the aggregation layer stamps it on afterwards.
#[derive(Deserialize, PartialEq, Clone, Debug)]
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
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: CommentUser,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct CommentUser {
    pub login: String,
    pub avatar_url: String,
}

/// One entry of a repository contents listing. `download_url` is null for
/// directories.
#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct ContentsEntry {
    pub name: String,
    pub sha: String,
    pub download_url: Option<String>,
}

/// Response of a contents API PUT. The commit part is not used.
#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct PutFileOutcome {
    pub content: ContentsEntry,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct TrafficStats {
    pub count: i64,
    pub uniques: i64,
    pub views: Vec<TrafficDataPoint>,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct TrafficDataPoint {
    pub timestamp: String,
    pub count: i64,
    pub uniques: i64,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Contributor {
    pub total: i64,
    pub author: ContributorAuthor,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct ContributorAuthor {
    pub id: i64,
    pub login: String,
    pub avatar_url: String,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct CommitActivity {
    pub total: i64,
    pub week: i64,
    pub days: Vec<i64>,
}

/// The code frequency endpoint returns bare `[week, additions, deletions]`
/// triples. Deletions come in negative and are stored as a magnitude.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct CodeFrequency {
    pub week: i64,
    pub additions: i64,
    pub deletions: i64,
}

impl<'de> Deserialize<'de> for CodeFrequency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [week, additions, deletions] = <[i64; 3]>::deserialize(deserializer)?;
        Ok(Self { week, additions, deletions: deletions.abs() })
    }
}

/// Rate limit state as reported by the `x-ratelimit-*` response headers.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let parse = |name: &str| {
            headers.get(name)?.to_str().ok()?.parse().ok()
        };
        let limit = parse("x-ratelimit-limit")?;
        let remaining = parse("x-ratelimit-remaining")?;
        Some(Self { limit, remaining })
    }
}
