use crate::{
    drafts::DraftStore,
    github::{
        self,
        requests::{CreateComment, CreateIssue, PutFile},
        responses::{Comment, IssueState, Repository},
        GhClient,
    },
    types::{Discussion, Issue, RepoAsset, RepoStats, RepositoryId, WikiPage},
};
use anyhow::{Error, Result};
use futures::{stream, StreamExt};
use tracing::{debug, info, warn};

/// Issue fetches fanned out per repository, bounded.
const MAX_IN_FLIGHT_ISSUE_FETCHES: usize = 4;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

#[derive(Debug)]
pub struct App<'a> {
    pub username: &'a str,
    pub client: GhClient,
}

/// Result of the all-repositories issue sync. Successes are merged; a failed
/// repository is reported here instead of aborting its siblings.
#[derive(Default, Debug)]
pub struct IssueSync {
    pub issues: Vec<Issue>,
    pub failures: Vec<RepoFailure>,
}

#[derive(Debug)]
pub struct RepoFailure {
    pub repository: String,
    pub error: Error,
}

impl App<'_> {
    #[tracing::instrument(skip(self))]
    pub async fn fetch_repositories(&self) -> Result<Vec<Repository>> {
        let repos = self.client.repos().list_my_repositories().await?;
        info!(count = repos.len(), "fetched repositories");
        Ok(repos)
    }

    /// Fetches issues of every repository and merges them into one flat
    /// collection, each issue stamped with its source repository name.
    /// Merged order follows repository order.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_all_issues(&self, repositories: &[Repository]) -> IssueSync {
        let mut fetches = stream::iter(repositories)
            .map(|repo| async move { (repo, self.fetch_repository_issues(repo).await) })
            .buffered(MAX_IN_FLIGHT_ISSUE_FETCHES);

        let mut sync = IssueSync::default();
        while let Some((repo, result)) = fetches.next().await {
            match result {
                Ok(issues) => sync.issues.extend(issues),
                Err(error) => {
                    warn!(repository = %repo.name, %error, "issue fetch failed");
                    sync.failures.push(RepoFailure { repository: repo.name.clone(), error });
                }
            }
        }
        info!(
            issues = sync.issues.len(),
            failures = sync.failures.len(),
            "issue sync complete"
        );
        sync
    }

    async fn fetch_repository_issues(&self, repo: &Repository) -> Result<Vec<Issue>> {
        let id = RepositoryId::try_from(repo)?;
        self.fetch_issues(&id).await
    }

    /// Issues of a single repository, stamped.
    pub async fn fetch_issues(&self, repo_id: &RepositoryId) -> Result<Vec<Issue>> {
        let wire = self.client.issues().list(&repo_id.owner, &repo_id.name).await?;
        let issues = wire.into_iter().map(|x| Issue::stamp(x, &repo_id.name)).collect();
        Ok(issues)
    }

    pub async fn create_issue(
        &self,
        repo_id: &RepositoryId,
        title: impl Into<String>,
        body: Option<String>,
    ) -> Result<Issue> {
        let fields = CreateIssue { title: title.into(), body };
        let wire = self.client.issues().create(&repo_id.owner, &repo_id.name, &fields).await?;
        Ok(Issue::stamp(wire, &repo_id.name))
    }

    pub async fn close_issue(&self, repo_id: &RepositoryId, number: i64) -> Result<Issue> {
        self.set_issue_state(repo_id, number, IssueState::Closed).await
    }

    pub async fn reopen_issue(&self, repo_id: &RepositoryId, number: i64) -> Result<Issue> {
        self.set_issue_state(repo_id, number, IssueState::Open).await
    }

    async fn set_issue_state(
        &self,
        repo_id: &RepositoryId,
        number: i64,
        state: IssueState,
    ) -> Result<Issue> {
        let wire = self
            .client
            .issues()
            .set_state(&repo_id.owner, &repo_id.name, number, state)
            .await?;
        Ok(Issue::stamp(wire, &repo_id.name))
    }

    pub async fn fetch_comments(
        &self,
        repo_id: &RepositoryId,
        number: i64,
    ) -> Result<Vec<Comment>> {
        let comments =
            self.client.issues().list_comments(&repo_id.owner, &repo_id.name, number).await?;
        Ok(comments)
    }

    pub async fn post_comment(
        &self,
        repo_id: &RepositoryId,
        number: i64,
        body: impl Into<String>,
    ) -> Result<Comment> {
        let fields = CreateComment { body: body.into() };
        let comment = self
            .client
            .issues()
            .create_comment(&repo_id.owner, &repo_id.name, number, &fields)
            .await?;
        Ok(comment)
    }

    pub async fn fetch_discussions(&self, repo_id: &RepositoryId) -> Result<Vec<Discussion>> {
        let discussions =
            self.client.discussions().list(&repo_id.owner, &repo_id.name).await?;
        info!(count = discussions.len(), repository = %repo_id, "fetched discussions");
        Ok(discussions)
    }

    /// Four independent sub-fetches; any of them failing leaves its field
    /// unset and does not block the others.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_stats(&self, repo_id: &RepositoryId) -> RepoStats {
        let RepositoryId { owner, name } = repo_id;
        let stats = self.client.stats();
        let (traffic, contributors, activity, frequency) = futures::join!(
            stats.traffic_views(owner, name),
            stats.contributors(owner, name),
            stats.commit_activity(owner, name),
            stats.code_frequency(owner, name),
        );

        let mut out = RepoStats::default();
        match traffic {
            Ok(x) => out.traffic = Some(x),
            Err(error) => debug!(%error, "traffic fetch failed"),
        }
        match contributors {
            Ok(x) => out.contributors = x,
            Err(error) => debug!(%error, "contributors fetch failed"),
        }
        match activity {
            Ok(x) => out.commit_activity = x,
            Err(error) => debug!(%error, "commit activity fetch failed"),
        }
        match frequency {
            Ok(x) => out.code_frequency = x,
            Err(error) => debug!(%error, "code frequency fetch failed"),
        }
        out
    }

    /// Lists the sibling `<repo>.wiki` repository and pulls each markdown
    /// file's raw content. An absent wiki repository is an empty list, not an
    /// error. A file that fails to download is skipped.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_wiki_pages(&self, repo_id: &RepositoryId) -> Result<Vec<WikiPage>> {
        let wiki_repo = repo_id.wiki_repo_name();
        let contents = self.client.contents();

        let entries = match contents.list(&repo_id.owner, &wiki_repo).await {
            Ok(x) => x,
            Err(github::Error::NotFound { .. }) => {
                info!(repository = %repo_id, "wiki repository absent");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut pages = Vec::new();
        for entry in entries {
            if !entry.name.ends_with(".md") {
                continue;
            }
            let download_url = match &entry.download_url {
                Some(x) => x,
                None => continue,
            };
            let content = match contents.download(download_url).await {
                Ok(x) => x,
                Err(error) => {
                    warn!(file = %entry.name, %error, "wiki file fetch failed");
                    continue;
                }
            };
            let title = entry.name.strip_suffix(".md").unwrap_or(&entry.name).to_owned();
            pages.push(WikiPage { title, content, sha: Some(entry.sha) });
        }
        info!(count = pages.len(), "fetched wiki pages");
        Ok(pages)
    }

    /// Image files at the root of the main repository, for embedding into
    /// wiki pages.
    pub async fn fetch_repo_assets(&self, repo_id: &RepositoryId) -> Result<Vec<RepoAsset>> {
        let entries = self.client.contents().list(&repo_id.owner, &repo_id.name).await?;
        let assets = entries
            .into_iter()
            .filter_map(|entry| {
                let ext = entry.name.rsplit('.').next()?.to_ascii_lowercase();
                if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                    return None;
                }
                let download_url = entry.download_url?;
                Some(RepoAsset { name: entry.name, download_url })
            })
            .collect();
        Ok(assets)
    }

    /// Pushes a wiki page. The page's stored `sha` decides between create and
    /// overwrite; the local draft is cleared once the push lands.
    #[tracing::instrument(skip(self, content, drafts))]
    pub async fn publish_wiki_page(
        &self,
        repo_id: &RepositoryId,
        page: &WikiPage,
        content: &str,
        drafts: &mut DraftStore,
    ) -> Result<WikiPage> {
        let wiki_repo = repo_id.wiki_repo_name();
        let message = match &page.sha {
            None => format!("Create {}", page.title),
            Some(_) => format!("Update {}", page.title),
        };
        let fields =
            PutFile { message, content: base64::encode(content), sha: page.sha.clone() };
        let path = format!("{}.md", page.title);
        let outcome = self
            .client
            .contents()
            .put_file(&repo_id.owner, &wiki_repo, &path, &fields)
            .await?;
        drafts.remove_draft(&page.title)?;
        info!(page = %page.title, "wiki page published");
        Ok(WikiPage {
            title: page.title.clone(),
            content: content.to_owned(),
            sha: Some(outcome.content.sha),
        })
    }
}
