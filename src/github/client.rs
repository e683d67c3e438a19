use self::{contents::*, discussions::*, issues::*, repos::*, stats::*};
use super::{error::Error, responses::RateLimit};
use http::{
    header::{HeaderName, ACCEPT, AUTHORIZATION, LINK, USER_AGENT},
    HeaderMap, HeaderValue,
};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::{result::Result, sync::Mutex};
use tracing::debug;
use url::Url;

type ClientResult<T> = Result<T, Error>;

/// [GitHub REST authentication methods](https://docs.github.com/en/rest/overview/other-authentication-methods).
///
/// [HTTP authorization on MDN](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Authorization).
///
pub trait Authentication {
    /// Encode authentication into HTTP authorization header.
    fn to_authz_value(&self) -> String;
}

#[derive(Debug)]
pub struct GhClient {
    base_url: Url,
    http: Client,
    rate_limit: Mutex<Option<RateLimit>>,
}

impl GhClient {
    pub fn new(
        base_url: impl Into<Option<Url>>,
        token: &impl Authentication,
    ) -> ClientResult<Self> {
        let base_url: Url =
            base_url.into().map(Result::Ok).unwrap_or_else(|| "https://api.github.com/".parse())?;

        let headers = {
            let mut headers = HeaderMap::new();

            let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);

            let authorization = token.to_authz_value();
            headers.insert(AUTHORIZATION, authorization.try_into()?);

            headers.insert(ACCEPT, "application/vnd.github+json".try_into()?);

            let api_version = HeaderName::from_static("x-github-api-version");
            headers.insert(api_version, "2022-11-28".try_into()?);

            headers
        };

        let http = ClientBuilder::new().default_headers(headers).build()?;

        let client = GhClient { base_url, http, rate_limit: Mutex::new(None) };
        debug!(?client);

        Ok(client)
    }

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    /// Rate limit reported by the most recent response, if any.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limit.lock().ok().and_then(|x| *x)
    }

    /// Sends a request, records the rate limit headers, and maps the response
    /// status onto the error kinds.
    async fn execute(&self, request: RequestBuilder) -> ClientResult<Response> {
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");

        if let Some(limit) = RateLimit::from_headers(response.headers()) {
            if let Ok(mut slot) = self.rate_limit.lock() {
                *slot = Some(limit);
            }
        }

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth { status }),
            StatusCode::NOT_FOUND => Err(Error::NotFound { url: response.url().clone() }),
            s if s.is_client_error() || s.is_server_error() => Err(Error::Status { status }),
            _ => Ok(response),
        }
    }

    /// Collects every page of a listing endpoint by following the `Link`
    /// header's `rel="next"` URL.
    async fn get_paged<T: DeserializeOwned>(&self, first: Url) -> ClientResult<Vec<T>> {
        let mut next = Some(first);
        let mut items = Vec::new();
        while let Some(url) = next.take() {
            let response = self.execute(self.http.get(url)).await?;
            next = next_page_url(response.headers())?;
            let mut page: Vec<T> = response.json().await?;
            debug!(page_len = page.len(), "received page");
            items.append(&mut page);
        }
        Ok(items)
    }

    pub fn repos(&self) -> GhRepos<'_> {
        GhRepos { client: self }
    }

    pub fn issues(&self) -> GhIssues<'_> {
        GhIssues { client: self }
    }

    pub fn discussions(&self) -> GhDiscussions<'_> {
        GhDiscussions { client: self }
    }

    pub fn stats(&self) -> GhStats<'_> {
        GhStats { client: self }
    }

    pub fn contents(&self) -> GhContents<'_> {
        GhContents { client: self }
    }
}

fn next_page_url(headers: &HeaderMap) -> Result<Option<Url>, Error> {
    let link = match headers.get(LINK).and_then(|x| x.to_str().ok()) {
        Some(x) => x,
        None => return Ok(None),
    };
    for part in link.split(',') {
        let mut segments = part.split(';');
        let target = segments.next().unwrap_or("").trim();
        if !(target.starts_with('<') && target.ends_with('>')) {
            continue;
        }
        if segments.any(|param| param.trim() == "rel=\"next\"") {
            let url = target[1..target.len() - 1].parse::<Url>()?;
            return Ok(Some(url));
        }
    }
    Ok(None)
}

mod repos {
    use super::*;
    use crate::github::responses::Repository;

    #[derive(Debug)]
    /// GitHub's repository resource.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/repos
    pub struct GhRepos<'c> {
        pub client: &'c GhClient,
    }

    impl GhRepos<'_> {
        /// List repositories owned by the authenticated user.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#list-repositories-for-the-authenticated-user
        pub async fn list_my_repositories(&self) -> ClientResult<Vec<Repository>> {
            let mut url = self.client.build_url("/user/repos");
            url.query_pairs_mut().append_pair("type", "owner").append_pair("per_page", "100");
            self.client.get_paged(url).await
        }
    }
}

mod issues {
    use super::*;
    use crate::github::{
        requests::{CreateComment, CreateIssue, UpdateIssueState},
        responses::{Comment, Issue, IssueState},
    };

    #[derive(Debug)]
    /// GitHub's issue resource, comments included.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/issues
    pub struct GhIssues<'c> {
        pub client: &'c GhClient,
    }

    impl GhIssues<'_> {
        /// List issues of a repository.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/issues/issues#list-repository-issues
        pub async fn list(&self, owner: &str, repo: &str) -> ClientResult<Vec<Issue>> {
            let mut url = self.client.build_url(&format!("/repos/{owner}/{repo}/issues"));
            url.query_pairs_mut().append_pair("per_page", "100");
            self.client.get_paged(url).await
        }

        /// Create an issue.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/issues/issues#create-an-issue
        pub async fn create(
            &self,
            owner: &str,
            repo: &str,
            fields: &CreateIssue,
        ) -> ClientResult<Issue> {
            let url = self.client.build_url(&format!("/repos/{owner}/{repo}/issues"));
            let request = self.client.http.post(url).json(fields);
            let response = self.client.execute(request).await?;
            let issue = response.json().await?;
            Ok(issue)
        }

        /// Close or reopen an issue.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/issues/issues#update-an-issue
        pub async fn set_state(
            &self,
            owner: &str,
            repo: &str,
            number: i64,
            state: IssueState,
        ) -> ClientResult<Issue> {
            let url = self.client.build_url(&format!("/repos/{owner}/{repo}/issues/{number}"));
            let request = self.client.http.patch(url).json(&UpdateIssueState { state });
            let response = self.client.execute(request).await?;
            let issue = response.json().await?;
            Ok(issue)
        }

        /// List comments of an issue.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/issues/comments#list-issue-comments
        pub async fn list_comments(
            &self,
            owner: &str,
            repo: &str,
            number: i64,
        ) -> ClientResult<Vec<Comment>> {
            let mut url = self
                .client
                .build_url(&format!("/repos/{owner}/{repo}/issues/{number}/comments"));
            url.query_pairs_mut().append_pair("per_page", "100");
            self.client.get_paged(url).await
        }

        /// Post a comment on an issue.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/issues/comments#create-an-issue-comment
        pub async fn create_comment(
            &self,
            owner: &str,
            repo: &str,
            number: i64,
            fields: &CreateComment,
        ) -> ClientResult<Comment> {
            let url = self
                .client
                .build_url(&format!("/repos/{owner}/{repo}/issues/{number}/comments"));
            let request = self.client.http.post(url).json(fields);
            let response = self.client.execute(request).await?;
            let comment = response.json().await?;
            Ok(comment)
        }
    }
}

mod discussions {
    use super::*;
    use crate::{github::graphql, types::Discussion};
    use serde_json::Value;

    #[derive(Debug)]
    /// GitHub's discussions, available over GraphQL only.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/graphql/guides/using-the-graphql-api-for-discussions
    pub struct GhDiscussions<'c> {
        pub client: &'c GhClient,
    }

    impl GhDiscussions<'_> {
        /// Fetch the 50 most recent discussions of a repository.
        pub async fn list(&self, owner: &str, repo: &str) -> ClientResult<Vec<Discussion>> {
            let url = self.client.build_url("/graphql");
            let payload = graphql::discussions_payload(owner, repo);
            let request = self.client.http.post(url).json(&payload);
            let response = self.client.execute(request).await?;
            let body: Value = response.json().await?;
            graphql::parse_discussions(&body)
        }
    }
}

mod stats {
    use super::*;
    use crate::github::responses::{CodeFrequency, CommitActivity, Contributor, TrafficStats};

    #[derive(Debug)]
    /// GitHub's repository metrics and traffic resources.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/metrics
    pub struct GhStats<'c> {
        pub client: &'c GhClient,
    }

    impl GhStats<'_> {
        /// Page views over the last 14 days.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/metrics/traffic#get-page-views
        pub async fn traffic_views(&self, owner: &str, repo: &str) -> ClientResult<TrafficStats> {
            let url = self.client.build_url(&format!("/repos/{owner}/{repo}/traffic/views"));
            let response = self.client.execute(self.client.http.get(url)).await?;
            let traffic = response.json().await?;
            Ok(traffic)
        }

        /// Top contributors with their total commit counts.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#list-repository-contributors
        pub async fn contributors(&self, owner: &str, repo: &str) -> ClientResult<Vec<Contributor>> {
            let mut url = self.client.build_url(&format!("/repos/{owner}/{repo}/contributors"));
            url.query_pairs_mut().append_pair("per_page", "10");
            let response = self.client.execute(self.client.http.get(url)).await?;
            let contributors = response.json().await?;
            Ok(contributors)
        }

        /// Weekly commit counts for the last year.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/metrics/statistics#get-the-last-year-of-commit-activity
        pub async fn commit_activity(
            &self,
            owner: &str,
            repo: &str,
        ) -> ClientResult<Vec<CommitActivity>> {
            let url =
                self.client.build_url(&format!("/repos/{owner}/{repo}/stats/commit_activity"));
            let response = self.client.execute(self.client.http.get(url)).await?;
            let activity = response.json().await?;
            Ok(activity)
        }

        /// Weekly addition/deletion counts.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/metrics/statistics#get-the-weekly-commit-activity
        pub async fn code_frequency(
            &self,
            owner: &str,
            repo: &str,
        ) -> ClientResult<Vec<CodeFrequency>> {
            let url =
                self.client.build_url(&format!("/repos/{owner}/{repo}/stats/code_frequency"));
            let response = self.client.execute(self.client.http.get(url)).await?;
            let frequency = response.json().await?;
            Ok(frequency)
        }
    }
}

mod contents {
    use super::*;
    use crate::github::{
        requests::PutFile,
        responses::{ContentsEntry, PutFileOutcome},
    };

    #[derive(Debug)]
    /// GitHub's repository contents resource. Also serves wiki pages, which
    /// live in a sibling `<repo>.wiki` repository.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/repos/contents
    pub struct GhContents<'c> {
        pub client: &'c GhClient,
    }

    impl GhContents<'_> {
        /// List files at the root of a repository.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/repos/contents#get-repository-content
        pub async fn list(&self, owner: &str, repo: &str) -> ClientResult<Vec<ContentsEntry>> {
            let url = self.client.build_url(&format!("/repos/{owner}/{repo}/contents"));
            let response = self.client.execute(self.client.http.get(url)).await?;
            let entries = response.json().await?;
            Ok(entries)
        }

        /// Fetch a file's raw content through its `download_url`.
        pub async fn download(&self, download_url: &str) -> ClientResult<String> {
            let url: Url = download_url.parse()?;
            let response = self.client.execute(self.client.http.get(url)).await?;
            let content = response.text().await?;
            Ok(content)
        }

        /// Create or update a file. Carry the prior `sha` in `fields` when
        /// overwriting; leave it out to create.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/repos/contents#create-or-update-file-contents
        pub async fn put_file(
            &self,
            owner: &str,
            repo: &str,
            path: &str,
            fields: &PutFile,
        ) -> ClientResult<PutFileOutcome> {
            let url = self.client.build_url(&format!("/repos/{owner}/{repo}/contents/{path}"));
            let request = self.client.http.put(url).json(fields);
            let response = self.client.execute(request).await?;
            let outcome = response.json().await?;
            Ok(outcome)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{requests::CreateIssue, PersonalAccessToken};
    use serde_json::json;
    use warp::{Filter, Reply};

    const TEST_TOKEN: PersonalAccessToken<'static> = PersonalAccessToken::new("t0k3n");

    fn repo_json(id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "full_name": format!("mlf/{name}"),
            "description": null,
            "html_url": format!("https://github.com/mlf/{name}"),
            "language": "Rust",
            "stargazers_count": 1,
            "forks_count": 0,
            "open_issues_count": 2,
            "has_wiki": true,
        })
    }

    async fn serve(
        route: impl Filter<Extract = impl warp::Reply, Error = warp::Rejection>
            + Clone
            + Send
            + Sync
            + 'static,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        let handle = tokio::spawn(server);
        (addr, handle)
    }

    fn client_for(addr: std::net::SocketAddr) -> GhClient {
        let base_url: Url = format!("http://{}/", addr).parse().unwrap();
        GhClient::new(base_url, &TEST_TOKEN).unwrap()
    }

    #[tokio::test]
    async fn test_list_repositories_follows_pagination() {
        // GET /user/repos, second page linked via the Link header
        let route = warp::get()
            .and(warp::path!("user" / "repos"))
            .and(warp::query::<std::collections::HashMap<String, String>>())
            .and(warp::header::<String>("host"))
            .map(|query: std::collections::HashMap<String, String>, host: String| {
                if query.get("page").map(String::as_str) == Some("2") {
                    warp::reply::json(&json!([repo_json(2, "b")])).into_response()
                } else {
                    let link =
                        format!("<http://{host}/user/repos?page=2>; rel=\"next\"");
                    warp::reply::with_header(
                        warp::reply::json(&json!([repo_json(1, "a")])),
                        "link",
                        link,
                    )
                    .into_response()
                }
            });
        let (addr, server) = serve(route).await;

        let client = client_for(addr);
        let repos = client.repos().list_my_repositories().await.unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);

        server.abort();
        server.await.ok();
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let route = warp::get().and(warp::path!("user" / "repos")).map(|| {
            warp::reply::with_status("bad credentials", StatusCode::UNAUTHORIZED)
        });
        let (addr, server) = serve(route).await;

        let client = client_for(addr);
        let err = client.repos().list_my_repositories().await.unwrap_err();
        assert!(matches!(err, Error::Auth { status } if status == StatusCode::UNAUTHORIZED));

        server.abort();
        server.await.ok();
    }

    #[tokio::test]
    async fn test_missing_resource_maps_to_not_found() {
        // warp replies 404 to anything unmatched
        let route = warp::get().and(warp::path!("nowhere")).map(warp::reply);
        let (addr, server) = serve(route).await;

        let client = client_for(addr);
        let err = client.contents().list("mlf", "tracker.wiki").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        server.abort();
        server.await.ok();
    }

    #[tokio::test]
    async fn test_rate_limit_captured_from_headers() {
        let route = warp::get().and(warp::path!("user" / "repos")).map(|| {
            let reply = warp::reply::json(&json!([]));
            let reply = warp::reply::with_header(reply, "x-ratelimit-limit", "5000");
            warp::reply::with_header(reply, "x-ratelimit-remaining", "4999")
        });
        let (addr, server) = serve(route).await;

        let client = client_for(addr);
        assert_eq!(client.rate_limit(), None);
        client.repos().list_my_repositories().await.unwrap();
        assert_eq!(client.rate_limit(), Some(RateLimit { limit: 5000, remaining: 4999 }));

        server.abort();
        server.await.ok();
    }

    #[tokio::test]
    async fn test_create_issue_sends_expected_body() {
        // POST /repos/mlf/tracker/issues
        let route = warp::post()
            .and(warp::path!("repos" / "mlf" / "tracker" / "issues"))
            .and(warp::body::json())
            .map(|body: CreateIssue| {
                assert_eq!(
                    body,
                    CreateIssue { title: "Crash on launch".to_owned(), body: None }
                );
                warp::reply::json(&json!({
                    "id": 10,
                    "number": 1,
                    "title": "Crash on launch",
                    "body": null,
                    "state": "open",
                    "created_at": "2025-10-28T20:35:00Z",
                    "updated_at": "2025-10-28T20:35:00Z",
                    "closed_at": null,
                    "comments": 0,
                }))
            });
        let (addr, server) = serve(route).await;

        let client = client_for(addr);
        let fields = CreateIssue { title: "Crash on launch".to_owned(), body: None };
        let issue = client.issues().create("mlf", "tracker", &fields).await.unwrap();
        assert_eq!(issue.number, 1);

        server.abort();
        server.await.ok();
    }

    #[tokio::test]
    async fn test_put_file_create_omits_sha() {
        let route = warp::put()
            .and(warp::path!("repos" / "mlf" / "tracker.wiki" / "contents" / "Home.md"))
            .and(warp::body::json())
            .map(|body: serde_json::Value| {
                assert_eq!(body["message"], "Create Home");
                assert!(body.get("sha").is_none());
                warp::reply::json(&json!({
                    "content": { "name": "Home.md", "sha": "abc123", "download_url": null }
                }))
            });
        let (addr, server) = serve(route).await;

        let client = client_for(addr);
        let fields = crate::github::requests::PutFile {
            message: "Create Home".to_owned(),
            content: base64::encode("# Home"),
            sha: None,
        };
        let outcome =
            client.contents().put_file("mlf", "tracker.wiki", "Home.md", &fields).await.unwrap();
        assert_eq!(outcome.content.sha, "abc123");

        server.abort();
        server.await.ok();
    }

    #[test]
    fn test_next_page_url() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page_url(&headers).unwrap(), None);

        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://api.github.com/user/repos?page=2>; rel=\"next\", \
                 <https://api.github.com/user/repos?page=5>; rel=\"last\"",
            ),
        );
        assert_eq!(
            next_page_url(&headers).unwrap(),
            Some("https://api.github.com/user/repos?page=2".parse().unwrap())
        );

        headers.insert(
            LINK,
            HeaderValue::from_static("<https://api.github.com/user/repos?page=1>; rel=\"prev\""),
        );
        assert_eq!(next_page_url(&headers).unwrap(), None);
    }
}
