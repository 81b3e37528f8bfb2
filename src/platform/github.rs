//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    MergeRequest, MergeResult, MergeableState, PrComment, PrHead, PullRequest,
    PullRequestDetails, Repository,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Public GitHub REST API base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size GitHub accepts on list endpoints
const PER_PAGE: &str = "100";

// REST response types

#[derive(Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Deserialize)]
struct ApiRepo {
    name: String,
    full_name: String,
}

#[derive(Deserialize)]
struct ApiHead {
    #[serde(rename = "ref")]
    ref_field: String,
    sha: String,
    /// `null` when the fork holding the head branch was deleted
    repo: Option<ApiRepo>,
}

#[derive(Deserialize)]
struct ApiPullSummary {
    number: u64,
    user: Option<ApiUser>,
    head: ApiHead,
}

#[derive(Deserialize)]
struct ApiPullDetail {
    number: u64,
    mergeable: Option<bool>,
    rebaseable: Option<bool>,
    mergeable_state: Option<String>,
    head: ApiHead,
}

#[derive(Deserialize)]
struct ApiComment {
    id: u64,
    body: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Convert a list item into our `PullRequest`, falling back to the polled
/// repository when the head repository is gone
fn pr_from_summary(pr: ApiPullSummary, polled: &Repository) -> PullRequest {
    let (repo_name, repo_full_name) = pr.head.repo.map_or_else(
        || (polled.name.clone(), polled.full_name()),
        |r| (r.name, r.full_name),
    );

    PullRequest {
        number: pr.number,
        author: pr.user.map(|u| u.login).unwrap_or_default(),
        head: PrHead {
            ref_name: pr.head.ref_field,
            sha: pr.head.sha,
            repo_name,
            repo_full_name,
        },
    }
}

/// URL of the `rel="next"` page in a `Link` header, if any
///
/// GitHub formats the header as `<url>; rel="next", <url>; rel="last"`.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim().replace(' ', "") == "rel=\"next\"");
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

/// Encode a branch name for use in a `git/refs/heads/...` path, keeping `/`
/// as a separator
fn encode_branch(branch: &str) -> String {
    branch
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// GitHub service using the REST API directly
pub struct GitHubService {
    /// Token sent as `Authorization: token <value>`
    token: String,
    /// HTTP client for all requests
    http_client: Client,
    /// API base URL without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `api_base` is `None` for api.github.com, or the REST root of a
    /// GitHub Enterprise host (e.g. `https://ghe.example.com/api/v3`).
    pub fn new(token: &str, api_base: Option<&str>) -> Result<Self> {
        let api_base = api_base.unwrap_or(DEFAULT_API_URL);
        let parsed = url::Url::parse(api_base)
            .map_err(|e| Error::Config(format!("invalid API URL {api_base}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API URL must be http(s), got {api_base}"
            )));
        }

        let http_client = Client::builder()
            .user_agent("pr-autopilot")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            token: token.to_string(),
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// API base URL in use
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build an authenticated request for an API path
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_url(method, &format!("{}{path}", self.api_base))
    }

    /// Build an authenticated request for an absolute URL
    fn request_url(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Send a request and decode a JSON body, mapping non-success statuses
    /// to `Error::GitHubApi`
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = builder.send().await?;
        let response = Self::ensure_success(response, what).await?;
        response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse {what}: {e}")))
    }

    /// GET a list endpoint and follow `Link: rel="next"` until the last page
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut builder = self.request(Method::GET, path).query(query);
        let mut page = 1u32;

        loop {
            let response = Self::ensure_success(builder.send().await?, what).await?;
            let next = next_page_url(response.headers());
            let batch: Vec<T> = response
                .json()
                .await
                .map_err(|e| Error::GitHubApi(format!("Failed to parse {what}: {e}")))?;
            debug!(page, count = batch.len(), "fetched {what} page");
            items.extend(batch);

            let Some(url) = next else {
                return Ok(items);
            };
            // Never send the token anywhere but the configured API host
            if !url.starts_with(&format!("{}/", self.api_base)) {
                return Err(Error::GitHubApi(format!(
                    "{what}: next page {url} is outside {}",
                    self.api_base
                )));
            }
            builder = self.request_url(Method::GET, &url);
            page += 1;
        }
    }

    async fn ensure_success(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = Self::error_message(response).await;
        Err(Error::GitHubApi(format!("{what} failed ({status}): {message}")))
    }

    /// Pull GitHub's `message` out of an error body, or fall back to the raw text
    async fn error_message(response: Response) -> String {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(text)
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_open_prs(&self, repo: &Repository) -> Result<Vec<PullRequest>> {
        debug!(repo = %repo, "listing open PRs");

        let path = format!("/repos/{}/{}/pulls", repo.owner, repo.name);
        let prs: Vec<ApiPullSummary> = self
            .get_all_pages(
                &path,
                &[("state", "open"), ("per_page", PER_PAGE)],
                "list pull requests",
            )
            .await?;

        let result: Vec<PullRequest> = prs
            .into_iter()
            .map(|pr| pr_from_summary(pr, repo))
            .collect();
        debug!(repo = %repo, count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn list_pr_comments(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> Result<Vec<PrComment>> {
        debug!(repo_full_name, pr_number, "listing PR comments");

        let path = format!("/repos/{repo_full_name}/issues/{pr_number}/comments");
        let comments: Vec<ApiComment> = self
            .get_all_pages(&path, &[("per_page", PER_PAGE)], "list comments")
            .await?;

        let result: Vec<PrComment> = comments
            .into_iter()
            .map(|c| PrComment {
                id: c.id,
                body: c.body.unwrap_or_default(),
            })
            .collect();
        debug!(pr_number, count = result.len(), "listed PR comments");
        Ok(result)
    }

    async fn get_pr_details(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> Result<PullRequestDetails> {
        debug!(repo_full_name, pr_number, "getting PR details");

        let path = format!("/repos/{repo_full_name}/pulls/{pr_number}");
        let pr: ApiPullDetail = self
            .send_json(self.request(Method::GET, &path), "get pull request")
            .await?;

        let details = PullRequestDetails {
            number: pr.number,
            mergeable: pr.mergeable,
            rebaseable: pr.rebaseable,
            mergeable_state: pr
                .mergeable_state
                .as_deref()
                .map_or(MergeableState::Unknown, MergeableState::parse),
            head_sha: pr.head.sha,
        };

        debug!(
            pr_number,
            state = %details.mergeable_state,
            mergeable = ?details.mergeable,
            rebaseable = ?details.rebaseable,
            "got PR details"
        );
        Ok(details)
    }

    async fn merge_pr(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        request: &MergeRequest,
    ) -> Result<MergeResult> {
        debug!(repo_full_name, pr_number, method = %request.method, "merging PR");

        let path = format!("/repos/{repo_full_name}/pulls/{pr_number}/merge");
        let response = self.request(Method::PUT, &path).json(request).send().await?;

        // 405: not mergeable, 409: head moved, 422: validation failed
        let result = match response.status() {
            status if status.is_success() => response
                .json::<MergeResult>()
                .await
                .map_err(|e| Error::GitHubApi(format!("Failed to parse merge result: {e}")))?,
            StatusCode::METHOD_NOT_ALLOWED
            | StatusCode::CONFLICT
            | StatusCode::UNPROCESSABLE_ENTITY => MergeResult {
                merged: false,
                message: Some(Self::error_message(response).await),
            },
            status => {
                let message = Self::error_message(response).await;
                return Err(Error::GitHubApi(format!(
                    "merge pull request failed ({status}): {message}"
                )));
            }
        };

        debug!(pr_number, merged = result.merged, "merge complete");
        Ok(result)
    }

    async fn delete_branch(&self, repo_full_name: &str, branch: &str) -> Result<()> {
        debug!(repo_full_name, branch, "deleting branch");

        let path = format!(
            "/repos/{repo_full_name}/git/refs/heads/{}",
            encode_branch(branch)
        );
        let response = self.request(Method::DELETE, &path).send().await?;
        Self::ensure_success(response, "delete branch").await?;

        debug!(branch, "deleted branch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_branch_keeps_slashes() {
        assert_eq!(encode_branch("feature/x y"), "feature/x%20y");
        assert_eq!(encode_branch("plain"), "plain");
    }

    #[test]
    fn test_next_page_url_picks_rel_next() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            "<https://api.github.com/repositories/1/issues/7/comments?page=2>; rel=\"next\", \
             <https://api.github.com/repositories/1/issues/7/comments?page=4>; rel=\"last\""
                .parse()
                .unwrap(),
        );
        assert_eq!(
            next_page_url(&headers).as_deref(),
            Some("https://api.github.com/repositories/1/issues/7/comments?page=2")
        );
    }

    #[test]
    fn test_next_page_url_absent_on_last_page() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page_url(&headers), None);

        headers.insert(
            LINK,
            "<https://api.github.com/x?page=1>; rel=\"prev\", <https://api.github.com/x?page=1>; rel=\"first\""
                .parse()
                .unwrap(),
        );
        assert_eq!(next_page_url(&headers), None);
    }

    #[test]
    fn test_new_rejects_non_http_base() {
        assert!(matches!(
            GitHubService::new("t", Some("ftp://example.com")),
            Err(Error::Config(_))
        ));
        assert!(GitHubService::new("t", Some("not a url")).is_err());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let service = GitHubService::new("t", Some("https://ghe.example.com/api/v3/")).unwrap();
        assert_eq!(service.api_base(), "https://ghe.example.com/api/v3");
    }
}
