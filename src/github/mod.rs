use crate::analysis::FileRecord;
use crate::error::AnalyzerError;
use crate::retry::{with_retries, RetryPolicy};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

mod source;

#[cfg(test)]
mod tests;

pub use source::GithubSource;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteLimits {
    /// Once a listing holds this many records, further directories are skipped.
    pub max_files: usize,
    /// Records kept from each recursive sub-listing.
    pub per_directory: usize,
    /// Files smaller than this are always fetched.
    pub small_file_bytes: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for RemoteLimits {
    fn default() -> Self {
        Self {
            max_files: 50,
            per_directory: 20,
            small_file_bytes: 10_000,
            max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// A public repository and the files collected from it.
#[derive(Debug, Clone, Serialize)]
pub struct Repository {
    pub name: String,
    pub description: String,
    pub language: String,
    pub stars: u64,
    pub forks: u64,
    pub owner: String,
    pub url: String,
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    owner: RepoOwner,
    html_url: String,
    #[serde(default)]
    private: bool,
}

/// Extracts `(owner, repo)` from anything containing `github.com/<owner>/<repo>`.
pub fn parse_repository_url(url: &str) -> Result<(String, String), AnalyzerError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"github\.com/([^/]+)/([^/?#]+)").expect("valid repository pattern"));

    let caps = pattern
        .captures(url)
        .ok_or_else(|| AnalyzerError::InvalidRepositoryUrl(url.to_string()))?;

    let owner = caps[1].to_string();
    let repo = caps[2].strip_suffix(".git").unwrap_or(&caps[2]).to_string();
    if repo.is_empty() {
        return Err(AnalyzerError::InvalidRepositoryUrl(url.to_string()));
    }

    Ok((owner, repo))
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    retry: RetryPolicy,
    limits: RemoteLimits,
}

impl GithubClient {
    pub fn new(limits: RemoteLimits, token: Option<&str>) -> Result<Self, AnalyzerError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("gitguide"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AnalyzerError::Api(format!("Invalid GitHub token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: GITHUB_API_BASE.to_string(),
            retry: RetryPolicy::linear(
                limits.max_attempts,
                Duration::from_millis(limits.retry_delay_ms),
            ),
            limits,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn limits(&self) -> &RemoteLimits {
        &self.limits
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// GET with bounded retry. A 403 is treated as rate limiting and fails
    /// at once; any other non-success status is retried.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, AnalyzerError> {
        with_retries(&self.retry, AnalyzerError::is_retryable, || async {
            debug!(url, "GET");
            let response = self.http.get(url).send().await?;

            match response.status() {
                status if status.is_success() => Ok(response),
                StatusCode::FORBIDDEN => Err(AnalyzerError::RateLimited),
                status => Err(AnalyzerError::Api(
                    status
                        .canonical_reason()
                        .map(str::to_string)
                        .unwrap_or_else(|| status.to_string()),
                )),
            }
        })
        .await
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AnalyzerError> {
        self.get(url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AnalyzerError::Parse(e.to_string()))
    }

    /// Fetches repository metadata and a bounded file listing.
    /// Private repositories are rejected before anything is listed.
    pub async fn get_repository(&self, url: &str) -> Result<Repository, AnalyzerError> {
        let (owner, repo) = parse_repository_url(url)?;

        let metadata: RepoMetadata = self
            .get_json(&self.api_url(&format!("repos/{}/{}", owner, repo)))
            .await?;

        if metadata.private {
            return Err(AnalyzerError::PrivateRepository);
        }

        info!(owner = %owner, repo = %repo, "Collecting repository files");
        let source = GithubSource::new(self, &owner, &repo);
        let files = source.collect("").await?;

        Ok(Repository {
            name: metadata.name,
            description: metadata.description.unwrap_or_default(),
            language: metadata
                .language
                .unwrap_or_else(|| crate::analysis::project_info::UNKNOWN_LANGUAGE.to_string()),
            stars: metadata.stargazers_count,
            forks: metadata.forks_count,
            owner: metadata.owner.login,
            url: metadata.html_url,
            files,
        })
    }
}
