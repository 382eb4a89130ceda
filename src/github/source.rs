use super::GithubClient;
use crate::analysis::{ContentSample, FileKind, FileProvider, FileRecord, SkipReason, SourceEntry};
use crate::error::AnalyzerError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Names whose content is always worth fetching.
const IMPORTANT_FILES: &[&str] = &[
    "package.json", "requirements.txt", "Cargo.toml", "go.mod",
    "pom.xml", "Gemfile", "composer.json", "setup.py", "Dockerfile",
    "docker-compose.yml", ".env.example", "config.js", "config.json",
    "logo.png", "logo.svg", "logo.jpg", "logo.jpeg", "icon.png", "icon.svg",
    "brand.png", "brand.svg",
];

const IMPORTANT_NAME_FRAGMENTS: &[&str] = &["logo", "icon", "brand", "readme", "license"];

/// Only these directories are expanded; others are listed but not entered.
const EXPANDED_DIRECTORIES: &[&str] = &["src", "app", "lib", "components", "pages", "api"];

type CollectFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<FileRecord>, AnalyzerError>> + Send + 'a>>;

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    path: String,
    #[serde(default)]
    size: u64,
    download_url: Option<String>,
}

impl ContentsEntry {
    fn into_source_entry(self) -> Option<SourceEntry> {
        let kind = match self.kind.as_str() {
            "file" => FileKind::File,
            "dir" => FileKind::Directory,
            _ => return None,
        };

        Some(SourceEntry {
            name: self.name,
            path: self.path,
            kind,
            size: self.size,
            download_url: self.download_url,
        })
    }
}

pub fn is_expandable(dir_name: &str) -> bool {
    EXPANDED_DIRECTORIES.contains(&dir_name.to_lowercase().as_str())
}

/// The contents API of one repository, seen as a file tree.
pub struct GithubSource<'a> {
    client: &'a GithubClient,
    owner: String,
    repo: String,
}

impl<'a> GithubSource<'a> {
    pub fn new(client: &'a GithubClient, owner: &str, repo: &str) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Lists `path` and, depth first, the whitelisted directories beneath it.
    ///
    /// A directory is only recorded while this listing holds fewer than
    /// `max_files` records, so later directories lose out once earlier
    /// ones have filled the listing. Each sub-listing contributes at most
    /// `per_directory` records. Sub-listing failures are logged and skipped.
    pub fn collect<'s>(&'s self, path: &'s str) -> CollectFuture<'s> {
        Box::pin(async move {
            let limits = self.client.limits();
            let mut records = Vec::new();

            for entry in self.list_entries(path).await? {
                match entry.kind {
                    FileKind::File => {
                        let sample = self.sample(&entry).await;
                        records.push(FileRecord::file(&entry, sample));
                    }
                    FileKind::Directory if records.len() < limits.max_files => {
                        records.push(FileRecord::directory(&entry));

                        if !is_expandable(&entry.name) {
                            continue;
                        }
                        match self.collect(&entry.path).await {
                            Ok(sub_records) => {
                                records.extend(sub_records.into_iter().take(limits.per_directory))
                            }
                            Err(e) => warn!("Failed to fetch directory {}: {}", entry.path, e),
                        }
                    }
                    FileKind::Directory => debug!(dir = %entry.path, "Listing full, skipping directory"),
                }
            }

            Ok(records)
        })
    }
}

#[async_trait]
impl<'a> FileProvider for GithubSource<'a> {
    async fn list_entries(&self, dir: &str) -> Result<Vec<SourceEntry>, AnalyzerError> {
        let url = self
            .client
            .api_url(&format!("repos/{}/{}/contents/{}", self.owner, self.repo, dir));
        let listing: JsonValue = self.client.get_json(&url).await?;

        // A path naming a single file returns an object, not a listing.
        let JsonValue::Array(items) = listing else {
            return Ok(Vec::new());
        };

        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<ContentsEntry>(item).ok())
            .filter_map(ContentsEntry::into_source_entry)
            .collect())
    }

    fn should_include(&self, entry: &SourceEntry) -> Result<(), SkipReason> {
        let lower = entry.name.to_lowercase();
        let important = IMPORTANT_FILES.contains(&entry.name.as_str())
            || IMPORTANT_NAME_FRAGMENTS.iter().any(|frag| lower.contains(frag));

        if important || entry.size < self.client.limits().small_file_bytes {
            Ok(())
        } else {
            Err(SkipReason::NotSampled)
        }
    }

    async fn fetch_content(&self, entry: &SourceEntry) -> ContentSample {
        let Some(url) = entry.download_url.as_deref() else {
            return ContentSample::Skipped(SkipReason::FetchFailed);
        };

        let text = match self.client.get(url).await {
            Ok(response) => response.text().await.map_err(AnalyzerError::from),
            Err(e) => Err(e),
        };

        match text {
            Ok(text) => ContentSample::Captured(text),
            Err(e) => {
                warn!("Failed to fetch content for {}: {}", entry.path, e);
                ContentSample::Skipped(SkipReason::FetchFailed)
            }
        }
    }
}
