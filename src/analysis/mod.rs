use crate::error::AnalyzerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod collector;
pub mod filters;
pub mod project_info;
pub mod sampler;
pub mod structure;

#[cfg(test)]
mod tests;

pub use collector::LocalSource;
pub use project_info::ProjectInfo;
pub use structure::StructureSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

/// Why a file's content was not captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooLarge { size_kb: u64 },
    Binary { extension: String },
    Unreadable,
    /// Listed, but not a kind of file worth sampling.
    NotSampled,
    /// Remote download failed; contributes nothing.
    FetchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ContentSample {
    Captured(String),
    Skipped(SkipReason),
}

impl ContentSample {
    pub fn captured(&self) -> Option<&str> {
        match self {
            Self::Captured(text) => Some(text),
            Self::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Captured(_) => None,
            Self::Skipped(reason) => Some(reason),
        }
    }
}

impl fmt::Display for ContentSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Captured(text) => f.write_str(text),
            Self::Skipped(SkipReason::TooLarge { size_kb }) => {
                write!(f, "[File too large: {}KB]", size_kb)
            }
            Self::Skipped(SkipReason::Binary { extension }) => {
                write!(f, "[Binary file: {}]", extension)
            }
            Self::Skipped(SkipReason::Unreadable) => f.write_str("[Unable to read file content]"),
            Self::Skipped(SkipReason::NotSampled | SkipReason::FetchFailed) => Ok(()),
        }
    }
}

impl From<ContentSample> for String {
    fn from(sample: ContentSample) -> Self {
        sample.to_string()
    }
}

/// One entry of a collected file listing, local or remote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub name: String,
    /// Relative to the analysis root, `/`-separated.
    pub path: String,
    pub kind: FileKind,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentSample>,
}

impl FileRecord {
    pub fn directory(entry: &SourceEntry) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            kind: FileKind::Directory,
            size: 0,
            content: None,
        }
    }

    pub fn file(entry: &SourceEntry, sample: ContentSample) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            kind: FileKind::File,
            size: entry.size,
            content: Some(sample),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn captured_content(&self) -> Option<&str> {
        self.content.as_ref().and_then(ContentSample::captured)
    }
}

/// A raw listing entry as a [`FileProvider`] reports it, before sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    pub name: String,
    pub path: String,
    pub kind: FileKind,
    pub size: u64,
    /// Raw content location for remote entries.
    pub download_url: Option<String>,
}

/// Uniform access to a tree of files, whatever backs it.
#[async_trait]
pub trait FileProvider: Send + Sync {
    /// Lists the direct children of `dir` (`""` is the root).
    async fn list_entries(&self, dir: &str) -> Result<Vec<SourceEntry>, AnalyzerError>;

    /// Decides whether a file's content should be fetched at all.
    fn should_include(&self, entry: &SourceEntry) -> Result<(), SkipReason>;

    /// Fetches and samples content. Never fails; problems become a skip reason.
    async fn fetch_content(&self, entry: &SourceEntry) -> ContentSample;

    async fn sample(&self, entry: &SourceEntry) -> ContentSample {
        match self.should_include(entry) {
            Ok(()) => self.fetch_content(entry).await,
            Err(reason) => ContentSample::Skipped(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisLimits {
    /// Maximum number of file records collected.
    pub max_files: usize,
    /// Files above this size are listed with a placeholder and never read.
    pub max_file_size: u64,
    pub max_collect_depth: usize,
    pub max_structure_depth: usize,
    /// Leading bytes inspected for a NUL when deciding a file is binary.
    pub binary_probe_bytes: usize,
    pub max_content_chars: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_files: 200,
            max_file_size: 100 * 1024,
            max_collect_depth: 8,
            max_structure_depth: 10,
            binary_probe_bytes: 1024,
            max_content_chars: 5000,
        }
    }
}

/// Everything handed to the generation step for a local project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectData {
    pub path: PathBuf,
    pub name: String,
    pub description: String,
    pub language: String,
    pub version: String,
    pub files: Vec<FileRecord>,
    pub structure: StructureSummary,
}

impl ProjectData {
    pub fn new(path: PathBuf, info: ProjectInfo, files: Vec<FileRecord>, structure: StructureSummary) -> Self {
        Self {
            path,
            name: info.name,
            description: info.description,
            language: info.language,
            version: info.version,
            files,
            structure,
        }
    }

    /// Most frequent extensions first, ties broken alphabetically.
    pub fn top_extensions(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut exts: Vec<(&str, usize)> = self
            .structure
            .languages
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        exts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        exts.truncate(limit);
        exts
    }
}

pub struct ProjectAnalyzer {
    root_path: PathBuf,
    limits: AnalysisLimits,
}

impl ProjectAnalyzer {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_limits(path, AnalysisLimits::default())
    }

    pub fn with_limits<P: AsRef<Path>>(path: P, limits: AnalysisLimits) -> Self {
        Self {
            root_path: path.as_ref().to_path_buf(),
            limits,
        }
    }

    pub async fn analyze(&self) -> Result<ProjectData, AnalyzerError> {
        if !self.root_path.is_dir() {
            return Err(AnalyzerError::DirectoryNotFound(self.root_path.clone()));
        }

        info!(root = %self.root_path.display(), "Analyzing directory structure");
        let structure = structure::summarize(&self.root_path, self.limits.max_structure_depth);

        let source = LocalSource::new(&self.root_path, self.limits.clone());
        let files = collector::collect(&source, &self.limits).await?;
        info!(
            files = files.len(),
            directories = structure.directories,
            "Directory analysis complete"
        );

        let info = project_info::extract(&self.root_path, &files);
        Ok(ProjectData::new(self.root_path.clone(), info, files, structure))
    }
}
