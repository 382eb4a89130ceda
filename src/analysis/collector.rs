use super::{
    filters, sampler, AnalysisLimits, ContentSample, FileKind, FileProvider, FileRecord, SkipReason,
    SourceEntry,
};
use crate::error::AnalyzerError;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files and directories under a local root.
pub struct LocalSource {
    root: PathBuf,
    limits: AnalysisLimits,
}

impl LocalSource {
    pub fn new<P: AsRef<Path>>(root: P, limits: AnalysisLimits) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            limits,
        }
    }
}

pub(crate) fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[async_trait]
impl FileProvider for LocalSource {
    async fn list_entries(&self, dir: &str) -> Result<Vec<SourceEntry>, AnalyzerError> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(self.root.join(dir))? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(dir, "Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let (kind, size) = if file_type.is_dir() {
                (FileKind::Directory, 0)
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(metadata) => (FileKind::File, metadata.len()),
                    Err(e) => {
                        debug!(name = %name, "Unable to stat file: {}", e);
                        continue;
                    }
                }
            } else {
                continue;
            };

            entries.push(SourceEntry {
                path: join_relative(dir, &name),
                name,
                kind,
                size,
                download_url: None,
            });
        }

        Ok(entries)
    }

    fn should_include(&self, entry: &SourceEntry) -> Result<(), SkipReason> {
        sampler::eligibility(&entry.name, entry.size, &self.limits)
    }

    async fn fetch_content(&self, entry: &SourceEntry) -> ContentSample {
        sampler::read_sample(&self.root.join(&entry.path), &entry.name, &self.limits)
    }
}

/// Moves important files ahead of their siblings, keeping relative order otherwise.
pub fn prioritize(entries: &mut [SourceEntry]) {
    entries.sort_by_key(|entry| !filters::is_important(&entry.name));
}

/// Work left to do: entries waiting to be visited, each tagged with the
/// depth of the listing it came from. The top of the stack is visited next.
struct Pending {
    stack: Vec<(SourceEntry, usize)>,
}

impl Pending {
    fn push_listing(&mut self, mut entries: Vec<SourceEntry>, depth: usize) {
        entries.retain(|entry| !filters::should_exclude(&entry.path));
        prioritize(&mut entries);
        self.stack
            .extend(entries.into_iter().rev().map(|entry| (entry, depth)));
    }
}

#[derive(Default)]
struct Collected {
    records: Vec<FileRecord>,
    files: usize,
}

/// Depth-first, priority-ordered collection of up to `max_files` file
/// records. Directory records are emitted as they are entered and do not
/// count towards the cap; once the cap is reached nothing else is visited.
///
/// Only a failure to list the root itself is an error.
pub async fn collect<P>(source: &P, limits: &AnalysisLimits) -> Result<Vec<FileRecord>, AnalyzerError>
where
    P: FileProvider + ?Sized,
{
    let mut pending = Pending { stack: Vec::new() };
    let mut collected = Collected::default();

    pending.push_listing(source.list_entries("").await?, 0);

    while let Some((entry, depth)) = pending.stack.pop() {
        if collected.files >= limits.max_files {
            break;
        }

        match entry.kind {
            FileKind::File => {
                let sample = source.sample(&entry).await;
                collected.records.push(FileRecord::file(&entry, sample));
                collected.files += 1;
            }
            FileKind::Directory => {
                collected.records.push(FileRecord::directory(&entry));

                if depth + 1 > limits.max_collect_depth {
                    continue;
                }
                match source.list_entries(&entry.path).await {
                    Ok(children) => pending.push_listing(children, depth + 1),
                    Err(e) => debug!(dir = %entry.path, "Skipping unreadable directory: {}", e),
                }
            }
        }
    }

    Ok(collected.records)
}
