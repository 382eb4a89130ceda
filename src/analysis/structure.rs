use super::filters;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Uncapped counts over the whole (non-excluded) tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureSummary {
    pub files: usize,
    pub directories: usize,
    /// Extension (`".rs"`) to number of files carrying it.
    pub languages: BTreeMap<String, usize>,
}

pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn is_excluded(root: &Path, entry: &DirEntry) -> bool {
    entry.depth() > 0 && filters::should_exclude(&relative_path(root, entry.path()))
}

/// Walks `root` and counts every non-excluded entry down to `max_depth`
/// directory levels below it. Unreadable directories are skipped.
pub fn summarize(root: &Path, max_depth: usize) -> StructureSummary {
    let mut summary = StructureSummary::default();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth + 1)
        .into_iter()
        .filter_entry(|entry| !is_excluded(root, entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            summary.directories += 1;
        } else if file_type.is_file() {
            summary.files += 1;
            if let Some(ext) = entry.file_name().to_str().and_then(filters::extension_of) {
                *summary.languages.entry(ext).or_insert(0) += 1;
            }
        }
    }

    summary
}
