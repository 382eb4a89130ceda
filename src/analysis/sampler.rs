use super::{filters, AnalysisLimits, ContentSample, SkipReason};
use std::fs;
use std::path::Path;
use tracing::debug;

fn size_in_kb(size: u64) -> u64 {
    (size as f64 / 1024.0).round() as u64
}

/// Decides from name and size alone whether a local file should be read.
pub fn eligibility(name: &str, size: u64, limits: &AnalysisLimits) -> Result<(), SkipReason> {
    if size > limits.max_file_size {
        return Err(SkipReason::TooLarge {
            size_kb: size_in_kb(size),
        });
    }

    if !filters::is_text_candidate(name) {
        return Err(SkipReason::NotSampled);
    }

    Ok(())
}

pub fn is_binary(bytes: &[u8], probe_len: usize) -> bool {
    bytes.iter().take(probe_len).any(|&b| b == 0)
}

/// Turns raw file bytes into a sample: a binary placeholder, or text
/// truncated to `max_content_chars`.
pub fn sample_bytes(bytes: &[u8], name: &str, limits: &AnalysisLimits) -> ContentSample {
    if is_binary(bytes, limits.binary_probe_bytes) {
        let extension = Path::new(name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        return ContentSample::Skipped(SkipReason::Binary { extension });
    }

    let text = String::from_utf8_lossy(bytes);
    ContentSample::Captured(text.chars().take(limits.max_content_chars).collect())
}

pub fn read_sample(path: &Path, name: &str, limits: &AnalysisLimits) -> ContentSample {
    match fs::read(path) {
        Ok(bytes) => sample_bytes(&bytes, name, limits),
        Err(e) => {
            debug!(path = %path.display(), "Unable to read file: {}", e);
            ContentSample::Skipped(SkipReason::Unreadable)
        }
    }
}
