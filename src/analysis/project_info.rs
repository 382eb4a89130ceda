use super::FileRecord;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::debug;

pub const UNKNOWN_LANGUAGE: &str = "Unknown";
pub const DEFAULT_VERSION: &str = "1.0.0";

const PACKAGE_MANIFEST: &str = "package.json";
const NODE_RUNTIME: &str = "JavaScript/Node.js";

/// Checked in order; the first dependency found decides the label.
const UI_FRAMEWORKS: &[(&str, &str)] = &[
    ("react", "JavaScript/React"),
    ("vue", "JavaScript/Vue"),
    ("next", "JavaScript/Next.js"),
];

/// Ecosystem marker files, in priority order. A match overrides whatever
/// the package manifest suggested.
const MARKER_FILES: &[(&[&str], &str)] = &[
    (&["requirements.txt", "setup.py"], "Python"),
    (&["Cargo.toml"], "Rust"),
    (&["go.mod"], "Go"),
    (&["pom.xml", "build.gradle"], "Java"),
    (&["Gemfile"], "Ruby"),
    (&["composer.json"], "PHP"),
];

/// Best-effort identity of a project. Never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub description: String,
    pub language: String,
    pub version: String,
}

impl ProjectInfo {
    pub fn defaults_for(root: &Path) -> Self {
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        Self {
            name,
            description: String::new(),
            language: UNKNOWN_LANGUAGE.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

fn non_empty_str<'a>(manifest: &'a JsonValue, key: &str) -> Option<&'a str> {
    manifest
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

fn has_dependency(manifest: &JsonValue, name: &str) -> bool {
    ["dependencies", "devDependencies"].iter().any(|section| {
        manifest
            .get(section)
            .and_then(|deps| deps.get(name))
            .map(is_truthy)
            .unwrap_or(false)
    })
}

/// Language label implied by a parsed package manifest.
pub fn classify_manifest(manifest: &JsonValue) -> &'static str {
    UI_FRAMEWORKS
        .iter()
        .find(|(dependency, _)| has_dependency(manifest, dependency))
        .map(|(_, label)| *label)
        .unwrap_or(NODE_RUNTIME)
}

fn apply_manifest(info: &mut ProjectInfo, manifest: &JsonValue) {
    if let Some(name) = non_empty_str(manifest, "name") {
        info.name = name.to_string();
    }
    if let Some(description) = non_empty_str(manifest, "description") {
        info.description = description.to_string();
    }
    if let Some(version) = non_empty_str(manifest, "version") {
        info.version = version.to_string();
    }
    info.language = classify_manifest(manifest).to_string();
}

pub fn marker_language(files: &[FileRecord]) -> Option<&'static str> {
    MARKER_FILES
        .iter()
        .find(|(markers, _)| {
            files
                .iter()
                .any(|f| f.is_file() && markers.contains(&f.name.as_str()))
        })
        .map(|(_, label)| *label)
}

/// Infers name, description, language and version from collected files.
/// Malformed manifests leave the defaults in place.
pub fn extract(root: &Path, files: &[FileRecord]) -> ProjectInfo {
    let mut info = ProjectInfo::defaults_for(root);

    let manifest = files
        .iter()
        .find(|f| f.is_file() && f.name == PACKAGE_MANIFEST)
        .and_then(FileRecord::captured_content);

    if let Some(content) = manifest {
        match serde_json::from_str::<JsonValue>(content) {
            Ok(parsed) => apply_manifest(&mut info, &parsed),
            Err(e) => debug!("Ignoring unparseable {}: {}", PACKAGE_MANIFEST, e),
        }
    }

    if let Some(language) = marker_language(files) {
        info.language = language.to_string();
    }

    info
}
