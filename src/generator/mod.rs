use crate::analysis::{FileRecord, ProjectData};
use crate::error::GenerationError;
use crate::github::Repository;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

mod gemini;

#[cfg(test)]
mod tests;

pub use gemini::GeminiGenerator;

/// Content-bearing files quoted in a prompt, in collection order.
const MAX_PROMPT_FILES: usize = 40;
const MAX_PROMPT_FILE_CHARS: usize = 2000;
const MAX_LISTED_PATHS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReadme {
    pub content: String,
    pub sections: Vec<String>,
}

impl GeneratedReadme {
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = strip_code_fence(&content.into());
        let sections = extract_sections(&content);
        Self { content, sections }
    }
}

/// What the generator is asked to describe.
#[derive(Debug, Clone, Copy)]
pub enum GenerationInput<'a> {
    Project(&'a ProjectData),
    Repository(&'a Repository),
}

impl GenerationInput<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Project(project) => &project.name,
            Self::Repository(repo) => &repo.name,
        }
    }

    pub fn files(&self) -> &[FileRecord] {
        match self {
            Self::Project(project) => &project.files,
            Self::Repository(repo) => &repo.files,
        }
    }
}

#[async_trait]
pub trait ReadmeGenerator: Send + Sync {
    async fn generate(&self, input: &GenerationInput<'_>) -> Result<GeneratedReadme, GenerationError>;
}

/// Heading texts (levels 1 to 3), in document order.
pub fn extract_sections(content: &str) -> Vec<String> {
    let mut in_fence = false;

    content
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                in_fence = !in_fence;
                return None;
            }
            if in_fence {
                return None;
            }

            let level = trimmed.chars().take_while(|c| *c == '#').count();
            if !(1..=3).contains(&level) {
                return None;
            }
            let rest = &trimmed[level..];
            if !rest.starts_with(' ') {
                return None;
            }
            let heading = rest.trim().trim_end_matches('#').trim();
            (!heading.is_empty()).then(|| heading.to_string())
        })
        .collect()
}

/// Models like to wrap the whole document in a ```markdown fence.
pub fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (`markdown`, `md`) on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim().to_string(),
        None => body.trim().to_string(),
    }
}

fn write_files(prompt: &mut String, files: &[FileRecord]) {
    prompt.push_str("\nFile tree:\n");
    for file in files.iter().take(MAX_LISTED_PATHS) {
        let suffix = if file.is_file() { "" } else { "/" };
        let _ = writeln!(prompt, "- {}{}", file.path, suffix);
    }
    if files.len() > MAX_LISTED_PATHS {
        let _ = writeln!(prompt, "- ... {} more", files.len() - MAX_LISTED_PATHS);
    }

    prompt.push_str("\nKey file contents:\n");
    for file in files
        .iter()
        .filter(|f| f.captured_content().is_some_and(|c| !c.trim().is_empty()))
        .take(MAX_PROMPT_FILES)
    {
        let content = file.captured_content().unwrap_or_default();
        let excerpt: String = content.chars().take(MAX_PROMPT_FILE_CHARS).collect();
        let _ = writeln!(prompt, "\n--- {} ---\n{}", file.path, excerpt);
    }
}

pub fn build_prompt(input: &GenerationInput<'_>) -> String {
    let mut prompt = String::from(
        "You are an expert technical writer. Write a complete, professional README.md \
         in GitHub-flavored Markdown for the project described below. Include a title, \
         a short description, features, installation, usage, project structure, \
         configuration where relevant, contributing and license sections. \
         Base every statement on the provided information and do not invent features.\n\n",
    );

    match input {
        GenerationInput::Project(project) => {
            let _ = writeln!(prompt, "Project name: {}", project.name);
            if !project.description.is_empty() {
                let _ = writeln!(prompt, "Description: {}", project.description);
            }
            let _ = writeln!(prompt, "Primary language: {}", project.language);
            let _ = writeln!(prompt, "Version: {}", project.version);
            let _ = writeln!(
                prompt,
                "Structure: {} files across {} directories",
                project.structure.files, project.structure.directories
            );
            let extensions: Vec<String> = project
                .top_extensions(10)
                .into_iter()
                .map(|(ext, count)| format!("{} ({})", ext, count))
                .collect();
            if !extensions.is_empty() {
                let _ = writeln!(prompt, "File types: {}", extensions.join(", "));
            }
        }
        GenerationInput::Repository(repo) => {
            let _ = writeln!(prompt, "Repository: {}/{}", repo.owner, repo.name);
            let _ = writeln!(prompt, "URL: {}", repo.url);
            if !repo.description.is_empty() {
                let _ = writeln!(prompt, "Description: {}", repo.description);
            }
            let _ = writeln!(prompt, "Primary language: {}", repo.language);
            let _ = writeln!(prompt, "Stars: {}, forks: {}", repo.stars, repo.forks);
        }
    }

    write_files(&mut prompt, input.files());
    prompt.push_str("\nRespond with the README content only.");
    prompt
}
