use crate::analysis::{ProjectAnalyzer, ProjectData};
use crate::cli::{AnalyzeArgs, Cli, Command, GenerateArgs, RemoteArgs};
use crate::config::{self, Config};
use crate::error::AnalyzerError;
use crate::generator::{GeminiGenerator, GeneratedReadme, GenerationInput, ReadmeGenerator};
use crate::github::GithubClient;
use anyhow::{bail, Context, Result};
use colored::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const PREVIEW_CHARS: usize = 500;
const API_KEY_PROMPT: &str = "Enter your Gemini API key (input is visible): ";

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = config::get_config_path()?;

    let mut config = Config::load_or_default(&config_path);
    config.apply_env_overrides();

    match cli.command {
        Command::Config => configure(&config_path),
        Command::Generate(args) => generate(args, &config).await,
        Command::Remote(args) => remote(args, &config).await,
        Command::Analyze(args) => analyze(args, &config).await,
    }
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(question: &str, default: bool) -> Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let answer = read_line(&format!("{} {} ", question, hint))?;

    Ok(match answer.to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    })
}

fn require_api_key(config: &Config) -> Result<()> {
    if config.api_key().is_none() {
        println!("{}", "Gemini API key not found.".yellow());
        println!(
            "{} {} {}",
            "Run".blue(),
            "gitguide config".cyan(),
            "to set your API key first.".blue()
        );
        bail!("Gemini API key not configured");
    }
    Ok(())
}

/// False when the user declines to overwrite an existing file.
fn may_write(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        let question = format!("{} already exists. Overwrite?", path.display());
        if !confirm(&question, false)? {
            println!("{}", "Operation cancelled.".blue());
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn preview(content: &str, limit: usize) -> String {
    let mut shown: String = content.chars().take(limit).collect();
    if content.chars().count() > limit {
        shown.push_str("\n...(truncated)");
    }
    shown
}

fn write_readme(path: &Path, readme: &GeneratedReadme) -> Result<()> {
    fs::write(path, &readme.content).with_context(|| format!("Failed to write {:?}", path))?;

    println!("\n{}", "README generated successfully!".green().bold());
    println!("{} {}", "Location:".blue(), path.display().to_string().cyan());
    println!("{} {}", "Sections:".blue(), readme.sections.join(", ").dimmed());

    if confirm("Would you like to view the generated README?", true)? {
        let rule = "─".repeat(80);
        println!("\n{}\n", "Generated README Preview:".blue());
        println!("{}", rule.dimmed());
        println!("{}", preview(&readme.content, PREVIEW_CHARS));
        println!("{}", rule.dimmed());
    }
    Ok(())
}

fn resolve_directory(directory: &Path) -> Result<PathBuf, AnalyzerError> {
    match directory.canonicalize() {
        Ok(path) if path.is_dir() => Ok(path),
        _ => Err(AnalyzerError::DirectoryNotFound(directory.to_path_buf())),
    }
}

async fn analyze_directory(directory: &Path, config: &Config) -> Result<ProjectData> {
    let analyzer = ProjectAnalyzer::with_limits(directory, config.analysis.clone());
    Ok(analyzer.analyze().await?)
}

async fn generate(args: GenerateArgs, config: &Config) -> Result<()> {
    require_api_key(config)?;

    let target_dir = resolve_directory(&args.directory)?;
    let output_path = target_dir.join(&args.output);
    if !may_write(&output_path, args.force)? {
        return Ok(());
    }

    println!("{}", "\nGitGuide - Generating README\n".blue().bold());
    println!("Target directory: {}", target_dir.display().to_string().cyan());
    println!("Output file: {}", output_path.display().to_string().cyan());

    println!("Analyzing directory structure...");
    let project = analyze_directory(&target_dir, config).await?;
    let file_count = project.files.iter().filter(|f| f.is_file()).count();
    println!("{}", "Directory analysis complete".green());
    println!(
        "{}",
        format!(
            "Found {} files across {} directories",
            file_count, project.structure.directories
        )
        .dimmed()
    );

    println!("Generating README with AI...");
    let generator = GeminiGenerator::new(&config.gemini)?;
    let readme = generator
        .generate(&GenerationInput::Project(&project))
        .await
        .context("Failed to generate README")?;
    println!("{}", "README content generated".green());

    write_readme(&output_path, &readme)
}

async fn remote(args: RemoteArgs, config: &Config) -> Result<()> {
    require_api_key(config)?;

    if !may_write(&args.output, args.force)? {
        return Ok(());
    }

    println!("{}", "\nGitGuide - Generating README\n".blue().bold());
    println!("Repository: {}", args.url.cyan());

    println!("Fetching repository...");
    let client = GithubClient::new(config.remote.clone(), config.github.token.as_deref())?;
    let repository = client.get_repository(&args.url).await?;
    println!(
        "{}",
        format!(
            "Collected {} entries from {}/{}",
            repository.files.len(),
            repository.owner,
            repository.name
        )
        .dimmed()
    );

    println!("Generating README with AI...");
    let generator = GeminiGenerator::new(&config.gemini)?;
    let readme = generator
        .generate(&GenerationInput::Repository(&repository))
        .await
        .context("Failed to generate README")?;

    write_readme(&args.output, &readme)
}

async fn analyze(args: AnalyzeArgs, config: &Config) -> Result<()> {
    let target_dir = resolve_directory(&args.directory)?;
    let project = analyze_directory(&target_dir, config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    println!("{} {}", "Project:".blue().bold(), project.name);
    if !project.description.is_empty() {
        println!("{} {}", "Description:".blue(), project.description);
    }
    println!("{} {}", "Language:".blue(), project.language);
    println!("{} {}", "Version:".blue(), project.version);
    println!(
        "{} {} files, {} directories",
        "Structure:".blue(),
        project.structure.files,
        project.structure.directories
    );

    let extensions: Vec<String> = project
        .top_extensions(8)
        .into_iter()
        .map(|(ext, count)| format!("{} {}", ext, count))
        .collect();
    if !extensions.is_empty() {
        println!("{} {}", "File types:".blue(), extensions.join(", "));
    }
    println!(
        "{} {} records",
        "Collected:".blue(),
        project.files.len()
    );
    Ok(())
}

fn configure(config_path: &Path) -> Result<()> {
    println!("{}", "\nGitGuide Configuration\n".blue().bold());

    let mut config = Config::load_or_default(config_path);

    if let Some(current) = config.api_key() {
        println!(
            "{} {}",
            "Current API key:".green(),
            config::mask_api_key(current).dimmed()
        );
        if !confirm("Do you want to update your API key?", false)? {
            println!("{}", "Configuration unchanged.".blue());
            return Ok(());
        }
    }

    println!(
        "Get your Gemini API key at: {}",
        "https://makersuite.google.com/app/apikey".cyan()
    );
    println!("{}", "Your API key will be stored locally and never shared.\n".dimmed());

    let api_key = loop {
        let input = read_line(API_KEY_PROMPT)?;
        match config::validate_api_key(&input) {
            Ok(()) => break input,
            Err(message) => println!("{}", message.red()),
        }
    };

    config.set_api_key(&api_key);
    config.save(config_path)?;

    println!("{}", "\nAPI key saved successfully!".green());
    println!(
        "{} {} {}",
        "You can now run".blue(),
        "gitguide generate".cyan(),
        "to create README files.".blue()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "a".repeat(600);
        let shown = preview(&long, 500);
        let body = shown
            .strip_suffix("\n...(truncated)")
            .expect("truncation marker");
        assert_eq!(body.chars().count(), 500);

        assert_eq!(preview("short", 500), "short");
    }

    #[test]
    fn test_api_key_prompt_warns_input_is_visible() {
        assert!(API_KEY_PROMPT.contains("input is visible"));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = resolve_directory(&missing).unwrap_err();
        assert!(matches!(err, AnalyzerError::DirectoryNotFound(_)));
        assert!(err.to_string().starts_with("Directory not found"));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(resolve_directory(&file).is_err());
    }
}
