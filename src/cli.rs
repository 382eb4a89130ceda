use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gitguide",
    version,
    about = "AI-powered README generator for any project directory"
)]
pub struct Cli {
    /// Log analysis details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set your Gemini API key
    Config,
    /// Generate a README for a local directory
    #[command(alias = "gen")]
    Generate(GenerateArgs),
    /// Generate a README for a public GitHub repository
    Remote(RemoteArgs),
    /// Analyze a directory without generating anything
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Target directory
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Output filename, relative to the target directory
    #[arg(short, long, default_value = "README.md")]
    pub output: PathBuf,

    /// Overwrite an existing output file without asking
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct RemoteArgs {
    /// Repository URL, e.g. https://github.com/owner/repo
    pub url: String,

    /// Output filename
    #[arg(short, long, default_value = "README.md")]
    pub output: PathBuf,

    /// Overwrite an existing output file without asking
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Target directory
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Print the full analysis as JSON
    #[arg(long)]
    pub json: bool,
}
