use regex::RegexSet;
use std::path::Path;
use std::sync::OnceLock;

/// Path fragments that drop an entry (and everything beneath it) from analysis.
/// Matched anywhere in the path relative to the analysis root.
const EXCLUDE_PATTERNS: &[&str] = &[
    r"node_modules",
    r"\.git",
    r"dist",
    r"build",
    r"coverage",
    r"\.next",
    r"\.nuxt",
    r"\.cache",
    r"\.vscode",
    r"\.idea",
    r"\.DS_Store",
    r"\.env\.local",
    r"\.env\.production",
    r"package-lock\.json",
    r"yarn\.lock",
    r"pnpm-lock\.yaml",
    r"composer\.lock",
    r"Pipfile\.lock",
    r"poetry\.lock",
    r"\.pyc$",
    r"\.log$",
    r"\.tmp$",
    r"\.temp$",
];

/// Manifest and build-config names: listed first and always sampled.
pub const IMPORTANT_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "next.config.js",
    "vite.config.js",
    "webpack.config.js",
    "tailwind.config.js",
    "requirements.txt",
    "Pipfile",
    "pyproject.toml",
    "setup.py",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Gemfile",
    "composer.json",
    "Dockerfile",
    "docker-compose.yml",
    ".env.example",
    "config.js",
    "config.json",
];

const TEXT_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".jsx", ".tsx", ".vue", ".svelte",
    ".py", ".rb", ".php", ".go", ".rs", ".java", ".c", ".cpp", ".h", ".hpp",
    ".css", ".scss", ".sass", ".less", ".styl",
    ".html", ".htm", ".xml", ".svg",
    ".json", ".yaml", ".yml", ".toml", ".ini", ".conf",
    ".md", ".txt", ".rst", ".adoc",
    ".sh", ".bash", ".zsh", ".fish",
    ".sql", ".graphql", ".gql",
    ".dockerfile", ".gitignore", ".gitattributes",
];

const ENV_FILE_PREFIX: &str = ".env";

fn exclude_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| RegexSet::new(EXCLUDE_PATTERNS).expect("exclude patterns are valid regexes"))
}

pub fn should_exclude(relative_path: &str) -> bool {
    exclude_set().is_match(relative_path)
}

pub fn is_important(name: &str) -> bool {
    IMPORTANT_FILES.contains(&name)
}

/// Lowercased extension with its leading dot (`".rs"`), or `None` for
/// extensionless names and dotfiles such as `.env`.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

/// Whether a file's text is worth reading, judged by name alone.
pub fn is_text_candidate(name: &str) -> bool {
    if is_important(name) {
        return true;
    }

    let by_extension = extension_of(name)
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    by_extension || name.starts_with(ENV_FILE_PREFIX)
}
