use super::*;
use crate::analysis::{ContentSample, FileKind, StructureSummary};
use crate::config::GeminiConfig;
use crate::retry::RetryPolicy;
use mockito::Server;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

fn sample_project() -> ProjectData {
    let mut structure = StructureSummary {
        files: 3,
        directories: 1,
        ..StructureSummary::default()
    };
    structure.languages.insert(".js".to_string(), 2);
    structure.languages.insert(".json".to_string(), 1);

    ProjectData {
        path: PathBuf::from("/work/demo"),
        name: "demo".to_string(),
        description: "A demo app".to_string(),
        language: "JavaScript/Next.js".to_string(),
        version: "0.2.0".to_string(),
        files: vec![
            FileRecord {
                name: "package.json".to_string(),
                path: "package.json".to_string(),
                kind: FileKind::File,
                size: 40,
                content: Some(ContentSample::Captured(r#"{"name":"demo"}"#.to_string())),
            },
            FileRecord {
                name: "src".to_string(),
                path: "src".to_string(),
                kind: FileKind::Directory,
                size: 0,
                content: None,
            },
        ],
        structure,
    }
}

fn test_config(url: String) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("test_key_that_is_long_enough".to_string()),
        model: "gemini-test".to_string(),
        api_url: Some(url),
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::linear(3, Duration::from_millis(1))
}

#[test]
fn test_extract_sections() {
    let content = "# Demo\n\nIntro\n\n## Installation\n\n```bash\n# not a heading\n```\n\n### Usage ##\n#### Too deep\n#NoSpace\n";
    assert_eq!(extract_sections(content), vec!["Demo", "Installation", "Usage"]);
}

#[test]
fn test_strip_code_fence() {
    assert_eq!(strip_code_fence("```markdown\n# Demo\n```"), "# Demo");
    assert_eq!(strip_code_fence("  # Demo\n"), "# Demo");
    assert_eq!(strip_code_fence("```\n# Demo\n```\n"), "# Demo");
}

#[test]
fn test_prompt_describes_project() {
    let project = sample_project();
    let prompt = build_prompt(&GenerationInput::Project(&project));

    assert!(prompt.contains("Project name: demo"));
    assert!(prompt.contains("Primary language: JavaScript/Next.js"));
    assert!(prompt.contains("3 files across 1 directories"));
    assert!(prompt.contains(".js (2)"));
    assert!(prompt.contains("- src/"));
    assert!(prompt.contains("--- package.json ---"));
}

#[test]
fn test_missing_api_key_is_rejected() {
    let config = GeminiConfig {
        api_key: None,
        ..GeminiConfig::default()
    };
    assert!(matches!(
        GeminiGenerator::new(&config),
        Err(GenerationError::ValidationError(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gemini_successful_response() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_header("x-goog-api-key", "test_key_that_is_long_enough")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "text": "```markdown\n# demo\n\n## Installation\n\nnpm i\n\n## Usage\n```" }]
                    }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let project = sample_project();
    let generator = GeminiGenerator::new(&test_config(server.url()))
        .unwrap()
        .with_retry(fast_retry());
    let readme = generator
        .generate(&GenerationInput::Project(&project))
        .await
        .unwrap();

    assert!(readme.content.starts_with("# demo"));
    assert_eq!(readme.sections, vec!["demo", "Installation", "Usage"]);
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gemini_unauthorized_is_not_retried() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let project = sample_project();
    let generator = GeminiGenerator::new(&test_config(server.url()))
        .unwrap()
        .with_retry(fast_retry());
    let result = generator.generate(&GenerationInput::Project(&project)).await;

    assert!(matches!(result, Err(GenerationError::AuthenticationError(_))));
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gemini_rate_limit_is_retried() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let project = sample_project();
    let generator = GeminiGenerator::new(&test_config(server.url()))
        .unwrap()
        .with_retry(fast_retry());
    let result = generator.generate(&GenerationInput::Project(&project)).await;

    assert!(matches!(result, Err(GenerationError::RateLimitError(_))));
    mock.assert_async().await;
}
