use super::source::is_expandable;
use super::{parse_repository_url, GithubClient, RemoteLimits};
use crate::analysis::{FileKind, SkipReason};
use crate::error::AnalyzerError;
use mockito::{Server, ServerGuard};
use serde_json::json;

fn test_client(server: &ServerGuard) -> GithubClient {
    let limits = RemoteLimits {
        retry_delay_ms: 1,
        ..RemoteLimits::default()
    };
    GithubClient::new(limits, None)
        .unwrap()
        .with_api_base(server.url())
}

fn repo_body(private: bool) -> String {
    json!({
        "name": "demo",
        "description": null,
        "language": "Rust",
        "stargazers_count": 42,
        "forks_count": 7,
        "owner": { "login": "octo" },
        "html_url": "https://github.com/octo/demo",
        "private": private
    })
    .to_string()
}

fn file_entry(server: &ServerGuard, path: &str, size: u64) -> serde_json::Value {
    let name = path.rsplit('/').next().unwrap();
    json!({
        "type": "file",
        "name": name,
        "path": path,
        "size": size,
        "download_url": format!("{}/raw/{}", server.url(), path)
    })
}

fn dir_entry(path: &str) -> serde_json::Value {
    let name = path.rsplit('/').next().unwrap();
    json!({ "type": "dir", "name": name, "path": path, "size": 0, "download_url": null })
}

#[test]
fn test_parse_repository_url() {
    assert_eq!(
        parse_repository_url("https://github.com/octo/demo").unwrap(),
        ("octo".to_string(), "demo".to_string())
    );
    assert_eq!(
        parse_repository_url("git@github.com/octo/demo.git").unwrap(),
        ("octo".to_string(), "demo".to_string())
    );
    assert_eq!(
        parse_repository_url("https://github.com/octo/demo/tree/main/src").unwrap(),
        ("octo".to_string(), "demo".to_string())
    );
    assert!(matches!(
        parse_repository_url("https://gitlab.com/octo/demo"),
        Err(AnalyzerError::InvalidRepositoryUrl(_))
    ));
    assert!(parse_repository_url("github.com/octo").is_err());
}

#[test]
fn test_only_conventional_source_directories_expand() {
    assert!(is_expandable("src"));
    assert!(is_expandable("Components"));
    assert!(is_expandable("api"));
    assert!(!is_expandable("docs"));
    assert!(!is_expandable("tests"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_private_repository_is_rejected_before_listing() {
    let mut server = Server::new_async().await;

    let repo = server
        .mock("GET", "/repos/octo/demo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(repo_body(true))
        .create_async()
        .await;
    let contents = server
        .mock("GET", "/repos/octo/demo/contents/")
        .expect(0)
        .create_async()
        .await;

    let result = test_client(&server)
        .get_repository("https://github.com/octo/demo")
        .await;

    assert!(matches!(result, Err(AnalyzerError::PrivateRepository)));
    repo.assert_async().await;
    contents.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_forbidden_fails_without_retrying() {
    let mut server = Server::new_async().await;

    let repo = server
        .mock("GET", "/repos/octo/demo")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;

    let result = test_client(&server)
        .get_repository("https://github.com/octo/demo")
        .await;

    assert!(matches!(result, Err(AnalyzerError::RateLimited)));
    repo.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_exhausts_retries() {
    let mut server = Server::new_async().await;

    let repo = server
        .mock("GET", "/repos/octo/demo")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let result = test_client(&server)
        .get_repository("https://github.com/octo/demo")
        .await;

    match result {
        Err(AnalyzerError::Api(reason)) => assert_eq!(reason, "Internal Server Error"),
        other => panic!("Expected API error, got {:?}", other),
    }
    repo.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repository_listing_is_bounded_and_selective() {
    let mut server = Server::new_async().await;

    let src_files: Vec<_> = (0..25)
        .map(|i| file_entry(&server, &format!("src/mod{:02}.rs", i), 20_000))
        .collect();
    let root = json!([
        file_entry(&server, "package.json", 300),
        file_entry(&server, "big.bin", 50_000),
        dir_entry("src"),
        dir_entry("docs"),
    ]);

    let _repo = server
        .mock("GET", "/repos/octo/demo")
        .with_status(200)
        .with_body(repo_body(false))
        .create_async()
        .await;
    let _root = server
        .mock("GET", "/repos/octo/demo/contents/")
        .with_status(200)
        .with_body(root.to_string())
        .create_async()
        .await;
    let _src = server
        .mock("GET", "/repos/octo/demo/contents/src")
        .with_status(200)
        .with_body(json!(src_files).to_string())
        .create_async()
        .await;
    let docs = server
        .mock("GET", "/repos/octo/demo/contents/docs")
        .expect(0)
        .create_async()
        .await;
    let _raw = server
        .mock("GET", "/raw/package.json")
        .with_status(200)
        .with_body(r#"{"name":"demo"}"#)
        .create_async()
        .await;

    let repository = test_client(&server)
        .get_repository("https://github.com/octo/demo")
        .await
        .unwrap();

    assert_eq!(repository.name, "demo");
    assert_eq!(repository.description, "");
    assert_eq!(repository.language, "Rust");
    assert_eq!(repository.stars, 42);
    assert_eq!(repository.owner, "octo");

    let files = &repository.files;
    assert_eq!(files[0].name, "package.json");
    assert_eq!(files[0].captured_content(), Some(r#"{"name":"demo"}"#));
    assert_eq!(
        files[1].content.as_ref().and_then(|c| c.skip_reason()),
        Some(&SkipReason::NotSampled)
    );
    assert_eq!(files[2].kind, FileKind::Directory);

    let under_src = files.iter().filter(|f| f.path.starts_with("src/")).count();
    assert_eq!(under_src, 20);
    assert_eq!(files.last().unwrap().path, "docs");
    assert_eq!(files.len(), 2 + 1 + 20 + 1);
    docs.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_sub_fetches_are_absorbed() {
    let mut server = Server::new_async().await;

    let root = json!([file_entry(&server, "README.md", 120_000), dir_entry("lib")]);

    let _repo = server
        .mock("GET", "/repos/octo/demo")
        .with_status(200)
        .with_body(repo_body(false))
        .create_async()
        .await;
    let _root = server
        .mock("GET", "/repos/octo/demo/contents/")
        .with_status(200)
        .with_body(root.to_string())
        .create_async()
        .await;
    let lib = server
        .mock("GET", "/repos/octo/demo/contents/lib")
        .with_status(404)
        .expect(3)
        .create_async()
        .await;
    let readme = server
        .mock("GET", "/raw/README.md")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;

    let repository = test_client(&server)
        .get_repository("https://github.com/octo/demo")
        .await
        .unwrap();

    let paths: Vec<_> = repository.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["README.md", "lib"]);
    assert_eq!(
        repository.files[0].content.as_ref().and_then(|c| c.skip_reason()),
        Some(&SkipReason::FetchFailed)
    );
    let readme_json = serde_json::to_value(&repository.files[0]).unwrap();
    assert_eq!(readme_json["content"], "");
    lib.assert_async().await;
    readme.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_download_contributes_empty_content() {
    let mut server = Server::new_async().await;

    let root = json!([file_entry(&server, "main.rs", 200)]);

    let _repo = server
        .mock("GET", "/repos/octo/demo")
        .with_status(200)
        .with_body(repo_body(false))
        .create_async()
        .await;
    let _root = server
        .mock("GET", "/repos/octo/demo/contents/")
        .with_status(200)
        .with_body(root.to_string())
        .create_async()
        .await;
    let raw = server
        .mock("GET", "/raw/main.rs")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let repository = test_client(&server)
        .get_repository("https://github.com/octo/demo")
        .await
        .unwrap();

    let main_rs = &repository.files[0];
    assert_eq!(main_rs.path, "main.rs");
    assert_eq!(main_rs.captured_content(), None);
    assert_eq!(serde_json::to_value(main_rs).unwrap()["content"], "");
    raw.assert_async().await;
}
