mod common;

use common::{issue, issues_body, temp_dir, test_config};
use issue_finder::cli::commands::{fetch, readme};
use issue_finder::infrastructure::credentials::ApiToken;
use issue_finder::services::ReadmeOutcome;
use mockito::{Matcher, Server};

const START: &str = "<!-- ISSUES:START -->";
const END: &str = "<!-- ISSUES:END -->";

#[tokio::test]
async fn test_fetch_then_readme_refresh() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/alpha/a/issues")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(issues_body(&[
            issue("alpha/a", 1, "Add | pipe support", "2024-04-01T08:00:00Z"),
            issue("alpha/a", 2, "Docs typo", "2024-04-02T08:00:00Z"),
        ]))
        .create_async()
        .await;

    let dir = temp_dir();
    let config = test_config(&server.url(), &["alpha/a"], dir.path());
    std::fs::write(
        &config.readme.path,
        format!("# Good first issues\n\n{START}\nplaceholder\n{END}\n\nContributing notes.\n"),
    )
    .unwrap();

    fetch::run_with_token(&config, ApiToken::new("ghp_readmetoken"), None, false)
        .await
        .unwrap();
    let outcome = readme::run(&config, None, None).unwrap();
    assert!(matches!(outcome, ReadmeOutcome::Updated { rows: 2, .. }));

    let text = std::fs::read_to_string(&config.readme.path).unwrap();
    assert!(text.starts_with("# Good first issues\n\n"));
    assert!(text.ends_with(&format!("{END}\n\nContributing notes.\n")));
    assert!(!text.contains("placeholder"));
    assert!(text.contains(r"[Add \| pipe support](https://github.com/alpha/a/issues/1)"));

    // Newest issue is listed first
    let docs = text.find("Docs typo").unwrap();
    let pipe = text.find("pipe support").unwrap();
    assert!(docs < pipe);
}

#[test]
fn test_readme_without_snapshot_is_a_noop() {
    let dir = temp_dir();
    let config = test_config("http://unused.invalid", &[], dir.path());
    std::fs::write(&config.readme.path, format!("{START}\n{END}\n")).unwrap();

    let outcome = readme::run(&config, None, None).unwrap();

    assert!(matches!(outcome, ReadmeOutcome::MissingSnapshot { .. }));
    assert_eq!(
        std::fs::read_to_string(&config.readme.path).unwrap(),
        format!("{START}\n{END}\n")
    );
}

#[test]
fn test_readme_path_overrides() {
    let dir = temp_dir();
    let config = test_config("http://unused.invalid", &[], dir.path());
    let snapshot = dir.path().join("elsewhere.csv");
    std::fs::write(&snapshot, "repository,title,url,created_at\n").unwrap();
    let other_readme = dir.path().join("OTHER.md");
    std::fs::write(&other_readme, format!("{START}{END}")).unwrap();

    let outcome = readme::run(&config, Some(snapshot), Some(other_readme.clone())).unwrap();

    assert!(matches!(outcome, ReadmeOutcome::Updated { rows: 0, .. }));
    assert_eq!(
        std::fs::read_to_string(&other_readme).unwrap(),
        format!("{START}\nNo open issues found today.\n{END}")
    );
}
