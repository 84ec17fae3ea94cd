//! Integration tests for the `followsync` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Get the `followsync` command for testing.
fn followsync_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_followsync"));
    // Suppress tracing output during tests
    cmd.env("RUST_LOG", "error");
    cmd.env_remove("FOLLOWSYNC_CONFIG");
    cmd
}

fn write_config(dir: &TempDir, api_url: &str) -> PathBuf {
    let config = serde_json::json!({
        "api_key": "key",
        "api_secret": "secret",
        "access_token": "token",
        "access_token_secret": "token_secret",
        "api_url": api_url,
        "retry": { "max_attempts": 1 },
        "pacing": { "page_interval_ms": 0, "action_interval_ms": 0 }
    });
    let path = dir.path().join("config.json");
    std::fs::write(&path, config.to_string()).unwrap();
    path
}

/// Run the binary off the async test thread so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || {
        followsync_cmd()
            .args(&args)
            .write_stdin("")
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn config_args(config: &Path, rest: &[&str]) -> Vec<String> {
    let mut args = vec!["--config".to_string(), config.display().to_string()];
    args.extend(rest.iter().map(|s| (*s).to_string()));
    args
}

mod setup {
    use super::*;

    #[test]
    fn help_lists_commands() {
        followsync_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("mirror"))
            .stdout(predicate::str::contains("follow-back"))
            .stdout(predicate::str::contains("whoami"));
    }

    #[test]
    fn missing_config_explains_setup() {
        let dir = TempDir::new().unwrap();

        followsync_cmd()
            .current_dir(dir.path())
            .args(["mirror", "someone"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("config.json not found"))
            .stderr(predicate::str::contains("Please create a config file"));
    }

    #[test]
    fn config_path_from_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("elsewhere.json");

        followsync_cmd()
            .env("FOLLOWSYNC_CONFIG", &path)
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("elsewhere.json not found"));
    }

    #[test]
    fn malformed_config_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        followsync_cmd()
            .arg("--config")
            .arg(&path)
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to parse config file"));
    }

    #[test]
    fn missing_credential_key_is_named() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_key": "k", "api_secret": "s", "access_token": "t"}"#)
            .unwrap();

        followsync_cmd()
            .arg("--config")
            .arg(&path)
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("access_token_secret"));
    }

    #[test]
    fn mirror_without_username_needs_a_terminal() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "http://127.0.0.1:9");

        followsync_cmd()
            .arg("--config")
            .arg(&path)
            .arg("mirror")
            .write_stdin("")
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a terminal"));
    }

    #[test]
    fn rejects_unknown_api() {
        followsync_cmd()
            .args(["mirror", "someone", "--api", "v3"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--api"));
    }
}

mod sync {
    use super::*;

    async fn mount_legacy_mirror(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/1.1/account/verify_credentials.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id_str": "1", "screen_name": "me"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.1/users/show.json"))
            .and(query_param("screen_name", "target"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id_str": "500", "screen_name": "target"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.1/followers/ids.json"))
            .and(query_param("user_id", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ids": ["1", "2", "3", "4"], "next_cursor_str": "0"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.1/friends/ids.json"))
            .and(query_param("user_id", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ids": ["2", "3", "9"], "next_cursor_str": "0"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn legacy_mirror_applies_plan() {
        let server = MockServer::start().await;
        mount_legacy_mirror(&server).await;
        Mock::given(method("POST"))
            .and(path("/1.1/friendships/destroy.json"))
            .and(query_param("user_id", "9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id_str": "9", "screen_name": "nine"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/1.1/friendships/create.json"))
            .and(query_param("user_id", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id_str": "4", "screen_name": "four"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let output = run(config_args(&config, &["--json", "mirror", "@target"])).await;

        assert!(output.status.success(), "{output:?}");
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["mode"], "mirror");
        assert_eq!(report["me"], "1");
        assert_eq!(report["account"], "500");
        assert_eq!(report["tally"]["followed"], 1);
        assert_eq!(report["tally"]["unfollowed"], 1);
        assert_eq!(report["tally"]["failed"], 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dry_run_makes_no_changes() {
        let server = MockServer::start().await;
        mount_legacy_mirror(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let output = run(config_args(&config, &["--dry-run", "mirror", "target"])).await;

        assert!(output.status.success(), "{output:?}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Would unfollow user 9"), "{stdout}");
        assert!(stdout.contains("Would follow user 4"), "{stdout}");
        assert!(stdout.contains("Dry run complete"), "{stdout}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_follow_still_exits_zero() {
        let server = MockServer::start().await;
        mount_legacy_mirror(&server).await;
        Mock::given(method("POST"))
            .and(path("/1.1/friendships/destroy.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id_str": "9", "screen_name": "nine"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/1.1/friendships/create.json"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "errors": [{"code": 161, "message": "You are unable to follow more people at this time."}]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let output = run(config_args(&config, &["mirror", "target"])).await;

        assert!(output.status.success(), "{output:?}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Unfollowed user 9"), "{stdout}");
        assert!(stdout.contains("Error following 4"), "{stdout}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn v2_mirror_of_protected_account_keeps_follows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "1", "name": "Me", "username": "me"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/users/by/username/locked"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "7", "name": "Locked", "username": "locked", "protected": true}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/users/7/followers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{
                    "title": "Authorization Error",
                    "detail": "Sorry, you are not authorized to see the user with id: [7].",
                    "type": "https://api.twitter.com/2/problems/not-authorized-for-resource"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/users/1/following"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "20", "username": "x"}, {"id": "21", "username": "y"}],
                "meta": {"result_count": 2}
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let output = run(config_args(&config, &["--json", "mirror", "locked", "--api", "v2"])).await;

        assert!(output.status.success(), "{output:?}");
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["withheld_unfollows"], 2);
        assert_eq!(report["planned_unfollows"], 0);
        assert_eq!(report["snapshots"][0]["relation"], "followers");
        assert!(report["snapshots"][0]["error"]
            .as_str()
            .unwrap()
            .starts_with("forbidden"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn v2_follow_back_for_own_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "1", "name": "Me", "username": "me"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/users/1/followers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": "10", "username": "a"},
                    {"id": "11", "username": "b"},
                    {"id": "12", "username": "c"}
                ],
                "meta": {"result_count": 3}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/users/1/following"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "11", "username": "b"}],
                "meta": {"result_count": 1}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/users/1/following"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"following": true}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let output = run(config_args(&config, &["--json", "follow-back"])).await;

        assert!(output.status.success(), "{output:?}");
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["mode"], "follow_back");
        assert_eq!(report["planned_follows"], 2);
        assert_eq!(report["planned_unfollows"], 0);
        assert_eq!(report["tally"]["followed"], 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_credentials_are_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "title": "Unauthorized", "status": 401, "detail": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let output = run(config_args(&config, &["whoami"])).await;

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("failed to verify credentials"), "{stderr}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn whoami_prints_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/account/verify_credentials.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id_str": "77", "screen_name": "me"
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let output = run(config_args(&config, &["whoami", "--api", "legacy"])).await;

        assert!(output.status.success(), "{output:?}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Authenticated as user 77 (legacy API)"), "{stdout}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn json_logs_go_to_stderr() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "id": "5", "name": "Me", "username": "me" }
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, &server.uri());
        let args = config_args(&config, &["--log-format", "json", "--json", "whoami"]);
        let output = tokio::task::spawn_blocking(move || {
            followsync_cmd()
                .env("RUST_LOG", "debug")
                .args(&args)
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        assert!(output.status.success(), "{output:?}");
        let identity: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(identity["id"], "5");

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.lines().count() > 0);
        for line in stderr.lines() {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(entry.get("level").is_some(), "{line}");
        }
    }
}
