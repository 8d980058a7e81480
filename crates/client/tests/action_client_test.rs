use pref_dns_application::use_cases::engine::ActionError;
use pref_dns_application::use_cases::RestartMap;
use pref_dns_client::{notifications, ActionClient, ActionRequest, ClientError, Level, RestartField};
use pref_dns_domain::DomainError;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("pref-dns");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// Run stubs through the shell; exec'ing a freshly written file races with
// concurrent forks (ETXTBSY).
fn client_for(script: &Path) -> ActionClient {
    ActionClient::new("/bin/sh").with_global_args([script.display().to_string()])
}

// Strips `--format <fmt>` so the stub can dispatch on the action name.
const SHIFT_FORMAT: &str = "[ \"$1\" = --format ] && shift 2";

#[tokio::test]
async fn test_resolve_decodes_json() {
    let dir = tempfile::tempdir().unwrap();
    let program = write_script(
        dir.path(),
        &format!(
            "{}\necho '{{\"code\":0,\"count\":1,\"ips\":[\"104.16.1.1\"],\"restart\":\"restarted\"}}'",
            SHIFT_FORMAT
        ),
    );

    let result = client_for(&program)
        .resolve("speed.cloudflare.com", "119.29.29.29")
        .await;

    let notification = notifications::for_resolve(&result);
    assert_eq!(notification.level, Level::Info);
    assert_eq!(notification.text, "Resolved 1 IP(s): 104.16.1.1 - MosDNS restarted");
}

#[tokio::test]
async fn test_resolve_failure_with_nonzero_exit_still_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let program = write_script(
        dir.path(),
        "echo '{\"code\":2,\"message\":\"no_ip_found\"}'\nexit 2",
    );

    let result = client_for(&program).resolve("example.com", "8.8.8.8").await;

    assert_eq!(
        notifications::for_resolve(&result).text,
        "Resolve failed: No IP address found in DNS response"
    );
}

#[tokio::test]
async fn test_resolve_restart_failure_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let error = ActionError::with_restart(
        DomainError::RestartFailed {
            service: "mosdns".to_string(),
            detail: "exit 1".to_string(),
        },
        RestartMap::new(),
    );
    let reply = dir.path().join("reply.json");
    std::fs::write(&reply, serde_json::to_string(&error).unwrap()).unwrap();
    let program = write_script(dir.path(), &format!("cat {}\nexit 3", reply.display()));

    let result = client_for(&program)
        .resolve("speed.cloudflare.com", "119.29.29.29")
        .await;

    let decoded = result.as_ref().unwrap();
    assert_eq!(decoded.code, 3);
    assert_eq!(decoded.restart, Some(RestartField::Partial(Default::default())));
    let notification = notifications::for_resolve(&result);
    assert_eq!(notification.level, Level::Error);
    assert_eq!(
        notification.text,
        "Saved, but restart failed: Restart of mosdns failed: exit 1"
    );
}

#[tokio::test]
async fn test_garbage_output_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let program = write_script(dir.path(), "echo 'sh: mosdns: not found'");

    let result = client_for(&program).resolve("example.com", "8.8.8.8").await;

    assert!(matches!(result, Err(ClientError::Parse(_))));
    assert_eq!(notifications::for_resolve(&result).text, "Failed to parse result");
}

#[tokio::test]
async fn test_missing_binary_is_execution_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = ActionClient::new(dir.path().join("absent"))
        .resolve("example.com", "8.8.8.8")
        .await;

    let notification = notifications::for_resolve(&result);
    assert!(matches!(result, Err(ClientError::Execution(_))));
    assert!(notification.text.starts_with("Execution error: "));
}

#[tokio::test]
async fn test_slow_action_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let program = write_script(dir.path(), "sleep 5");

    let result = client_for(&program)
        .with_timeout(Duration::from_millis(200))
        .commit_and_restart()
        .await;

    assert!(matches!(result, Err(ClientError::Execution(_))));
}

#[tokio::test]
async fn test_global_args_and_format_precede_action() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("argv.log");
    let program = write_script(dir.path(), &format!("echo \"$@\" > {}\necho ok", log.display()));

    let line = ActionClient::new("/bin/sh")
        .with_global_args([
            program.display().to_string(),
            "--config".to_string(),
            "/tmp/pref.toml".to_string(),
        ])
        .run_text(&ActionRequest::Write)
        .await
        .unwrap();

    assert_eq!(line, "ok");
    assert_eq!(
        std::fs::read_to_string(&log).unwrap().trim(),
        "--config /tmp/pref.toml --format text write"
    );
}

#[tokio::test]
async fn test_save_and_apply_tolerates_cron_failure() {
    let dir = tempfile::tempdir().unwrap();
    let program = write_script(
        dir.path(),
        &format!(
            "{}\ncase \"$1\" in\n  commit_and_restart) echo '{{\"code\":0,\"restart\":{{\"mosdns\":\"restarted\",\"passwall\":\"not_installed\"}}}}' ;;\n  cron) echo 'crontab locked' >&2; exit 5 ;;\nesac",
            SHIFT_FORMAT
        ),
    );

    let result = client_for(&program).save_and_apply(true).await;

    assert_eq!(
        notifications::for_commit(&result).text,
        "MosDNS: saved and restarted; PassWall: saved (not installed)"
    );
}

#[tokio::test]
async fn test_text_action_failure_uses_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let program = write_script(dir.path(), "echo 'permission denied' >&2\nexit 6");

    let result = client_for(&program)
        .run_text(&ActionRequest::Restore)
        .await;

    assert_eq!(result, Err(ClientError::Execution("permission denied".to_string())));
}
