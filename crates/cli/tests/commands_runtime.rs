use std::env;
use std::sync::{Mutex, OnceLock};

use scs_cli::commands::{config, doctor, migrate};
use serde_json::Value;

const CLIENT_ENV: [(&str, &str); 2] =
    [("SCS_SLACK_CLIENT_ID", "1234.5678"), ("SCS_SLACK_CLIENT_SECRET", "shh-client-secret")];

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[CLIENT_ENV[0], CLIENT_ENV[1], ("SCS_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert!(payload["message"].as_str().unwrap_or_default().contains("schema up to date"));
    });
}

#[test]
fn migrate_returns_config_failure_without_client_secret() {
    with_env(&[CLIENT_ENV[0], ("SCS_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_reports_ready_database_after_migrate() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("doctor.db").display());

    with_env(
        &[
            CLIENT_ENV[0],
            CLIENT_ENV[1],
            ("SCS_DATABASE_URL", url.as_str()),
            ("SCS_SLACK_REDIRECT_URL", "https://feedback.example.test/slack/oauth/callback"),
        ],
        || {
            assert_eq!(migrate::run().exit_code, 0, "migrate should prepare the schema");

            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0, "expected doctor to pass: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["overall_status"], "pass");
            let database = find_check(&payload, "database_readiness");
            assert_eq!(database["status"], "pass");
            assert!(database["details"].as_str().unwrap_or_default().contains("0 workspace(s)"));
        },
    );
}

#[test]
fn doctor_warns_when_redirect_url_is_unset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("doctor.db").display());

    with_env(&[CLIENT_ENV[0], CLIENT_ENV[1], ("SCS_DATABASE_URL", url.as_str())], || {
        assert_eq!(migrate::run().exit_code, 0, "migrate should prepare the schema");

        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "warnings should not fail the doctor run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "warn");
        assert_eq!(find_check(&payload, "slack_credentials")["status"], "warn");
    });
}

#[test]
fn doctor_fails_on_unmigrated_database() {
    with_env(&[CLIENT_ENV[0], CLIENT_ENV[1], ("SCS_DATABASE_URL", "sqlite::memory:")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        let database = find_check(&payload, "database_readiness");
        assert_eq!(database["status"], "fail");
        assert!(database["details"].as_str().unwrap_or_default().contains("scs migrate"));
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] slack_credentials"));
        assert!(result.output.contains("- [skip] database_readiness"));
    });
}

#[test]
fn config_redacts_secret_and_attributes_env_sources() {
    with_env(&[CLIENT_ENV[0], CLIENT_ENV[1], ("SCS_LOG_LEVEL", "debug")], || {
        let output = config::run();

        assert!(output.contains("- slack.client_secret = sh*** (source: env (SCS_SLACK_CLIENT_SECRET))"));
        assert!(!output.contains("shh-client-secret"));
        assert!(output.contains("- slack.client_id = 1234.5678 (source: env (SCS_SLACK_CLIENT_ID))"));
        assert!(output.contains("- logging.level = debug (source: env (SCS_LOG_LEVEL))"));
        assert!(output.contains("- server.port = 8080 (source: default)"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn find_check<'a>(payload: &'a Value, name: &str) -> &'a Value {
    payload["checks"]
        .as_array()
        .and_then(|checks| checks.iter().find(|check| check["name"] == name))
        .unwrap_or_else(|| panic!("doctor report should contain `{name}`"))
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SCS_DATABASE_URL",
        "SCS_DATABASE_MAX_CONNECTIONS",
        "SCS_DATABASE_TIMEOUT_SECS",
        "SCS_SLACK_CLIENT_ID",
        "SCS_SLACK_CLIENT_SECRET",
        "SCS_SLACK_REDIRECT_URL",
        "SCS_SLACK_API_BASE_URL",
        "SCS_SERVER_BIND_ADDRESS",
        "SCS_SERVER_PORT",
        "SCS_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SCS_LOGGING_LEVEL",
        "SCS_LOGGING_FORMAT",
        "SCS_LOG_LEVEL",
        "SCS_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
