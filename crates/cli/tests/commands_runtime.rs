use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use tripgenie_cli::commands::destinations::DestinationQuery;
use tripgenie_cli::commands::{config, destinations, migrate};
use tripgenie_core::config::LoadOptions;

#[test]
fn destinations_prints_sorted_json() {
    with_env(&[], || {
        let result = destinations::run(
            &LoadOptions::default(),
            DestinationQuery {
                origin: "Pune".to_string(),
                month: Some("Feb".to_string()),
                tier: Some("moderate".to_string()),
                preference: Some("mountains".to_string()),
                multi_leg: false,
            },
        );
        assert_eq!(result.exit_code, 0, "expected destinations success: {}", result.output);

        let payload = parse_payload(&result.output);
        let entries = payload.as_array().expect("destinations array");
        assert!(!entries.is_empty());
        assert!(entries.iter().any(|entry| entry["name"] == "Manali"));
        let costs: Vec<u64> =
            entries.iter().map(|entry| entry["avgDailyCost"].as_u64().unwrap_or(0)).collect();
        assert!(costs.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(costs.iter().all(|cost| *cost <= 3_000));
    });
}

#[test]
fn destinations_rejects_unknown_tier() {
    with_env(&[], || {
        let result = destinations::run(
            &LoadOptions::default(),
            DestinationQuery {
                origin: "Pune".to_string(),
                tier: Some("lavish".to_string()),
                ..DestinationQuery::default()
            },
        );
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "destinations");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_argument");
    });
}

#[test]
fn destinations_reports_config_failure() {
    with_env(&[("TRIPGENIE_LLM_PROVIDER", "openai")], || {
        let result = destinations::run(
            &LoadOptions::default(),
            DestinationQuery { origin: "Pune".to_string(), ..DestinationQuery::default() },
        );
        assert_eq!(result.exit_code, 2, "openai without a key should fail validation");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn migrate_returns_success_with_memory_database() {
    with_env(&[("TRIPGENIE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn config_attributes_sources_and_redacts_keys() {
    with_env(
        &[("TRIPGENIE_LLM_PROVIDER", "openai"), ("TRIPGENIE_LLM_API_KEY", "sk-very-secret")],
        || {
            let dir = tempfile::tempdir().expect("tempdir");
            let path = dir.path().join("tripgenie.toml");
            fs::write(&path, "[agent]\nhistory_window = 6\n").expect("write config");

            let output = config::run(&LoadOptions {
                config_path: Some(path.clone()),
                ..LoadOptions::default()
            });

            assert!(output.contains("- llm.provider = openai (source: env (TRIPGENIE_LLM_PROVIDER))"));
            assert!(output.contains("- llm.api_key = sk-*** (source: env (TRIPGENIE_LLM_API_KEY))"));
            assert!(!output.contains("very-secret"));
            assert!(output.contains(&format!(
                "- agent.history_window = 6 (source: file ({}))",
                path.display()
            )));
            assert!(output.contains("- agent.max_tool_rounds = 5 (source: default)"));
            assert!(output.contains("- agent.catalog_path = <bundled> (source: default)"));
        },
    );
}

#[test]
fn config_reports_validation_errors() {
    with_env(&[("TRIPGENIE_AGENT_MAX_TOOL_ROUNDS", "0")], || {
        let output = config::run(&LoadOptions::default());
        assert!(output.starts_with("config validation failed:"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "TRIPGENIE_DATABASE_URL",
        "TRIPGENIE_DATABASE_MAX_CONNECTIONS",
        "TRIPGENIE_DATABASE_TIMEOUT_SECS",
        "TRIPGENIE_LLM_PROVIDER",
        "TRIPGENIE_LLM_API_KEY",
        "GEMINI_API_KEY",
        "TRIPGENIE_LLM_BASE_URL",
        "TRIPGENIE_LLM_MODEL",
        "TRIPGENIE_LLM_TIMEOUT_SECS",
        "TRIPGENIE_LLM_MAX_RETRIES",
        "TRIPGENIE_AGENT_MAX_TOOL_ROUNDS",
        "TRIPGENIE_AGENT_HISTORY_WINDOW",
        "TRIPGENIE_AGENT_CATALOG_PATH",
        "TRIPGENIE_LOGGING_LEVEL",
        "TRIPGENIE_LOGGING_FORMAT",
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
