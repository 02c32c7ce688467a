use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;
use tripgenie_core::config::{AppConfig, LoadOptions};

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl Field {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let catalog_path = config
        .agent
        .catalog_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<bundled>".to_string());
    let base_url = config.llm.effective_base_url().unwrap_or_else(|| "<unset>".to_string());

    vec![
        Field::new("database.url", &config.database.url, &["TRIPGENIE_DATABASE_URL"]),
        Field::new(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["TRIPGENIE_DATABASE_MAX_CONNECTIONS"],
        ),
        Field::new(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["TRIPGENIE_DATABASE_TIMEOUT_SECS"],
        ),
        Field::new("llm.provider", config.llm.provider.as_str(), &["TRIPGENIE_LLM_PROVIDER"]),
        Field::new("llm.model", &config.llm.model, &["TRIPGENIE_LLM_MODEL"]),
        Field::new("llm.base_url", base_url, &["TRIPGENIE_LLM_BASE_URL"]),
        Field::new("llm.api_key", api_key, &["TRIPGENIE_LLM_API_KEY", "GEMINI_API_KEY"]),
        Field::new(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["TRIPGENIE_LLM_TIMEOUT_SECS"],
        ),
        Field::new(
            "llm.max_retries",
            config.llm.max_retries.to_string(),
            &["TRIPGENIE_LLM_MAX_RETRIES"],
        ),
        Field::new(
            "agent.max_tool_rounds",
            config.agent.max_tool_rounds.to_string(),
            &["TRIPGENIE_AGENT_MAX_TOOL_ROUNDS"],
        ),
        Field::new(
            "agent.history_window",
            config.agent.history_window.to_string(),
            &["TRIPGENIE_AGENT_HISTORY_WINDOW"],
        ),
        Field::new("agent.catalog_path", catalog_path, &["TRIPGENIE_AGENT_CATALOG_PATH"]),
        Field::new("logging.level", &config.logging.level, &["TRIPGENIE_LOGGING_LEVEL"]),
        Field::new(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["TRIPGENIE_LOGGING_FORMAT"],
        ),
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("tripgenie.toml"), PathBuf::from("config/tripgenie.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a short key prefix such as `sk` or `AIza` so the key can be told apart.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    if trimmed.starts_with("AIza") {
        return "AIza***".to_string();
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_secret};

    #[test]
    fn secrets_keep_only_their_prefix() {
        assert_eq!(redact_secret("sk-live-123"), "sk-***");
        assert_eq!(redact_secret("AIzaSyExample"), "AIza***");
        assert_eq!(redact_secret("plain"), "<redacted>");
        assert_eq!(redact_secret("  "), "<empty>");
    }

    #[test]
    fn nested_keys_are_found_in_the_file() {
        let doc: Value = "[llm]\nmodel = \"gpt-4o-mini\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.api_key"));
        assert!(!contains_path(&doc, "agent.max_tool_rounds"));
    }
}
