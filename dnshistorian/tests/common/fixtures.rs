use std::path::PathBuf;
use serde::de::DeserializeOwned;

use dnshistorian::AppConfig;

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn load_fixture(relative: &str) -> String {
    std::fs::read_to_string(fixture_path(relative))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", relative))
}

pub fn load_json_fixture<T: DeserializeOwned>(relative: &str) -> T {
    let content = load_fixture(relative);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse JSON fixture {}: {}", relative, e))
}

/// Configuration text pointing both providers at local mock servers
pub fn config_toml(history_uri: &str, ai_uri: &str, secrets_file: Option<&str>) -> String {
    let secrets = match secrets_file {
        Some(path) => format!("\n[secrets]\nfile = {:?}\n", path),
        None => String::new(),
    };
    format!(
        r#"
[http]
user_agent = "dnshistorian-test/1.0"
request_timeout_secs = 10

[history]
base_url = "{}/v1"
api_key_header = "apikey"
send_accept_header = true

[ai]
base_url = "{}/v1beta"
model = "test-model"
prompt_char_limit = 2000
{}"#,
        history_uri, ai_uri, secrets
    )
}

pub fn test_config(history_uri: &str, ai_uri: &str) -> AppConfig {
    AppConfig::from_toml(&config_toml(history_uri, ai_uri, None)).expect("test config should load")
}
