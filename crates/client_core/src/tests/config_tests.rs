use super::*;

use std::{
    collections::HashMap,
    env,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_config(tag: &str, contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("sui_explain_config_{tag}_{suffix}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_yields_defaults() {
    let settings =
        load_settings_from(Path::new("/nonexistent/explain.toml"), no_env).expect("settings");
    assert_eq!(settings, ClientSettings::default());
    settings.validate().expect("defaults are valid");
}

#[test]
fn file_overrides_defaults_and_env_overrides_file() {
    let path = temp_config(
        "layered",
        r#"
ledger_rpc_url = "http://127.0.0.1:8787/api/sui"
llm_model = "llama-3.1-8b-instant"
llm_max_tokens = 256
"#,
    );
    let env_vars = HashMap::from([
        ("APP__LLM_MODEL", "mixtral-8x7b"),
        ("GROQ_API_KEY", "gsk_test"),
        ("APP__LLM_TEMPERATURE", "not-a-number"),
    ]);

    let settings = load_settings_from(&path, |key| env_vars.get(key).map(|v| v.to_string()))
        .expect("settings");
    fs::remove_file(&path).expect("cleanup");

    assert_eq!(settings.ledger_rpc_url, "http://127.0.0.1:8787/api/sui");
    assert_eq!(settings.llm_model, "mixtral-8x7b");
    assert_eq!(settings.llm_max_tokens, 256);
    assert_eq!(settings.llm_temperature, 0.6);
    assert_eq!(settings.llm_api_key.as_deref(), Some("gsk_test"));
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_config("malformed", "llm_max_tokens = \"lots\"");
    let err = load_settings_from(&path, no_env).expect_err("bad file");
    fs::remove_file(&path).expect("cleanup");
    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
fn chat_settings_require_api_key() {
    let mut settings = ClientSettings::default();
    assert!(settings.chat_settings().is_err());

    settings.llm_api_key = Some("   ".into());
    assert!(settings.chat_settings().is_err());

    settings.llm_api_key = Some("gsk_test".into());
    let chat = settings.chat_settings().expect("chat settings");
    assert_eq!(chat.api_key, "gsk_test");
    assert_eq!(chat.model, "llama-3.3-70b-versatile");
    assert_eq!(chat.max_tokens, 1024);
}

#[test]
fn validate_rejects_non_http_endpoints() {
    let settings = ClientSettings {
        ledger_rpc_url: "ftp://fullnode.example".into(),
        ..ClientSettings::default()
    };
    assert!(settings.validate().is_err());

    let settings = ClientSettings {
        llm_api_url: "not a url".into(),
        ..ClientSettings::default()
    };
    assert!(settings.validate().is_err());
}
