use super::*;
use std::sync::Mutex;

/// Serializes tests in this module that touch process env.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Callers must hold `ENV_LOCK`.
unsafe fn clear_llm_env() {
    unsafe {
        std::env::remove_var("GEMINI_MODEL");
        std::env::remove_var("GEMINI_BASE_URL");
        std::env::remove_var("LLM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("LLM_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_llm_env() };

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.model, DEFAULT_GEMINI_MODEL);
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("GEMINI_MODEL", "gemini-2.0-flash");
        std::env::set_var("GEMINI_BASE_URL", "https://example.test/v1beta/");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.model, "gemini-2.0-flash");
    assert_eq!(cfg.base_url, "https://example.test/v1beta");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_rejects_non_http_base_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("GEMINI_BASE_URL", "ftp://example.test");
    }

    let err = LlmConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("GEMINI_BASE_URL"));

    unsafe { clear_llm_env() };
}

#[test]
fn parse_model_rejects_blank_and_paths() {
    assert!(parse_model("  ").is_err());
    assert!(parse_model("models/gemini").is_err());
    assert_eq!(parse_model(" gemini-2.5-flash ").unwrap(), "gemini-2.5-flash");
}
