use interview_core::generator::{GeneratorSettings, Provider};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub generator: GeneratorSettings,
    pub log_level: Level,
    pub data_path: PathBuf,
    /// How long a session may sit untouched before it is evicted.
    pub session_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str =
            std::env::var("GENERATOR_PROVIDER").unwrap_or_else(|_| "ollama".to_string());
        let provider = provider_str
            .parse::<Provider>()
            .map_err(|e| ConfigError::InvalidValue("GENERATOR_PROVIDER".to_string(), e))?;

        let model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "mistral".to_string());
        let ollama_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let openai_base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let data_path = std::env::var("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let session_ttl_str =
            std::env::var("SESSION_TTL_SECS").unwrap_or_else(|_| "3600".to_string());
        let session_ttl = session_ttl_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_TTL_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", session_ttl_str),
                )
            })?;

        if provider == Provider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar(
                "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            generator: GeneratorSettings {
                provider,
                model,
                ollama_url,
                openai_api_key,
                openai_base_url,
            },
            log_level,
            data_path,
            session_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("GENERATOR_PROVIDER");
            env::remove_var("CHAT_MODEL");
            env::remove_var("OLLAMA_URL");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("OPENAI_BASE_URL");
            env::remove_var("RUST_LOG");
            env::remove_var("DATA_PATH");
            env::remove_var("SESSION_TTL_SECS");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env_vars();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.generator.provider, Provider::Ollama);
        assert_eq!(config.generator.model, "mistral");
        assert_eq!(config.generator.ollama_url, "http://localhost:11434");
        assert_eq!(config.generator.openai_api_key, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.data_path, PathBuf::from("./data"));
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("GENERATOR_PROVIDER", "openai");
            env::set_var("OPENAI_API_KEY", "custom-openai-key");
            env::set_var("OPENAI_BASE_URL", "http://localhost:11434/v1");
            env::set_var("CHAT_MODEL", "gpt-4o");
            env::set_var("RUST_LOG", "debug");
            env::set_var("DATA_PATH", "/srv/interview/data");
            env::set_var("SESSION_TTL_SECS", "600");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.generator.provider, Provider::OpenAI);
        assert_eq!(
            config.generator.openai_api_key,
            Some("custom-openai-key".to_string())
        );
        assert_eq!(config.generator.openai_base_url, "http://localhost:11434/v1");
        assert_eq!(config.generator.model, "gpt-4o");
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.data_path, PathBuf::from("/srv/interview/data"));
        assert_eq!(config.session_ttl, Duration::from_secs(600));
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("GENERATOR_PROVIDER", "carrier-pigeon");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, msg) => {
                assert_eq!(var, "GENERATOR_PROVIDER");
                assert!(msg.contains("carrier-pigeon"));
            }
            _ => panic!("Expected InvalidValue for GENERATOR_PROVIDER"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_session_ttl() {
        clear_env_vars();
        unsafe {
            env::set_var("SESSION_TTL_SECS", "0");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "SESSION_TTL_SECS"),
            _ => panic!("Expected InvalidValue for SESSION_TTL_SECS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_openai_key() {
        clear_env_vars();
        unsafe {
            env::set_var("GENERATOR_PROVIDER", "openai");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => {
                assert!(msg.contains("OPENAI_API_KEY"));
            }
            _ => panic!("Expected MissingVar for OPENAI_API_KEY"),
        }
    }
}
