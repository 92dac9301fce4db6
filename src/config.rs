//! Configuration for chat completion providers

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const API_BASE_ENV: &str = "OPENAI_API_BASE";
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// Chat completion client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Bearer token; requests fail with MissingApiKey when absent
    pub api_key: Option<String>
  , /// API base URL, without trailing slash
    pub api_base: String
  , /// Model name sent with every request
    pub model: String
  , /// Sampling temperature
    pub temperature: f32
  , /// Ask the model for a JSON object response
    pub json_response: bool
  , /// HTTP request timeout in seconds, none by default
    pub timeout_secs: Option<u64>
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   api_key: None
          , api_base: DEFAULT_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , temperature: 0.0
          , json_response: true
          , timeout_secs: None
        }
    }
}

impl ClientConfig
{   pub fn new(api_key: impl Into<String>) -> Self
    {   ClientConfig
        {   api_key: Some(api_key.into())
          , ..ClientConfig::default()
        }
    }

    /// Defaults overridden by OPENAI_API_KEY, OPENAI_API_BASE and
    /// OPENAI_MODEL where set
    pub fn from_env() -> Self
    {   let mut config = ClientConfig::default();
        if let Ok(key) = std::env::var(API_KEY_ENV)
        {   config.api_key = Some(key);
        }
        if let Ok(base) = std::env::var(API_BASE_ENV)
        {   config.api_base = base;
        }
        if let Ok(model) = std::env::var(MODEL_ENV)
        {   config.model = model;
        }
        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self
    {   self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self
    {   self.api_base = api_base.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self
    {   self.temperature = temperature;
        self
    }

    pub fn with_json_response(mut self, enabled: bool) -> Self
    {   self.json_response = enabled;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self
    {   self.timeout_secs = Some(secs);
        self
    }

    /// Full URL of the chat completions endpoint
    pub fn chat_completions_url(&self) -> String
    {   format!(
          "{}/chat/completions",
          self.api_base.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn defaults_match_constants()
    {   let config = ClientConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.0);
        assert!(config.json_response);
        assert!(config.api_key.is_none());
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn endpoint_tolerates_trailing_slash()
    {   let config = ClientConfig::new("k")
          .with_api_base("http://localhost:8080/v1/");
        assert_eq!(
          config.chat_completions_url(),
          "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn config_deserializes_from_json()
    {   let config: ClientConfig = serde_json::from_str(
          r#"{"api_key":null,"api_base":"http://x","model":"m",
              "temperature":0.5,"json_response":false,
              "timeout_secs":30}"#
        ).unwrap();
        assert_eq!(config.model, "m");
        assert_eq!(config.timeout_secs, Some(30));
        assert!(!config.json_response);
    }
}
