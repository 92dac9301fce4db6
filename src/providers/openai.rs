use async_trait::async_trait;
use log::{debug, trace, error};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::Error;
use crate::request::{Message, Response, ServiceOptions};

// ===== Wire Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat
{   #[serde(rename = "type")]
    pub kind: String
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Usage
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage
{   #[serde(default)]
    pub prompt_tokens: u64
  , #[serde(default)]
    pub total_tokens: u64
}

/// Turn a system prompt and conversation into a request body.
/// The system prompt, when present, leads as a `system` message.
pub fn build_request(
  config: &ClientConfig
, messages: &[Message]
, options: &ServiceOptions
) -> ChatCompletionRequest
{   let mut chat = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = &options.system_prompt
    {   chat.push(ChatMessage
        {   role: "system".to_string()
          , content: system.clone()
        });
    }
    chat.extend(messages.iter().map(|m| ChatMessage
    {   role: m.role.as_str().to_string()
      , content: m.text.clone()
    }));

    ChatCompletionRequest
    {   model: config.model.clone()
      , messages: chat
      , temperature: config.temperature
      , response_format: config.json_response.then(|| ResponseFormat
        {   kind: "json_object".to_string()
        })
    }
}

/// Pull the first choice out of a decoded reply and assemble the
/// request record: model, temperature, the full exchange including the
/// assistant reply, and wall-clock time spent.
pub fn into_response(
  request: ChatCompletionRequest
, reply: ChatCompletionResponse
, elapsed: Duration
) -> Result<Response, Error>
{   let content = reply.choices.into_iter()
      .next()
      .map(|c| c.message.content)
      .ok_or_else(|| {
        error!("No choices in response");
        Error::NoChoicesInResponse
      })?;

    let mut exchange = request.messages;
    exchange.push(ChatMessage
    {   role: "assistant".to_string()
      , content: content.clone()
    });

    let mut record = serde_json::Map::new();
    record.insert("model".to_string(), request.model.into());
    record.insert(
      "temperature".to_string(),
      serde_json::json!(request.temperature)
    );
    record.insert(
      "messages".to_string(),
      serde_json::to_value(&exchange)?
    );
    record.insert(
      "execution_time_in_secs".to_string(),
      serde_json::json!(elapsed.as_secs_f64())
    );

    Ok(Response
    {   text: content
      , total_tokens: reply.usage.total_tokens
      , prompt_tokens: reply.usage.prompt_tokens
      , request_record: record
    })
}

// ===== Client =====

/// Chat completion client for OpenAI-compatible endpoints
#[derive(Debug, Clone)]
pub struct OpenAiClient
{   config: ClientConfig
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(config: ClientConfig) -> Result<Self, Error>
    {   debug!("Creating OpenAiClient for model: {}", config.model);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Failed to build HTTP client: {}", e);
          Error::HttpError(e.to_string())
        })?;

        Ok(OpenAiClient
        {   config
          , http_client
        })
    }

    /// Client built from OPENAI_* environment variables
    pub fn from_env() -> Result<Self, Error>
    {   OpenAiClient::new(ClientConfig::from_env())
    }

    /// Same key, endpoint and connection pool, different model
    pub fn with_model(&self, model: impl Into<String>) -> Self
    {   let config = self.config.clone().with_model(model);
        debug!("Cloning OpenAiClient with model: {}", config.model);
        OpenAiClient
        {   config
          , http_client: self.http_client.clone()
        }
    }

    pub fn config(&self) -> &ClientConfig
    {   &self.config
    }

    async fn send(
      &self
    , request: &ChatCompletionRequest
    ) -> Result<ChatCompletionResponse, Error>
    {   let api_key = self.config.api_key.as_ref()
          .ok_or_else(|| {
            error!("No API key for model: {}", self.config.model);
            Error::MissingApiKey(
              format!("OpenAI:{}", self.config.model)
            )
          })?;

        let response = self.http_client
          .post(self.config.chat_completions_url())
          .bearer_auth(api_key)
          .json(request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("OpenAI response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("OpenAI API error: {}", error_text);
            return Err(Error::ApiError(
              format!("{}: {}", status, error_text)
            ));
        }

        response.json().await.map_err(|e| {
          error!("Parse error: {}", e);
          Error::ParseError(e.to_string())
        })
    }
}

#[async_trait]
impl super::PromptService for OpenAiClient
{   async fn prompt(
      &self
    , ctx: &Context
    , messages: &[Message]
    , options: &ServiceOptions
    ) -> Result<Response, Error>
    {   if let Some(err) = ctx.err()
        {   return Err(err);
        }

        let started = Instant::now();
        let request = build_request(&self.config, messages, options);
        debug!(
          "Prompting {} with {} messages",
          request.model,
          request.messages.len()
        );
        trace!("OpenAI request: {:?}", request);

        let reply = tokio::select!
        { reason = ctx.done() => {
            debug!("Prompt abandoned: {}", reason);
            return Err(reason);
          }
        , reply = self.send(&request) => reply?
        };

        into_response(request, reply, started.elapsed())
    }
}
