use std::sync::Arc;
use log::{debug, error};

use crate::context::Context;
use crate::error::Error;
use crate::providers::PromptService;
use crate::request::{Message, Response, ServiceOptions};
use crate::sink::LogSink;

/// Per-call settings for [`Prompter::single_prompt`]
#[derive(Clone, Default)]
pub struct PromptOptions
{   /// Correlates log records; a UUID is generated when absent
    pub run_id: Option<String>
  , /// Instruction placed ahead of the conversation
    pub system_prompt: Option<String>
  , /// Where the audit record goes after a successful call
    pub log_sink: Option<Arc<dyn LogSink>>
}

impl std::fmt::Debug for PromptOptions
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("PromptOptions")
          .field("run_id", &self.run_id)
          .field("system_prompt", &self.system_prompt)
          .field("log_sink", &self.log_sink.is_some())
          .finish()
    }
}

impl PromptOptions
{   pub fn new() -> Self
    {   PromptOptions::default()
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self
    {   self.run_id = Some(run_id.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self
    {   self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self
    {   self.log_sink = Some(sink);
        self
    }
}

/// Runs prompts against a service and keeps an audit trail
#[derive(Clone)]
pub struct Prompter
{   service: Arc<dyn PromptService>
}

impl Prompter
{   pub fn new(service: Arc<dyn PromptService>) -> Self
    {   debug!("Creating Prompter");
        Prompter
        {   service
        }
    }

    /// Send one conversation to the model and return its answer.
    ///
    /// When `options` carries a log sink, one record with the run id,
    /// system prompt and serialized response is appended after the call
    /// succeeds. Failures are wrapped with the stage that failed and never
    /// retried.
    pub async fn single_prompt(
      &self
    , ctx: &Context
    , messages: &[Message]
    , options: PromptOptions
    ) -> Result<Response, Error>
    {   let run_id = options.run_id
          .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        debug!(
          "single_prompt run {} with {} messages",
          run_id,
          messages.len()
        );

        let service_options = ServiceOptions
        {   system_prompt: options.system_prompt
        };

        let response = self.service
          .prompt(ctx, messages, &service_options)
          .await
          .map_err(|e| {
            error!("Run {} failed to prompt model: {}", run_id, e);
            e.context("failed to prompt model")
          })?;

        if let Some(sink) = &options.log_sink
        {   append_record(
              sink.as_ref(),
              &run_id,
              service_options.system_prompt.as_deref(),
              &response
            ).map_err(|e| {
              error!("Run {} failed to append to log: {}", run_id, e);
              e.context("failed to append to log file")
            })?;
        }

        Ok(response)
    }

    /// Prompt with a single user message
    pub async fn prompt_text(
      &self
    , ctx: &Context
    , system_prompt: Option<&str>
    , text: &str
    ) -> Result<Response, Error>
    {   let mut options = PromptOptions::new();
        options.system_prompt = system_prompt.map(str::to_owned);
        self.single_prompt(ctx, &[Message::user(text)], options).await
    }
}

/// Format the audit record in full, then hand it to the sink in one append.
///
/// Layout is `RunID: <id>\n Prompt: <system>\nResponse: <json>\n\n`. The
/// ` Prompt:` line is only written when the call had a system prompt, so
/// readers of the log must not expect it on every record.
pub fn format_record(
  run_id: &str
, system_prompt: Option<&str>
, response: &Response
) -> Result<String, Error>
{   let data = serde_json::to_string(response)?;
    let record = match system_prompt
    {   Some(prompt) => format!(
          "RunID: {}\n Prompt: {}\nResponse: {}\n\n",
          run_id, prompt, data
        )
      , None => format!(
          "RunID: {}\nResponse: {}\n\n",
          run_id, data
        )
    };
    Ok(record)
}

fn append_record(
  sink: &dyn LogSink
, run_id: &str
, system_prompt: Option<&str>
, response: &Response
) -> Result<(), Error>
{   let record = format_record(run_id, system_prompt, response)?;
    sink.append(&record)
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn record_includes_prompt_line_only_when_present()
    {   let resp = Response::from_text("ok");
        let with = format_record("r1", Some("sys"), &resp).unwrap();
        assert!(with.starts_with("RunID: r1\n Prompt: sys\nResponse: {"));
        assert!(with.ends_with("}\n\n"));

        let without = format_record("r2", None, &resp).unwrap();
        assert!(without.starts_with("RunID: r2\nResponse: {"));
        assert!(!without.contains("Prompt:"));
    }

    #[test]
    fn options_builder_sets_fields()
    {   let opts = PromptOptions::new()
          .with_run_id("abc")
          .with_system_prompt("sys");
        assert_eq!(opts.run_id.as_deref(), Some("abc"));
        assert_eq!(opts.system_prompt.as_deref(), Some("sys"));
        assert!(opts.log_sink.is_none());
    }
}
