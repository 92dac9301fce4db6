//! Request and response types shared by every prompt service

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   Assistant
  , User
}

impl Role
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Role::Assistant => "assistant"
          , Role::User => "user"
        }
    }
}

/// One entry of a conversation, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message
{   pub role: Role
  , pub text: String
}

impl Message
{   pub fn new(role: Role, text: impl Into<String>) -> Self
    {   Message
        {   role
          , text: text.into()
        }
    }

    pub fn user(text: impl Into<String>) -> Self
    {   Message::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self
    {   Message::new(Role::Assistant, text)
    }
}

/// Options a prompt service sees for one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceOptions
{   /// Instruction placed ahead of the conversation
    pub system_prompt: Option<String>
}

/// Result of one completed model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response
{   /// Generated text
    pub text: String
  , /// Tokens billed for prompt and completion
    pub total_tokens: u64
  , /// Tokens billed for the prompt alone
    pub prompt_tokens: u64
  , /// What was sent, kept for the audit log
    pub request_record: serde_json::Map<String, serde_json::Value>
}

impl Response
{   /// Response carrying only text, as produced by simple services
    pub fn from_text(text: impl Into<String>) -> Self
    {   Response
        {   text: text.into()
          , total_tokens: 0
          , prompt_tokens: 0
          , request_record: serde_json::Map::new()
        }
    }
}
