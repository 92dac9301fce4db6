use std::fmt;

/// Custom error type for prompter operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Caller supplied unusable input
    InvalidInput(String)
  , /// API key is missing for a provider
    MissingApiKey(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Response could not be serialized for the log sink
    Serialization(String)
  , /// Log sink rejected an append
    Write(String)
  , /// Context was cancelled by the caller
    Cancelled
  , /// Context deadline passed
    DeadlineExceeded
  , /// Error annotated with the stage that produced it
    Context
    {   context: String
      , source: Box<Error>
    }
  , /// Generic error
    Other(String)
}

impl Error
{   /// Wrap this error with a short description of the failing stage
    pub fn context(self, context: impl Into<String>) -> Self
    {   Error::Context
        {   context: context.into()
          , source: Box::new(self)
        }
    }

    /// Innermost error beneath any context wrappers
    pub fn root(&self) -> &Error
    {   match self
        {   Error::Context { source, .. } => source.root()
          , other => other
        }
    }

    /// True when the root cause is a cancelled or expired context
    pub fn is_cancellation(&self) -> bool
    {   matches!(
          self.root(),
          Error::Cancelled | Error::DeadlineExceeded
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidInput(msg) => {
              write!(f, "Invalid input: {}", msg)
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::Serialization(msg) => {
              write!(f, "Serialization error: {}", msg)
            }
          , Error::Write(msg) => {
              write!(f, "Write error: {}", msg)
            }
          , Error::Cancelled => {
              write!(f, "context canceled")
            }
          , Error::DeadlineExceeded => {
              write!(f, "context deadline exceeded")
            }
          , Error::Context { context, source } => {
              write!(f, "{}: {}", context, source)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error
{   fn source(&self)
      -> Option<&(dyn std::error::Error + 'static)>
    {   match self
        {   Error::Context { source, .. } => Some(source.as_ref())
          , _ => None
        }
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Write(e.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn context_chain_displays_outer_first()
    {   let err = Error::HttpError("connection reset".to_string())
          .context("failed to prompt model")
          .context("failed to process chunk 2");
        assert_eq!(
          err.to_string(),
          "failed to process chunk 2: failed to prompt model: \
           HTTP error: connection reset"
        );
        assert_eq!(
          err.root(),
          &Error::HttpError("connection reset".to_string())
        );
    }

    #[test]
    fn cancellation_is_seen_through_wrappers()
    {   let err = Error::DeadlineExceeded.context("failed to prompt model");
        assert!(err.is_cancellation());
        assert!(!Error::NoChoicesInResponse.is_cancellation());
    }
}
