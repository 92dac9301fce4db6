//! Cancellation and deadline carrier threaded through every prompt call

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller-owned signal that work should stop.
///
/// Clones share the same cancellation token, so cancelling any clone
/// cancels them all. A deadline, if set, is inherited by children.
#[derive(Debug, Clone, Default)]
pub struct Context
{   token: CancellationToken
  , deadline: Option<Instant>
}

impl Context
{   /// Context that is never done unless cancelled
    pub fn new() -> Self
    {   Context::default()
    }

    /// Context driven by an existing token
    pub fn from_token(token: CancellationToken) -> Self
    {   Context
        {   token
          , deadline: None
        }
    }

    /// Child context that also expires at `deadline`.
    /// Cancelling the parent cancels the child, not the other way round.
    pub fn with_deadline(&self, deadline: Instant) -> Self
    {   let deadline = match self.deadline
        {   Some(existing) if existing < deadline => existing
          , _ => deadline
        };
        Context
        {   token: self.token.child_token()
          , deadline: Some(deadline)
        }
    }

    pub fn with_timeout(&self, timeout: std::time::Duration) -> Self
    {   self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self)
    {   self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken
    {   &self.token
    }

    pub fn deadline(&self) -> Option<Instant>
    {   self.deadline
    }

    /// Why the context is done, or `None` while it is still live
    pub fn err(&self) -> Option<crate::error::Error>
    {   if self.token.is_cancelled()
        {   return Some(crate::error::Error::Cancelled);
        }
        match self.deadline
        {   Some(d) if Instant::now() >= d => {
              Some(crate::error::Error::DeadlineExceeded)
            }
          , _ => None
        }
    }

    pub fn is_done(&self) -> bool
    {   self.err().is_some()
    }

    /// Resolves once the context is cancelled or its deadline passes,
    /// yielding the reason
    pub async fn done(&self) -> crate::error::Error
    {   match self.deadline
        {   Some(d) => {
              tokio::select!
              { _ = self.token.cancelled() => {
                  crate::error::Error::Cancelled
                }
              , _ = tokio::time::sleep_until(d) => {
                  crate::error::Error::DeadlineExceeded
                }
              }
            }
          , None => {
              self.token.cancelled().await;
              crate::error::Error::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::error::Error;
    use std::time::Duration;

    #[tokio::test]
    async fn fresh_context_is_live()
    {   let ctx = Context::new();
        assert!(!ctx.is_done());
        assert_eq!(ctx.err(), None);
    }

    #[tokio::test]
    async fn cancel_is_shared_between_clones()
    {   let ctx = Context::new();
        let clone = ctx.clone();
        clone.cancel();
        assert_eq!(ctx.err(), Some(Error::Cancelled));
        assert_eq!(ctx.done().await, Error::Cancelled);
    }

    #[tokio::test]
    async fn external_token_drives_context()
    {   let token = CancellationToken::new();
        let ctx = Context::from_token(token.clone());
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_done());
        token.cancel();
        assert!(ctx.token().is_cancelled());
        assert_eq!(ctx.err(), Some(Error::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expires()
    {   let ctx = Context::new()
          .with_timeout(Duration::from_millis(50));
        assert!(!ctx.is_done());
        assert_eq!(ctx.done().await, Error::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn child_keeps_earlier_parent_deadline()
    {   let parent = Context::new()
          .with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        parent.cancel();
        assert_eq!(child.err(), Some(Error::Cancelled));
    }
}
