//! Sequential per-chunk prompting with results relayed over a channel

use std::sync::Arc;
use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::context::Context;
use crate::error::Error;
use crate::prompter::{PromptOptions, Prompter};
use crate::request::Message;

/// Events held between producer and consumer; the producer waits for the
/// consumer once this many are queued
pub const STREAM_BUFFER: usize = 1;

/// One item of a chunk stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent
{   /// Trimmed, non-empty model output for one chunk
    Response(String)
  , /// Terminal failure; nothing follows it
    Error(Error)
}

impl StreamEvent
{   pub fn is_error(&self) -> bool
    {   matches!(self, StreamEvent::Error(_))
    }

    pub fn into_result(self) -> Result<String, Error>
    {   match self
        {   StreamEvent::Response(text) => Ok(text)
          , StreamEvent::Error(e) => Err(e)
        }
    }
}

/// How a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome
{   Completed
  , Cancelled
  , Failed
  , /// Consumer dropped the stream before it finished
    Abandoned
}

/// Consumer half of a chunk stream.
///
/// `recv` returns `None` once the producer is finished; the close itself
/// is the completion signal.
#[derive(Debug)]
pub struct ChunkStream
{   rx: mpsc::Receiver<StreamEvent>
  , task: Option<tokio::task::JoinHandle<StreamOutcome>>
}

impl ChunkStream
{   pub async fn recv(&mut self) -> Option<StreamEvent>
    {   self.rx.recv().await
    }

    /// Drain every remaining event
    pub async fn collect(mut self) -> Vec<StreamEvent>
    {   let mut events = Vec::new();
        while let Some(ev) = self.rx.recv().await
        {   events.push(ev);
        }
        events
    }

    /// Stop listening and wait for the producer to report how it ended
    pub async fn outcome(self) -> StreamOutcome
    {   let ChunkStream { rx, task } = self;
        drop(rx);
        match task
        {   Some(handle) => handle.await.unwrap_or_else(|e| {
              error!("Chunk stream task failed: {}", e);
              StreamOutcome::Failed
            })
          , None => StreamOutcome::Failed
        }
    }

    pub fn into_receiver(self) -> mpsc::Receiver<StreamEvent>
    {   self.rx
    }
}

/// Prompt the model once per chunk, in order, relaying each non-empty
/// answer.
///
/// Runs in one background task. Before each chunk the context is checked;
/// a done context emits its error and stops. A failed call emits one error
/// naming the 1-based chunk and stops. Answers that trim to nothing emit
/// no event. Each chunk call gets its own run id; the other options are
/// shared across calls.
pub fn stream_chunks(
  prompter: Arc<Prompter>
, ctx: Context
, chunks: Vec<String>
, options: PromptOptions
) -> ChunkStream
{   let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    if chunks.is_empty()
    {   debug!("stream_chunks called with no chunks");
        // fresh channel always has room for one event
        let _ = tx.try_send(StreamEvent::Error(
          Error::InvalidInput("no chunks provided".to_string())
        ));
        return ChunkStream
        {   rx
          , task: None
        };
    }

    let task = tokio::spawn(async move {
      run_chunk_loop(prompter, ctx, chunks, options, tx).await
    });

    ChunkStream
    {   rx
      , task: Some(task)
    }
}

impl Prompter
{   /// See [`stream_chunks`]
    pub fn stream_chunks(
      self: &Arc<Self>
    , ctx: Context
    , chunks: Vec<String>
    , options: PromptOptions
    ) -> ChunkStream
    {   stream_chunks(Arc::clone(self), ctx, chunks, options)
    }
}

/// Producer loop; owns `tx`, so the channel closes on every return
async fn run_chunk_loop(
  prompter: Arc<Prompter>
, ctx: Context
, chunks: Vec<String>
, options: PromptOptions
, tx: mpsc::Sender<StreamEvent>
) -> StreamOutcome
{   let total = chunks.len();
    debug!("Starting chunk stream over {} chunks", total);

    for (index, chunk) in chunks.into_iter().enumerate()
    {   let position = index + 1;

        if let Some(reason) = ctx.err()
        {   info!("Chunk stream stopped before chunk {}: {}", position, reason);
            let _ = tx.send(StreamEvent::Error(reason)).await;
            return StreamOutcome::Cancelled;
        }

        let mut call_options = options.clone();
        call_options.run_id = None;

        let result = prompter
          .single_prompt(&ctx, &[Message::user(chunk)], call_options)
          .await;

        match result
        {   Ok(response) => {
              let text = response.text.trim();
              if text.is_empty()
              {   debug!("Chunk {}/{} produced no text", position, total);
                  continue;
              }
              let event = StreamEvent::Response(text.to_string());
              if tx.send(event).await.is_err()
              {   debug!("Chunk stream consumer went away at chunk {}", position);
                  return StreamOutcome::Abandoned;
              }
            }
          , Err(e) => {
              error!("Chunk {}/{} failed: {}", position, total, e);
              let _ = tx.send(StreamEvent::Error(
                e.context(format!("failed to process chunk {}", position))
              )).await;
              return StreamOutcome::Failed;
            }
        }
    }

    debug!("Chunk stream completed");
    StreamOutcome::Completed
}
