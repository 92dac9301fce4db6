pub mod error;
pub mod config;
pub mod context;
pub mod chunk;
pub mod request;
pub mod sink;
pub mod providers;
pub mod prompter;
pub mod stream;

/*

prompter: a thin layer over chat completion services.

  text ──chunk──▶ [chunk, chunk, ...] ──stream_chunks──▶ ChunkStream
                                          │
                                          ▼ (one at a time)
                                 Prompter::single_prompt
                                          │
                                          ▼
                                  dyn PromptService  (OpenAiClient, ...)

Every call takes a Context for cancellation and deadlines. Audit records
go to an optional LogSink supplied per call.

*/

pub use chunk::{chunk_str, chunk_text_by_max_bytes};
pub use config::ClientConfig;
pub use context::Context;
pub use error::Error;
pub use prompter::{PromptOptions, Prompter};
pub use providers::{OpenAiClient, PromptService};
pub use request::{Message, Response, Role, ServiceOptions};
pub use sink::{LogBuffer, LogSink, WriterSink};
pub use stream::{stream_chunks, ChunkStream, StreamEvent, StreamOutcome};
