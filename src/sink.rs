//! Append-only destinations for prompt audit records

use std::io::Write;
use std::sync::{Mutex, MutexGuard};

/// Append-only text sink.
///
/// An append either lands completely or returns an error. Ordering between
/// appends from concurrent callers is whatever the implementation provides.
pub trait LogSink: Send + Sync
{   fn append(&self, record: &str) -> Result<(), crate::error::Error>;
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, crate::error::Error>
{   m.lock().map_err(|_| {
      crate::error::Error::Write("log sink lock poisoned".to_string())
    })
}

/// In-memory sink, handy for collecting a run's records
#[derive(Debug, Default)]
pub struct LogBuffer
{   inner: Mutex<String>
}

impl LogBuffer
{   pub fn new() -> Self
    {   LogBuffer::default()
    }

    /// Everything appended so far
    pub fn contents(&self) -> String
    {   match self.inner.lock()
        {   Ok(buf) => buf.clone()
          , Err(poisoned) => poisoned.into_inner().clone()
        }
    }

    pub fn len(&self) -> usize
    {   self.contents().len()
    }

    pub fn is_empty(&self) -> bool
    {   self.len() == 0
    }
}

impl LogSink for LogBuffer
{   fn append(&self, record: &str) -> Result<(), crate::error::Error>
    {   lock(&self.inner)?.push_str(record);
        Ok(())
    }
}

/// Sink over any writer, e.g. a file opened in append mode
#[derive(Debug)]
pub struct WriterSink<W>
{   inner: Mutex<W>
}

impl<W: Write + Send> WriterSink<W>
{   pub fn new(writer: W) -> Self
    {   WriterSink
        {   inner: Mutex::new(writer)
        }
    }

    pub fn into_inner(self) -> W
    {   match self.inner.into_inner()
        {   Ok(w) => w
          , Err(poisoned) => poisoned.into_inner()
        }
    }
}

impl WriterSink<std::fs::File>
{   /// Open `path` for appending, creating it if needed
    pub fn append_to_file(
      path: impl AsRef<std::path::Path>
    ) -> Result<Self, crate::error::Error>
    {   let file = std::fs::OpenOptions::new()
          .create(true)
          .append(true)
          .open(path)?;
        Ok(WriterSink::new(file))
    }
}

impl<W: Write + Send> LogSink for WriterSink<W>
{   fn append(&self, record: &str) -> Result<(), crate::error::Error>
    {   let mut writer = lock(&self.inner)?;
        writer.write_all(record.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn buffer_appends_never_overwrites()
    {   let buf = LogBuffer::new();
        buf.append("one\n").unwrap();
        buf.append("two\n").unwrap();
        assert_eq!(buf.contents(), "one\ntwo\n");
        assert!(!buf.is_empty());
    }

    #[test]
    fn writer_sink_appends_to_file()
    {   let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.log");
        {   let sink = WriterSink::append_to_file(&path).unwrap();
            sink.append("first\n").unwrap();
        }
        {   let sink = WriterSink::append_to_file(&path).unwrap();
            sink.append("second\n").unwrap();
        }
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "first\nsecond\n");
    }

    #[test]
    fn writer_sink_hands_back_its_writer()
    {   let sink = WriterSink::new(Vec::new());
        sink.append("RunID: r1\n").unwrap();
        assert_eq!(sink.into_inner(), b"RunID: r1\n".to_vec());
    }

    struct Full;

    impl Write for Full
    {   fn write(&mut self, _: &[u8]) -> std::io::Result<usize>
        {   Ok(0)
        }
        fn flush(&mut self) -> std::io::Result<()>
        {   Ok(())
        }
    }

    #[test]
    fn short_write_is_an_error()
    {   let sink = WriterSink::new(Full);
        let err = sink.append("data").unwrap_err();
        assert!(matches!(err, crate::error::Error::Write(_)));
    }
}
