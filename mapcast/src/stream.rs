//! Readable byte streams that can travel inside a [`Value`](crate::Value).

use core::fmt;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use parking_lot::Mutex;

/// A reader that may hold a resource needing release.
pub trait ReadClose: Read + Send {
    /// Releases the underlying resource. Plain readers have nothing to release.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Plain<R>(R);

impl<R: Read> Read for Plain<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + Send> ReadClose for Plain<R> {}

/// A shared handle on a readable stream.
///
/// Clones share the same reader, so bytes consumed through one handle are gone
/// for all of them.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<Mutex<Box<dyn ReadClose>>>,
}

impl Stream {
    /// Wraps a plain reader. Closing it is a no-op.
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::read_closer(Plain(reader))
    }

    /// Wraps a reader that has its own close behavior.
    pub fn read_closer(reader: impl ReadClose + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(reader))),
        }
    }

    /// An in-memory stream over `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::reader(Cursor::new(bytes.into()))
    }

    /// Reads everything left in the stream.
    pub fn read_to_end(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.inner.lock().read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Closes the underlying reader.
    pub fn close(&self) -> io::Result<()> {
        self.inner.lock().close()
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.lock().read(buf)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::from_bytes(Vec::new())
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

/// A closable stream destination, or nil.
///
/// The default value is nil: it holds no stream and allocates nothing.
#[derive(Clone, Default, PartialEq)]
pub struct ReadCloser(Option<Stream>);

impl ReadCloser {
    /// Wraps `stream`.
    pub fn new(stream: Stream) -> Self {
        Self(Some(stream))
    }

    /// Returns true if no stream is held.
    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// The held stream, if any.
    pub fn stream(&self) -> Option<&Stream> {
        self.0.as_ref()
    }

    /// Reads everything left in the stream. Nil reads as empty.
    pub fn read_to_end(&self) -> io::Result<Vec<u8>> {
        match &self.0 {
            Some(stream) => stream.read_to_end(),
            None => Ok(Vec::new()),
        }
    }

    /// Closes the held stream. Closing nil is a no-op.
    pub fn close(&self) -> io::Result<()> {
        match &self.0 {
            Some(stream) => stream.close(),
            None => Ok(()),
        }
    }
}

impl Read for ReadCloser {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.0 {
            Some(stream) => stream.read(buf),
            None => Err(io::Error::other("read from nil ReadCloser")),
        }
    }
}

impl From<Stream> for ReadCloser {
    fn from(stream: Stream) -> Self {
        Self::new(stream)
    }
}

impl fmt::Debug for ReadCloser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("ReadCloser(Stream)"),
            None => f.write_str("ReadCloser(nil)"),
        }
    }
}
