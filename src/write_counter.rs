//! Byte-counting [Write] wrapper.
//!
//! READDIR serializes entries straight into the reply stream but must stay
//! inside the byte budget the client asked for. Wrapping the stream in a
//! [WriteCounter] lets the handler measure what has gone out so far without
//! buffering the whole reply first.

use std::io::Write;

/// Counts the bytes successfully written through it.
pub struct WriteCounter<W> {
    inner: W,
    count: usize,
}

impl<W> WriteCounter<W>
where
    W: Write,
{
    pub fn new(inner: W) -> Self {
        WriteCounter { inner, count: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn bytes_written(&self) -> usize {
        self.count
    }
}

impl<W> Write for WriteCounter<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let res = self.inner.write(buf);
        if let Ok(size) = res {
            self.count += size
        }
        res
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
