use std::time::{Duration, Instant};

use crate::{
    buffer::{drain_to_writer, FixedBuffer},
    codec::brotli::EncodeSession,
    encoder::BlockEncoder,
    error::{Error, Result},
    frames::{StreamFlags, WindowBits},
    BlockOutcome,
};

/// Highest quality the engine accepts; also the default.
pub const MAX_QUALITY: u32 = 11;

/// A writer that compresses data into an underlying writer.
///
/// The framing flags chosen at build time decide what kind of stream
/// comes out: no flags produce an ordinary self-contained brotli stream,
/// while [`StreamFlags::CATABLE_BLOCK`] produces a bare, catable segment
/// ready to be framed with the start/end blocks from [`crate::frames`].
///
/// ## Construction
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::io::Write as _;
///
/// let mut compressed = Vec::new();
/// let mut writer = brotli_blocks::writer::BlockWriter::builder(&mut compressed)
///     .with_quality(9)
///     .build()?;
/// writer.write_all(b"some data")?;
/// writer.finish()?;
/// # Ok(())
/// # }
/// ```
///
/// ## Finishing
///
/// [`BlockWriter::finish`] forces the engine to emit everything it still
/// holds, marks the stream complete, and hands the underlying writer
/// back. Dropping the writer performs the same shutdown on a best-effort
/// basis; pass `&mut sink` (or call `finish`) when the sink must outlive
/// the compression.
#[derive(Debug)]
pub struct BlockWriter<W>
where
    W: std::io::Write,
{
    writer: Option<W>,
    encoder: BlockEncoder<EncodeSession>,
    buffer: FixedBuffer<Vec<u8>>,
    write_timeout: Option<Duration>,
    finished: bool,
}

impl<W> BlockWriter<W>
where
    W: std::io::Write,
{
    pub fn builder(writer: W) -> BlockWriterBuilder<W> {
        BlockWriterBuilder::new(writer)
    }

    /// Emit all remaining compressed data, mark the stream complete, and
    /// return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.shutdown().map_err(Error::from_io)?;
        Ok(self.writer.take().expect("writer already taken"))
    }

    fn shutdown(&mut self) -> std::io::Result<()> {
        loop {
            self.flush_uncommitted()?;

            match self.encoder.finish(&mut self.buffer)? {
                BlockOutcome::HasMore { .. } => {}
                BlockOutcome::Complete(()) => break,
            }
        }

        self.flush_uncommitted()?;
        self.finished = true;
        Ok(())
    }

    fn flush_uncommitted(&mut self) -> std::io::Result<()> {
        let writer = self.writer.as_mut().expect("writer already taken");
        drain_to_writer(&mut self.buffer, writer)
    }
}

impl<W> std::io::Write for BlockWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        let deadline = self.write_timeout.map(|timeout| Instant::now() + timeout);

        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(Error::WriteTimeout.into());
            }

            self.flush_uncommitted()?;

            match self.encoder.encode(data, &mut self.buffer)? {
                BlockOutcome::HasMore { .. } => {}
                BlockOutcome::Complete(consumed) => {
                    return Ok(consumed);
                }
            }
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        loop {
            self.flush_uncommitted()?;

            match self.encoder.flush(&mut self.buffer)? {
                BlockOutcome::HasMore { .. } => {}
                BlockOutcome::Complete(()) => break,
            }
        }

        self.flush_uncommitted()?;
        self.writer.as_mut().expect("writer already taken").flush()
    }
}

impl<W> Drop for BlockWriter<W>
where
    W: std::io::Write,
{
    fn drop(&mut self) {
        if !self.finished && self.writer.is_some() {
            let _ = self.shutdown();
        }
    }
}

/// A builder that builds a [`BlockWriter`] over the provided writer.
///
/// Argument ranges are checked by [`BlockWriterBuilder::build`], before
/// any byte of I/O happens.
pub struct BlockWriterBuilder<W> {
    writer: W,
    quality: u32,
    window: WindowBits,
    flags: StreamFlags,
    buffer_size: usize,
    write_timeout: Option<Duration>,
}

impl<W> BlockWriterBuilder<W> {
    fn new(writer: W) -> Self {
        Self {
            writer,
            quality: MAX_QUALITY,
            window: WindowBits::DEFAULT,
            flags: StreamFlags::default(),
            buffer_size: crate::DEFAULT_BUFFER_SIZE,
            write_timeout: None,
        }
    }

    /// Compression quality, `0..=11`. Defaults to 11.
    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    /// Window size exponent. Defaults to [`WindowBits::DEFAULT`].
    pub fn with_window_bits(mut self, window: WindowBits) -> Self {
        self.window = window;
        self
    }

    /// Framing flags for the produced stream. Defaults to none, i.e. an
    /// ordinary self-contained stream.
    pub fn with_flags(mut self, flags: StreamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Size of the compressed transfer buffer. Defaults to
    /// [`crate::DEFAULT_BUFFER_SIZE`].
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Abort a single blocked write call once it has run this long. The
    /// session state is left untouched by the abort. Disabled by default.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Build the writer.
    pub fn build(self) -> Result<BlockWriter<W>>
    where
        W: std::io::Write,
    {
        if self.quality > MAX_QUALITY {
            return Err(Error::QualityOutOfRange(self.quality));
        }
        if self.buffer_size == 0 {
            return Err(Error::ZeroBufferSize);
        }

        let session = EncodeSession::new(self.quality, self.window, self.flags);
        let buffer = FixedBuffer::new(vec![0; self.buffer_size]);

        Ok(BlockWriter {
            writer: Some(self.writer),
            encoder: BlockEncoder::new(session),
            buffer,
            write_timeout: self.write_timeout,
            finished: false,
        })
    }
}
