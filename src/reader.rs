use std::io::BufRead as _;
use std::time::{Duration, Instant};

use crate::{
    buffer::{Buffer, FixedBuffer},
    codec::brotli::DecodeSession,
    decoder::BlockDecoder,
    error::{Error, Result},
    frames::{BlockPosition, WindowBits},
};

/// A reader that decompresses a block stream from an underlying reader.
///
/// The configured [`BlockPosition`] names the framing the stored segment
/// already carries; whatever is missing is synthesized while reading, so
/// an individually stored block decodes standalone:
///
/// - [`BlockPosition::Single`] (the default): an ordinary complete
///   stream, nothing synthesized.
/// - [`BlockPosition::First`]: the end block is synthesized at source
///   exhaustion.
/// - [`BlockPosition::Middle`]: both the start block (for the configured
///   window size) and the end block are synthesized.
/// - [`BlockPosition::Last`]: the start block is synthesized.
///
/// ## Construction
///
/// Create a builder using either [`BlockReader::builder`] (recommended)
/// or [`BlockReader::builder_buffered`] (to use a custom input buffer).
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let stored_block: &[u8] = &[];
/// use brotli_blocks::frames::BlockPosition;
///
/// let reader = brotli_blocks::reader::BlockReader::builder(stored_block)
///     .with_position(BlockPosition::Middle)
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// ## Buffering
///
/// The decompressed output is always buffered internally. Since the
/// reader must also implement [`std::io::BufRead`], the compressed input
/// must be buffered too: [`BlockReader::builder`] wraps any
/// [`std::io::Read`] with an appropriately sized [`std::io::BufReader`],
/// while [`BlockReader::builder_buffered`] uses the caller's buffer
/// directly.
#[derive(Debug)]
pub struct BlockReader<R> {
    reader: R,
    decoder: BlockDecoder<DecodeSession>,
    buffer: FixedBuffer<Vec<u8>>,
    read_timeout: Option<Duration>,
}

impl<R> BlockReader<std::io::BufReader<R>> {
    /// Create a new block reader that decompresses the stream from the
    /// underlying reader. The provided reader will be wrapped with an
    /// appropriately-sized buffer.
    pub fn builder(reader: R) -> BlockReaderBuilder<std::io::BufReader<R>>
    where
        R: std::io::Read,
    {
        BlockReaderBuilder::new(reader)
    }

    /// Create a new block reader over a source that already implements
    /// [`std::io::BufRead`], using its buffer directly. When in doubt,
    /// use [`BlockReader::builder`].
    pub fn builder_buffered(reader: R) -> BlockReaderBuilder<R> {
        BlockReaderBuilder::with_buffered(reader)
    }
}

impl<R> std::io::Read for BlockReader<R>
where
    R: std::io::BufRead,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let filled = self.fill_buf()?;
        let consumable = filled.len().min(buf.len());
        buf[..consumable].copy_from_slice(&filled[..consumable]);
        self.consume(consumable);
        Ok(consumable)
    }
}

impl<R> std::io::BufRead for BlockReader<R>
where
    R: std::io::BufRead,
{
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        let deadline = self.read_timeout.map(|timeout| Instant::now() + timeout);

        loop {
            if !self.buffer.uncommitted().is_empty() {
                break;
            }
            if self.decoder.is_done() {
                break;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(Error::ReadTimeout.into());
            }

            let decodable = self.reader.fill_buf()?;
            if decodable.is_empty() {
                self.decoder.finish(&mut self.buffer)?;
                continue;
            }

            let consumed = self.decoder.decode(decodable, &mut self.buffer)?;
            self.reader.consume(consumed);
        }

        Ok(self.buffer.uncommitted())
    }

    fn consume(&mut self, amt: usize) {
        self.buffer.commit(amt);
    }
}

/// A builder that builds a [`BlockReader`] from the provided reader.
pub struct BlockReaderBuilder<R> {
    reader: R,
    position: BlockPosition,
    window: WindowBits,
    buffer_size: usize,
    read_timeout: Option<Duration>,
}

impl<R> BlockReaderBuilder<std::io::BufReader<R>> {
    fn new(reader: R) -> Self
    where
        R: std::io::Read,
    {
        let reader = std::io::BufReader::with_capacity(crate::DEFAULT_BUFFER_SIZE, reader);
        BlockReaderBuilder::with_buffered(reader)
    }
}

impl<R> BlockReaderBuilder<R> {
    fn with_buffered(reader: R) -> Self {
        Self {
            reader,
            position: BlockPosition::Single,
            window: WindowBits::DEFAULT,
            buffer_size: crate::DEFAULT_BUFFER_SIZE,
            read_timeout: None,
        }
    }

    /// The framing the stored segment carries. Defaults to
    /// [`BlockPosition::Single`], an ordinary complete stream.
    pub fn with_position(mut self, position: BlockPosition) -> Self {
        self.position = position;
        self
    }

    /// Window size used for synthesized start blocks. Defaults to
    /// [`WindowBits::DEFAULT`]. It must be at least the window size the
    /// segment was compressed with.
    pub fn with_window_bits(mut self, window: WindowBits) -> Self {
        self.window = window;
        self
    }

    /// Size of the decompressed transfer buffer. Defaults to
    /// [`crate::DEFAULT_BUFFER_SIZE`].
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Abort a single blocked read call once it has run this long. The
    /// session state is left untouched by the abort. Disabled by default.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Build the reader.
    pub fn build(self) -> Result<BlockReader<R>> {
        if self.buffer_size == 0 {
            return Err(Error::ZeroBufferSize);
        }

        let session = DecodeSession::new();
        let decoder = BlockDecoder::new(session, self.position, self.window);
        let buffer = FixedBuffer::new(vec![0; self.buffer_size]);

        Ok(BlockReader {
            reader: self.reader,
            decoder,
            buffer,
            read_timeout: self.read_timeout,
        })
    }
}
