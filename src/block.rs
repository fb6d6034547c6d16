//! Per-block orchestration: compress or decompress one block at a time,
//! split a continuous input into fixed-size chunks, and assemble stored
//! segments back into a complete stream.
//!
//! A block's [`BlockPosition`] decides its framing: the catable payload
//! is always crafted with [`StreamFlags::CATABLE_BLOCK`], a First/Single
//! block is prefixed with the start block, and a Last/Single block is
//! terminated with the end block. Concatenating one First block, any
//! number of Middle blocks, and one Last block yields the same stream as
//! a Single block over the concatenated content.

use std::io::{Read as _, Write as _};

use crate::{
    error::{Error, Result},
    frames::{self, BlockPosition, StreamFlags, WindowBits},
    reader::BlockReader,
    writer::BlockWriter,
};

/// Compress `bytes` as one block at the given stream position.
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use brotli_blocks::block;
/// use brotli_blocks::frames::{BlockPosition, WindowBits};
///
/// let window = WindowBits::DEFAULT;
/// let compressed = block::compress_block(b"abc", BlockPosition::Single, window)?;
/// let decompressed = block::decompress_block(&compressed[..], BlockPosition::Single, window)?;
/// assert_eq!(decompressed, b"abc");
/// # Ok(())
/// # }
/// ```
pub fn compress_block(bytes: &[u8], position: BlockPosition, window: WindowBits) -> Result<Vec<u8>> {
    let mut writer = FramedBlockWriter::new(Vec::new(), position, window)?;
    writer.write_all(bytes).map_err(Error::from_io)?;
    writer.finish()
}

/// Compress `bytes` as one stream, either an ordinary self-contained
/// stream or (with `bare`) a raw catable segment with no framing at all.
pub fn compress(bytes: &[u8], bare: bool, window: WindowBits) -> Result<Vec<u8>> {
    let flags = if bare {
        StreamFlags::CATABLE_BLOCK
    } else {
        StreamFlags::default()
    };

    let mut compressed = Vec::new();
    let mut writer = BlockWriter::builder(&mut compressed)
        .with_window_bits(window)
        .with_flags(flags)
        .build()?;
    writer.write_all(bytes).map_err(Error::from_io)?;
    writer.finish()?;

    Ok(compressed)
}

/// Decompress one stored block, synthesizing whatever framing its
/// position says it lacks. `window` must be at least the window size the
/// block was compressed with.
pub fn decompress_block<R>(
    compressed: R,
    position: BlockPosition,
    window: WindowBits,
) -> Result<Vec<u8>>
where
    R: std::io::Read,
{
    let mut reader = BlockReader::builder(compressed)
        .with_position(position)
        .with_window_bits(window)
        .build()?;

    let mut decompressed = Vec::new();
    reader
        .read_to_end(&mut decompressed)
        .map_err(Error::from_io)?;
    Ok(decompressed)
}

/// Assemble independently stored catable segments into `sink` as one
/// complete stream: `start block || segment* || end block`.
///
/// This is the retrieval path of a content-addressable block store: the
/// segments are appended byte-for-byte as stored, in manifest order.
pub fn assemble_blocks<W>(
    segments: impl IntoIterator<Item = impl AsRef<[u8]>>,
    window: WindowBits,
    sink: &mut W,
) -> Result<()>
where
    W: std::io::Write,
{
    sink.write_all(frames::start_block(window)?)?;
    for segment in segments {
        sink.write_all(segment.as_ref())?;
    }
    sink.write_all(&frames::END_BLOCK)?;
    Ok(())
}

/// A writer that produces one framed block: the start block when the
/// position calls for one, a catable payload, and (on
/// [`FramedBlockWriter::finish`]) the end block when the position calls
/// for one.
///
/// Dropping the writer without calling `finish` flushes the payload but
/// leaves the stream unterminated.
pub struct FramedBlockWriter<W>
where
    W: std::io::Write,
{
    inner: BlockWriter<W>,
    needs_end: bool,
}

impl<W> FramedBlockWriter<W>
where
    W: std::io::Write,
{
    pub fn new(mut sink: W, position: BlockPosition, window: WindowBits) -> Result<Self> {
        if position.needs_start() {
            sink.write_all(frames::start_block(window)?)?;
        }

        let inner = BlockWriter::builder(sink)
            .with_window_bits(window)
            .with_flags(StreamFlags::CATABLE_BLOCK)
            .build()?;

        Ok(Self {
            inner,
            needs_end: position.needs_end(),
        })
    }

    /// Finish the payload, append the end block when the position calls
    /// for one, and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        let mut sink = self.inner.finish()?;
        if self.needs_end {
            sink.write_all(&frames::END_BLOCK)?;
        }
        Ok(sink)
    }
}

impl<W> std::io::Write for FramedBlockWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.inner.write(data)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// A writer that splits a continuous input at a fixed byte boundary,
/// compressing every chunk as its own independent framed block through a
/// fresh compression session.
///
/// Each chunk is flushed as a complete output: `open_chunk` is called
/// with the chunk index to obtain its sink (one file per chunk, say), and
/// the sink is dropped as soon as the chunk is finished. The per-chunk
/// `position` defaults to the store-friendly [`BlockPosition::Middle`],
/// leaving every chunk a bare catable segment for later assembly.
pub struct ChunkedBlockWriter<W, F>
where
    W: std::io::Write,
    F: FnMut(u64) -> std::io::Result<W>,
{
    open_chunk: F,
    chunk_size: u64,
    position: BlockPosition,
    window: WindowBits,
    current: Option<FramedBlockWriter<W>>,
    chunk_index: u64,
    written_in_chunk: u64,
}

impl<W, F> ChunkedBlockWriter<W, F>
where
    W: std::io::Write,
    F: FnMut(u64) -> std::io::Result<W>,
{
    pub fn new(chunk_size: u64, window: WindowBits, open_chunk: F) -> Self {
        assert!(chunk_size > 0, "chunk size must be greater than 0");

        Self {
            open_chunk,
            chunk_size,
            position: BlockPosition::Middle,
            window,
            current: None,
            chunk_index: 0,
            written_in_chunk: 0,
        }
    }

    /// Apply `position` framing to every produced chunk instead of
    /// [`BlockPosition::Middle`].
    pub fn with_position(mut self, position: BlockPosition) -> Self {
        self.position = position;
        self
    }

    /// Finish the trailing partial chunk, if any, and return the number
    /// of chunks produced.
    pub fn finish(mut self) -> Result<u64> {
        if self.current.is_some() {
            self.finish_chunk().map_err(Error::from_io)?;
        }
        Ok(self.chunk_index)
    }

    fn ensure_chunk(&mut self) -> std::io::Result<&mut FramedBlockWriter<W>> {
        if self.current.is_none() {
            let sink = (self.open_chunk)(self.chunk_index)?;
            let writer = FramedBlockWriter::new(sink, self.position, self.window)?;
            self.current = Some(writer);
        }

        Ok(self.current.as_mut().expect("chunk writer just opened"))
    }

    fn finish_chunk(&mut self) -> std::io::Result<()> {
        if let Some(writer) = self.current.take() {
            writer.finish()?;
        }

        self.chunk_index += 1;
        self.written_in_chunk = 0;
        Ok(())
    }
}

impl<W, F> std::io::Write for ChunkedBlockWriter<W, F>
where
    W: std::io::Write,
    F: FnMut(u64) -> std::io::Result<W>,
{
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let remaining_in_chunk = self.chunk_size - self.written_in_chunk;
        let data_len: u64 = data
            .len()
            .try_into()
            .expect("could not convert write length to u64");
        let writable: usize = data_len
            .min(remaining_in_chunk)
            .try_into()
            .expect("could not convert chunk remainder to usize");

        let writer = self.ensure_chunk()?;
        let written = writer.write(&data[..writable])?;
        self.written_in_chunk += written as u64;

        if self.written_in_chunk == self.chunk_size {
            self.finish_chunk()?;
        }

        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.current {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}
