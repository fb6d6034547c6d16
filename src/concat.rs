//! Merge independently produced catable segments into one decodable
//! stream, without decompressing and recompressing the content.

use crate::{
    buffer::{drain_to_writer, with_codec_out_buffer, FixedBuffer},
    codec::brotli::ConcatSession,
    codec::{CodecStatus, Concat},
    error::{Error, Result},
    frames::WindowBits,
};

/// Default size in bytes of the concatenation transfer buffers.
pub const DEFAULT_CONCAT_BUFFER_SIZE: usize = 4096;

/// An incremental concatenation run.
///
/// Segments are appended in order with [`BlockCat::append`]; each append
/// signals a new logical file to the session so it realigns its
/// bookkeeping at the segment boundary without altering the decompressed
/// content. [`BlockCat::finish`] drains the tail of the merged stream.
///
/// Output moves through a bounded buffer with backpressure: the session
/// is only re-invoked once the buffer has been fully drained to the sink.
///
/// Any error is fatal for the run. There is no partial-success mode, and
/// bytes already flushed to the sink are undefined after a failure.
pub struct BlockCat<C = ConcatSession>
where
    C: Concat,
{
    session: C,
    buffer: FixedBuffer<Vec<u8>>,
    input: Vec<u8>,
}

impl BlockCat<ConcatSession> {
    /// Start a run. `window` pins the output window size, which every
    /// segment must fit within; `None` lets each segment's own (or the
    /// engine's maximum) window size stand.
    pub fn new(window: Option<WindowBits>) -> Self {
        Self::with_session(ConcatSession::new(window), DEFAULT_CONCAT_BUFFER_SIZE)
            .expect("default concat buffer size is nonzero")
    }
}

impl<C> BlockCat<C>
where
    C: Concat,
{
    /// Start a run over a caller-provided session and transfer buffer
    /// size.
    pub fn with_session(session: C, buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(Error::ZeroBufferSize);
        }

        Ok(Self {
            session,
            buffer: FixedBuffer::new(vec![0; buffer_size]),
            input: vec![0; buffer_size],
        })
    }

    /// Append one complete segment from `source`, draining merged output
    /// to `sink` as it accumulates.
    pub fn append<R, W>(&mut self, mut source: R, sink: &mut W) -> Result<()>
    where
        R: std::io::Read,
        W: std::io::Write,
    {
        self.session.next_segment();

        loop {
            let read = source.read(&mut self.input)?;
            if read == 0 {
                return Ok(());
            }

            let mut fed = 0;
            while fed < read {
                let session = &mut self.session;
                let input = &self.input[fed..read];
                let progress = with_codec_out_buffer(&mut self.buffer, |out| {
                    session.feed(input, out)
                })?;
                fed += progress.consumed;

                if let CodecStatus::DestinationTooSmall = progress.status {
                    drain_to_writer(&mut self.buffer, sink)?;
                }
            }
        }
    }

    /// Drain the remaining merged output and end the run.
    pub fn finish<W>(mut self, sink: &mut W) -> Result<()>
    where
        W: std::io::Write,
    {
        loop {
            let session = &mut self.session;
            let progress = with_codec_out_buffer(&mut self.buffer, |out| session.finish(out))?;
            drain_to_writer(&mut self.buffer, sink)?;

            if let CodecStatus::Done = progress.status {
                return Ok(());
            }
        }
    }
}

/// Concatenate an ordered sequence of catable segments into `sink` as one
/// decodable stream.
///
/// Every segment must have been compressed with the catable flag set:
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::io::Write as _;
///
/// use brotli_blocks::frames::StreamFlags;
/// use brotli_blocks::writer::BlockWriter;
///
/// let catable = StreamFlags {
///     catable: true,
///     appendable: true,
///     byte_align: true,
///     ..StreamFlags::default()
/// };
///
/// let mut segment_a = Vec::new();
/// let mut writer = BlockWriter::builder(&mut segment_a).with_flags(catable).build()?;
/// writer.write_all(b"hello ")?;
/// writer.finish()?;
///
/// let mut segment_b = Vec::new();
/// let mut writer = BlockWriter::builder(&mut segment_b).with_flags(catable).build()?;
/// writer.write_all(b"world")?;
/// writer.finish()?;
///
/// let mut merged = Vec::new();
/// brotli_blocks::concat::concat_blocks([&segment_a[..], &segment_b[..]], &mut merged, None)?;
/// # Ok(())
/// # }
/// ```
pub fn concat_blocks<R, W>(
    sources: impl IntoIterator<Item = R>,
    sink: &mut W,
    window: Option<WindowBits>,
) -> Result<()>
where
    R: std::io::Read,
    W: std::io::Write,
{
    let mut cat = BlockCat::new(window);
    for source in sources {
        cat.append(source, sink)?;
    }
    cat.finish(sink)
}
