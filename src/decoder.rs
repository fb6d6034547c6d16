use crate::{
    buffer::{with_codec_out_buffer, Buffer},
    codec::{CodecStatus, Decode},
    error::{Error, Result},
    frames::{BlockPosition, WindowBits, END_BLOCK},
};

/// Drives a decompress-mode codec session over a bounded output buffer,
/// synthesizing the framing a block's position says it does not carry.
///
/// Per instance, the stages move strictly forward:
///
/// ```plain
/// StartBlock -> Streaming -> EndBlock -> Done
/// ```
///
/// `StartBlock` feeds the synthesized start block before the first real
/// source byte (skipped when the segment carries its own). `EndBlock`
/// feeds the synthesized end block once the source is exhausted (skipped
/// when the segment carries its own, in which case exhaustion is plain
/// end-of-stream). After `Done`, no output is ever produced again.
#[derive(Debug)]
pub struct BlockDecoder<D> {
    session: D,
    stage: DecoderStage,
    window: WindowBits,
    synthesize_end: bool,
}

#[derive(Debug, Clone, Copy)]
enum DecoderStage {
    StartBlock { offset: usize },
    Streaming,
    EndBlock { offset: usize },
    Done,
}

impl<D> BlockDecoder<D>
where
    D: Decode,
{
    pub fn new(session: D, position: BlockPosition, window: WindowBits) -> Self {
        let stage = if position.needs_start() {
            DecoderStage::Streaming
        } else {
            DecoderStage::StartBlock { offset: 0 }
        };

        Self {
            session,
            stage,
            window,
            synthesize_end: !position.needs_end(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, DecoderStage::Done)
    }

    /// Feed compressed source bytes, writing decompressed bytes into
    /// `buffer`. Returns the number of source bytes consumed.
    pub fn decode(&mut self, data: &[u8], buffer: &mut impl Buffer) -> Result<usize> {
        loop {
            match self.stage {
                DecoderStage::StartBlock { offset } => {
                    if !self.feed_start_block(offset, buffer)? {
                        return Ok(0);
                    }
                }
                DecoderStage::Streaming => {
                    let session = &mut self.session;
                    let progress = with_codec_out_buffer(buffer, |out| session.feed(data, out))?;

                    if let CodecStatus::Done = progress.status {
                        self.stage = DecoderStage::Done;
                    }
                    return Ok(progress.consumed);
                }
                DecoderStage::EndBlock { .. } | DecoderStage::Done => return Ok(0),
            }
        }
    }

    /// Handle source exhaustion: feed the synthesized end block when the
    /// segment lacks one, otherwise treat exhaustion as end-of-stream.
    ///
    /// May stop early with decompressed bytes left in `buffer`; the caller
    /// drains them and calls again until [`BlockDecoder::is_done`].
    pub fn finish(&mut self, buffer: &mut impl Buffer) -> Result<()> {
        loop {
            match self.stage {
                DecoderStage::StartBlock { offset } => {
                    if !self.feed_start_block(offset, buffer)? {
                        return Ok(());
                    }
                }
                DecoderStage::Streaming => {
                    if self.synthesize_end {
                        self.stage = DecoderStage::EndBlock { offset: 0 };
                    } else {
                        self.stage = DecoderStage::Done;
                        return Ok(());
                    }
                }
                DecoderStage::EndBlock { offset } => {
                    let session = &mut self.session;
                    let progress = with_codec_out_buffer(buffer, |out| {
                        session.feed(&END_BLOCK[offset..], out)
                    })?;
                    let offset = offset + progress.consumed;
                    self.stage = DecoderStage::EndBlock { offset };

                    match progress.status {
                        CodecStatus::Done => {
                            self.stage = DecoderStage::Done;
                            return Ok(());
                        }
                        CodecStatus::NeedMoreSourceData if offset == END_BLOCK.len() => {
                            // The end block did not complete the stream, so
                            // the bare payload was truncated.
                            return Err(Error::InvalidData);
                        }
                        CodecStatus::NeedMoreSourceData => {}
                        CodecStatus::DestinationTooSmall => return Ok(()),
                    }
                }
                DecoderStage::Done => return Ok(()),
            }
        }
    }

    /// Feed the synthesized start block from `offset`. Returns `false`
    /// when no forward progress is possible until the caller drains the
    /// buffer.
    fn feed_start_block(&mut self, offset: usize, buffer: &mut impl Buffer) -> Result<bool> {
        let start_block = crate::frames::start_block(self.window)?;

        let session = &mut self.session;
        let progress =
            with_codec_out_buffer(buffer, |out| session.feed(&start_block[offset..], out))?;
        let offset = offset + progress.consumed;

        if offset == start_block.len() {
            self.stage = DecoderStage::Streaming;
            Ok(true)
        } else {
            self.stage = DecoderStage::StartBlock { offset };
            Ok(progress.consumed > 0 || progress.produced > 0)
        }
    }
}
