use crate::{
    buffer::{with_codec_out_buffer, Buffer},
    codec::{CodecStatus, Encode, Progress},
    error::Result,
    BlockOutcome,
};

/// Drives a compress-mode codec session over a bounded output buffer.
///
/// The session's output lands in the buffer handed to each call; whenever
/// the buffer fills before the session is satisfied, the call reports
/// [`BlockOutcome::HasMore`] and must be repeated once the buffer has been
/// drained.
#[derive(Debug)]
pub struct BlockEncoder<E> {
    session: E,
    state: BlockEncoderState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockEncoderState {
    Encoding,
    Finishing,
    Finished,
}

impl<E> BlockEncoder<E>
where
    E: Encode,
{
    pub fn new(session: E) -> Self {
        Self {
            session,
            state: BlockEncoderState::Encoding,
        }
    }

    /// Feed `data`, writing compressed bytes into `buffer`. Completes with
    /// the number of input bytes consumed.
    pub fn encode(&mut self, data: &[u8], buffer: &mut impl Buffer) -> Result<BlockOutcome<usize>> {
        debug_assert_eq!(self.state, BlockEncoderState::Encoding);

        let session = &mut self.session;
        let progress = with_codec_out_buffer(buffer, |out| session.feed(data, out))?;

        if progress.consumed == 0 && !data.is_empty() {
            Ok(BlockOutcome::HasMore {
                remaining_bytes: data.len(),
            })
        } else {
            Ok(BlockOutcome::Complete(progress.consumed))
        }
    }

    /// Emit any buffered-but-unwritten session output without ending the
    /// stream.
    pub fn flush(&mut self, buffer: &mut impl Buffer) -> Result<BlockOutcome<()>> {
        match self.state {
            BlockEncoderState::Encoding => {
                let session = &mut self.session;
                let progress = with_codec_out_buffer(buffer, |out| session.drain(out, false))?;
                outcome_of(progress, buffer)
            }
            BlockEncoderState::Finishing | BlockEncoderState::Finished => {
                Ok(BlockOutcome::Complete(()))
            }
        }
    }

    /// Force the session to emit everything it holds and mark the stream
    /// finished. Idempotent once complete.
    pub fn finish(&mut self, buffer: &mut impl Buffer) -> Result<BlockOutcome<()>> {
        match self.state {
            BlockEncoderState::Encoding | BlockEncoderState::Finishing => {
                self.state = BlockEncoderState::Finishing;

                let session = &mut self.session;
                let progress = with_codec_out_buffer(buffer, |out| session.drain(out, true))?;

                if let CodecStatus::Done = progress.status {
                    self.state = BlockEncoderState::Finished;
                }
                outcome_of(progress, buffer)
            }
            BlockEncoderState::Finished => Ok(BlockOutcome::Complete(())),
        }
    }
}

fn outcome_of(progress: Progress, buffer: &mut impl Buffer) -> Result<BlockOutcome<()>> {
    match progress.status {
        CodecStatus::Done => Ok(BlockOutcome::Complete(())),
        CodecStatus::NeedMoreSourceData | CodecStatus::DestinationTooSmall => {
            Ok(BlockOutcome::HasMore {
                remaining_bytes: buffer.uncommitted().len().max(1),
            })
        }
    }
}
