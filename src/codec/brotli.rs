//! Brotli-backed codec sessions.
//!
//! This is the only module that names the `brotli` crate. Everything above
//! it drives the engine through the [`Encode`], [`Decode`], and [`Concat`]
//! traits, so the engine could be swapped without touching the framing or
//! concatenation logic.

use brotli::concat::{BroCatli, BroCatliResult};
use brotli::enc::encode::{
    BrotliEncoderOperation, BrotliEncoderParameter, BrotliEncoderStateStruct,
};
use brotli::enc::StandardAlloc;
use brotli::{BrotliDecompressStream, BrotliResult, BrotliState};

use crate::codec::{CodecStatus, Concat, Decode, Encode, Progress};
use crate::error::{Error, Result};
use crate::frames::{StreamFlags, WindowBits};

/// A compress-mode brotli session.
pub struct EncodeSession {
    state: BrotliEncoderStateStruct<StandardAlloc>,
}

impl std::fmt::Debug for EncodeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodeSession").finish_non_exhaustive()
    }
}

impl EncodeSession {
    /// Create a session with the given quality, window size, and framing
    /// flags. The caller validates the ranges before construction.
    pub fn new(quality: u32, window: WindowBits, flags: StreamFlags) -> Self {
        let mut state = BrotliEncoderStateStruct::new(StandardAlloc::default());
        state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_QUALITY, quality);
        state.set_parameter(
            BrotliEncoderParameter::BROTLI_PARAM_LGWIN,
            u32::from(window.get()),
        );

        if flags.catable {
            state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_CATABLE, 1);
        }
        if flags.appendable {
            state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_APPENDABLE, 1);
        }
        if flags.byte_align {
            state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_BYTE_ALIGN, 1);
        }
        if flags.bare {
            state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_BARE_STREAM, 1);
        }
        if flags.magic_number {
            state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_MAGIC_NUMBER, 1);
        }

        Self { state }
    }

    fn run(
        &mut self,
        op: BrotliEncoderOperation,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize)> {
        let mut available_in = input.len();
        let mut next_in = 0;
        let mut available_out = output.len();
        let mut next_out = 0;

        if !self.state.compress_stream(
            op,
            &mut available_in,
            input,
            &mut next_in,
            &mut available_out,
            output,
            &mut next_out,
            &mut None,
            &mut |_, _, _, _| (),
        ) {
            return Err(Error::InvalidData);
        }

        Ok((next_in, next_out))
    }
}

impl Encode for EncodeSession {
    fn feed(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress> {
        let (consumed, produced) =
            self.run(BrotliEncoderOperation::BROTLI_OPERATION_PROCESS, input, output)?;

        let status = if consumed == input.len() {
            CodecStatus::NeedMoreSourceData
        } else {
            CodecStatus::DestinationTooSmall
        };

        Ok(Progress {
            consumed,
            produced,
            status,
        })
    }

    fn drain(&mut self, output: &mut [u8], finish: bool) -> Result<Progress> {
        let op = if finish {
            BrotliEncoderOperation::BROTLI_OPERATION_FINISH
        } else {
            BrotliEncoderOperation::BROTLI_OPERATION_FLUSH
        };
        let (consumed, produced) = self.run(op, &[], output)?;

        let status = if finish {
            if self.state.is_finished() {
                CodecStatus::Done
            } else {
                CodecStatus::DestinationTooSmall
            }
        } else if produced == output.len() {
            CodecStatus::DestinationTooSmall
        } else {
            CodecStatus::Done
        };

        Ok(Progress {
            consumed,
            produced,
            status,
        })
    }

    fn is_finished(&mut self) -> bool {
        self.state.is_finished()
    }
}

/// A decompress-mode brotli session.
pub struct DecodeSession {
    state: BrotliState<StandardAlloc, StandardAlloc, StandardAlloc>,
}

impl std::fmt::Debug for DecodeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeSession").finish_non_exhaustive()
    }
}

impl DecodeSession {
    pub fn new() -> Self {
        Self {
            state: BrotliState::new(
                StandardAlloc::default(),
                StandardAlloc::default(),
                StandardAlloc::default(),
            ),
        }
    }
}

impl Default for DecodeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Decode for DecodeSession {
    fn feed(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress> {
        let mut available_in = input.len();
        let mut next_in = 0;
        let mut available_out = output.len();
        let mut next_out = 0;
        let mut total_out = 0;

        let status = match BrotliDecompressStream(
            &mut available_in,
            &mut next_in,
            input,
            &mut available_out,
            &mut next_out,
            output,
            &mut total_out,
            &mut self.state,
        ) {
            BrotliResult::ResultSuccess => CodecStatus::Done,
            BrotliResult::NeedsMoreInput => CodecStatus::NeedMoreSourceData,
            BrotliResult::NeedsMoreOutput => CodecStatus::DestinationTooSmall,
            BrotliResult::ResultFailure => return Err(Error::InvalidData),
        };

        Ok(Progress {
            consumed: next_in,
            produced: next_out,
            status,
        })
    }
}

/// A concatenation session over the engine's stream-merging state.
pub struct ConcatSession {
    state: BroCatli,
}

impl ConcatSession {
    /// `window` pins the output window size; `None` lets each segment's
    /// own (or the engine's maximum) window size stand.
    pub fn new(window: Option<WindowBits>) -> Self {
        let state = match window {
            Some(window) => BroCatli::new_with_window_size(window.get()),
            None => BroCatli::new(),
        };
        Self { state }
    }
}

impl Concat for ConcatSession {
    fn next_segment(&mut self) {
        self.state.new_brotli_file();
    }

    fn feed(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress> {
        let mut in_offset = 0;
        let mut out_offset = 0;
        let status = concat_status(self.state.stream(
            input,
            &mut in_offset,
            output,
            &mut out_offset,
        ))?;

        Ok(Progress {
            consumed: in_offset,
            produced: out_offset,
            status,
        })
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<Progress> {
        let mut out_offset = 0;
        let status = concat_status(self.state.finish(output, &mut out_offset))?;

        Ok(Progress {
            consumed: 0,
            produced: out_offset,
            status,
        })
    }
}

fn concat_status(result: BroCatliResult) -> Result<CodecStatus> {
    match result {
        BroCatliResult::Success => Ok(CodecStatus::Done),
        BroCatliResult::NeedsMoreInput => Ok(CodecStatus::NeedMoreSourceData),
        BroCatliResult::NeedsMoreOutput => Ok(CodecStatus::DestinationTooSmall),
        BroCatliResult::BrotliFileNotCraftedForAppend => Err(Error::NotAppendable),
        BroCatliResult::BrotliFileNotCraftedForConcatenation => Err(Error::NotCatable),
        BroCatliResult::InvalidWindowSize
        | BroCatliResult::WindowSizeLargerThanPreviousFile => Err(Error::WindowSizeExceeded),
    }
}
