//! Block framing: window sizes, framing flags, block positions, and the
//! start/end block byte sequences.
//!
//! A complete stream is `start block || bare segment* || end block`. The
//! start block depends only on the window size and is derived by
//! compressing an empty input with the appendable, byte-aligned, and bare
//! flags set. The end block is the fixed single byte `0x03`, the engine's
//! "final, empty metablock" signal.

use std::sync::OnceLock;

use crate::error::{Error, Result};

/// The fixed end block terminating a concatenated stream.
pub const END_BLOCK: [u8; 1] = [0x03];

/// Window size exponent for the engine's history dictionary.
///
/// Segments intended for concatenation must be framed with a window size
/// no larger than any consumer expects, so the exponent is validated on
/// construction rather than at every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowBits(u8);

impl WindowBits {
    pub const MIN: WindowBits = WindowBits(10);
    pub const MAX: WindowBits = WindowBits(24);
    pub const DEFAULT: WindowBits = WindowBits(22);

    /// Validate and wrap a window size exponent.
    pub fn new(bits: u8) -> Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(Error::WindowBitsOutOfRange(bits))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for WindowBits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for WindowBits {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        Self::new(bits)
    }
}

/// The five independently settable framing flags for a compress-mode
/// session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamFlags {
    /// Omit the outer stream container, leaving the raw metablock stream.
    pub bare: bool,
    /// Craft the segment so it can be byte-concatenated with adjacent
    /// segments and remain jointly decodable.
    pub catable: bool,
    /// Craft the segment so further bare segments may follow it without
    /// re-opening its encoding state.
    pub appendable: bool,
    /// Pad the segment to a byte boundary.
    pub byte_align: bool,
    /// Emit the engine's magic-number metadata block.
    pub magic_number: bool,
}

impl StreamFlags {
    /// The crafting for an individually storable, concatenation-ready
    /// block payload.
    pub const CATABLE_BLOCK: StreamFlags = StreamFlags {
        bare: true,
        catable: true,
        appendable: true,
        byte_align: true,
        magic_number: true,
    };

    /// The crafting that derives the start block bytes.
    pub(crate) const START_BLOCK: StreamFlags = StreamFlags {
        bare: true,
        catable: false,
        appendable: true,
        byte_align: true,
        magic_number: false,
    };
}

/// Where a block sits within the assembled stream, which decides the
/// framing around its catable payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockPosition {
    /// Leads the stream: carries the start block, no end block.
    First,
    /// Pure bare payload: no start block, no end block.
    Middle,
    /// Terminates the stream: no start block, carries the end block.
    Last,
    /// A complete stream on its own: carries both.
    Single,
}

impl BlockPosition {
    /// Whether a block at this position carries the leading start block.
    pub fn needs_start(self) -> bool {
        match self {
            BlockPosition::First | BlockPosition::Single => true,
            BlockPosition::Middle | BlockPosition::Last => false,
        }
    }

    /// Whether a block at this position carries the trailing end block.
    pub fn needs_end(self) -> bool {
        match self {
            BlockPosition::Last | BlockPosition::Single => true,
            BlockPosition::First | BlockPosition::Middle => false,
        }
    }

    /// The position of chunk `index` out of `count` chunks assembled in
    /// order.
    pub fn for_index(index: usize, count: usize) -> Self {
        if count == 1 {
            BlockPosition::Single
        } else if index == 0 {
            BlockPosition::First
        } else if index + 1 == count {
            BlockPosition::Last
        } else {
            BlockPosition::Middle
        }
    }
}

static START_BLOCKS: [OnceLock<Vec<u8>>; (WindowBits::MAX.get() as usize) + 1] =
    [const { OnceLock::new() }; (WindowBits::MAX.get() as usize) + 1];

/// The start block bytes for `window`.
///
/// Computed on first use by compressing an empty input under
/// [`StreamFlags::START_BLOCK`] and cached for the lifetime of the
/// process. The bytes are a pure function of the window size, so
/// concurrent first-use calls may race on the computation but always
/// observe identical results.
pub fn start_block(window: WindowBits) -> Result<&'static [u8]> {
    let cell = &START_BLOCKS[window.get() as usize];
    if let Some(bytes) = cell.get() {
        return Ok(bytes);
    }

    let bytes = build_start_block(window)?;
    let _ = cell.set(bytes);
    Ok(cell.get().expect("start block cache was just populated"))
}

fn build_start_block(window: WindowBits) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let writer = crate::writer::BlockWriter::builder(&mut bytes)
        .with_window_bits(window)
        .with_flags(StreamFlags::START_BLOCK)
        .build()?;
    writer.finish()?;
    Ok(bytes)
}
