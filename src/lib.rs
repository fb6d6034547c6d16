//! Brotli block compression and concatenation.
//!
//! This crate produces and consumes brotli streams that are split into
//! independently compressed, byte-concatenable *blocks*. Each block is a
//! bare, catable, byte-aligned brotli segment; a complete stream is
//! assembled as `start block || segment* || end block`, where the start
//! block depends only on the window size and the end block is the single
//! byte `0x03`. Any standard brotli decompressor can decode the assembled
//! stream with no knowledge of the chunking, and blocks may be reordered
//! to reorder the corresponding decompressed content.
//!
//! - [`writer::BlockWriter`] / [`reader::BlockReader`]: blocking
//!   compress/decompress stream adapters over bounded buffers.
//! - [`frames`]: window sizes, framing flags, block positions, and the
//!   start/end block byte sequences.
//! - [`concat`]: merge independently produced catable segments into one
//!   decodable stream without recompression.
//! - [`block`]: per-block compress/decompress helpers, fixed-size
//!   chunking, and stream assembly.

pub mod block;
mod buffer;
pub mod codec;
pub mod concat;
mod decoder;
mod encoder;
pub mod error;
pub mod frames;
pub mod reader;
pub mod writer;

/// Default size in bytes of the adapter transfer buffers.
pub const DEFAULT_BUFFER_SIZE: usize = (1 << 16) - 16;

#[derive(Debug, Clone, Copy)]
enum BlockOutcome<T> {
    Complete(T),
    HasMore { remaining_bytes: usize },
}
