#![allow(unused)]

use std::io::{Read as _, Write as _};

use proptest::prelude::*;

use brotli_blocks::frames::{StreamFlags, WindowBits};

pub type Data = easy_hex::Hex<Vec<u8>>;

pub const MAX_DATA_LENGTH: usize = 1000;

pub fn arb_data() -> impl Strategy<Value = Data> {
    prop::collection::vec(any::<u8>(), 0..=MAX_DATA_LENGTH).prop_map(easy_hex::Hex)
}

pub fn arb_nonempty_data() -> impl Strategy<Value = Data> {
    prop::collection::vec(any::<u8>(), 1..=MAX_DATA_LENGTH).prop_map(easy_hex::Hex)
}

pub fn arb_data_with_pos() -> impl Strategy<Value = (Data, usize)> {
    arb_data().prop_flat_map(|data| {
        let len = data.len();
        (Just(data), 0..=len)
    })
}

pub fn arb_data_blocks() -> impl Strategy<Value = Vec<Data>> {
    prop::collection::vec(arb_data(), 1..=8)
}

pub fn arb_quality() -> impl Strategy<Value = u32> {
    0u32..=11
}

pub fn arb_window_bits() -> impl Strategy<Value = WindowBits> {
    (WindowBits::MIN.get()..=WindowBits::MAX.get())
        .prop_map(|bits| WindowBits::new(bits).unwrap())
}

/// Compress with the stock `brotli` compressor, producing an ordinary
/// self-contained stream.
pub fn std_compress(data: &[u8], quality: u32, window: WindowBits) -> Vec<u8> {
    let mut compressed = Vec::new();
    {
        let mut writer =
            brotli::CompressorWriter::new(&mut compressed, 4096, quality, u32::from(window.get()));
        writer.write_all(data).unwrap();
    }
    compressed
}

/// Decompress with the stock `brotli` decompressor. Cross-validates that
/// streams assembled by this crate need no special decoder.
pub fn std_decompress(compressed: &[u8]) -> Vec<u8> {
    let mut decompressed = Vec::new();
    brotli::Decompressor::new(compressed, 4096)
        .read_to_end(&mut decompressed)
        .unwrap();
    decompressed
}

/// The crafting for complete (non-bare) streams that the concatenation
/// engine accepts as input segments.
pub fn concat_segment_flags() -> StreamFlags {
    StreamFlags {
        catable: true,
        appendable: true,
        byte_align: true,
        ..StreamFlags::default()
    }
}

/// Compress one complete catable stream for concatenation.
pub fn compress_concat_segment(data: &[u8], window: WindowBits) -> Vec<u8> {
    let mut compressed = Vec::new();
    let mut writer = brotli_blocks::writer::BlockWriter::builder(&mut compressed)
        .with_window_bits(window)
        .with_flags(concat_segment_flags())
        .build()
        .unwrap();
    writer.write_all(data).unwrap();
    writer.finish().unwrap();
    compressed
}
