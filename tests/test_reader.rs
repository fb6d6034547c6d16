use std::io::Read as _;

use assert_matches::assert_matches;
use easy_hex::Hex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use brotli_blocks::block;
use brotli_blocks::error::Error;
use brotli_blocks::frames::{BlockPosition, WindowBits};
use brotli_blocks::reader::BlockReader;

mod test_utils;

proptest! {
    #[test]
    fn test_reader_decode_standard_stream(
        data in test_utils::arb_data(),
        quality in test_utils::arb_quality(),
        window in test_utils::arb_window_bits(),
    ) {
        let encoded = test_utils::std_compress(&data[..], quality, window);

        let mut reader = BlockReader::builder(&encoded[..]).build().unwrap();
        let mut decoded = vec![];
        reader.read_to_end(&mut decoded).unwrap();

        assert_eq!(Hex(decoded), data);
    }

    #[test]
    fn test_reader_decode_bare_block(
        data in test_utils::arb_data(),
        window in test_utils::arb_window_bits(),
    ) {
        let encoded = block::compress(&data[..], true, window).unwrap();

        let mut reader = BlockReader::builder(&encoded[..])
            .with_position(BlockPosition::Middle)
            .with_window_bits(window)
            .build()
            .unwrap();
        let mut decoded = vec![];
        reader.read_to_end(&mut decoded).unwrap();

        assert_eq!(Hex(decoded), data);
    }

    #[test]
    fn test_reader_decode_small_buffer(
        data in test_utils::arb_data(),
        window in test_utils::arb_window_bits(),
    ) {
        let encoded = block::compress(&data[..], true, window).unwrap();

        // A tiny transfer buffer forces repeated destination-too-small
        // round trips through the decoder.
        let mut reader = BlockReader::builder(&encoded[..])
            .with_position(BlockPosition::Middle)
            .with_window_bits(window)
            .with_buffer_size(3)
            .build()
            .unwrap();
        let mut decoded = vec![];
        reader.read_to_end(&mut decoded).unwrap();

        assert_eq!(Hex(decoded), data);
    }

    #[test]
    fn test_reader_stops_at_stream_end(
        data in test_utils::arb_data(),
        window in test_utils::arb_window_bits(),
    ) {
        let mut encoded = test_utils::std_compress(&data[..], 5, window);
        encoded.extend_from_slice(b"trailing bytes beyond the stream");

        let mut reader = BlockReader::builder(&encoded[..]).build().unwrap();
        let mut decoded = vec![];
        reader.read_to_end(&mut decoded).unwrap();

        assert_eq!(Hex(decoded), data);
    }
}

#[test]
fn test_reader_returns_zero_after_end() {
    let data = b"some content to compress";
    let encoded = test_utils::std_compress(data, 5, WindowBits::DEFAULT);

    let mut reader = BlockReader::builder(&encoded[..]).build().unwrap();
    let mut decoded = vec![];
    reader.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, data);

    let mut buf = [0u8; 16];
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_reader_truncated_bare_block_is_invalid() {
    let data: Vec<u8> = b"a block that will certainly span more than a couple of bytes "
        .iter()
        .cycle()
        .take(4096)
        .copied()
        .collect();
    let encoded = block::compress(&data, true, WindowBits::DEFAULT).unwrap();
    let truncated = &encoded[..encoded.len() / 2];

    let result = block::decompress_block(truncated, BlockPosition::Middle, WindowBits::DEFAULT);
    assert_matches!(result, Err(Error::InvalidData));
}

#[test]
fn test_reader_rejects_zero_buffer_size() {
    let result = BlockReader::builder(&b""[..]).with_buffer_size(0).build();
    assert_matches!(result, Err(Error::ZeroBufferSize));
}
