use assert_matches::assert_matches;
use easy_hex::Hex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use brotli_blocks::concat::{concat_blocks, BlockCat};
use brotli_blocks::error::Error;
use brotli_blocks::frames::WindowBits;

mod test_utils;

proptest! {
    #[test]
    fn test_concat_is_transparent_to_content(
        first in test_utils::arb_nonempty_data(),
        second in test_utils::arb_nonempty_data(),
        window in test_utils::arb_window_bits(),
    ) {
        let segment_a = test_utils::compress_concat_segment(&first[..], window);
        let segment_b = test_utils::compress_concat_segment(&second[..], window);

        let mut merged = vec![];
        concat_blocks([&segment_a[..], &segment_b[..]], &mut merged, None).unwrap();

        let mut content = first[..].to_vec();
        content.extend_from_slice(&second[..]);

        let decoded = test_utils::std_decompress(&merged[..]);
        assert_eq!(Hex(decoded), Hex(content));
    }

    #[test]
    fn test_concat_incremental_matches_oneshot(
        first in test_utils::arb_nonempty_data(),
        second in test_utils::arb_nonempty_data(),
        third in test_utils::arb_nonempty_data(),
        window in test_utils::arb_window_bits(),
    ) {
        let segments: Vec<Vec<u8>> = [&first, &second, &third]
            .iter()
            .map(|data| test_utils::compress_concat_segment(&data[..], window))
            .collect();

        let mut oneshot = vec![];
        concat_blocks(segments.iter().map(|s| &s[..]), &mut oneshot, None).unwrap();

        let mut incremental = vec![];
        let mut cat = BlockCat::new(None);
        for segment in &segments {
            cat.append(&segment[..], &mut incremental).unwrap();
        }
        cat.finish(&mut incremental).unwrap();

        assert_eq!(Hex(incremental), Hex(oneshot));
    }

    #[test]
    fn test_concat_widens_to_target_window(
        first in test_utils::arb_nonempty_data(),
        second in test_utils::arb_nonempty_data(),
    ) {
        let narrow = WindowBits::new(11).unwrap();
        let wide = WindowBits::new(22).unwrap();

        let segment_a = test_utils::compress_concat_segment(&first[..], narrow);
        let segment_b = test_utils::compress_concat_segment(&second[..], narrow);

        let mut merged = vec![];
        concat_blocks([&segment_a[..], &segment_b[..]], &mut merged, Some(wide)).unwrap();

        let mut content = first[..].to_vec();
        content.extend_from_slice(&second[..]);

        let decoded = test_utils::std_decompress(&merged[..]);
        assert_eq!(Hex(decoded), Hex(content));
    }
}

#[test]
fn test_concat_rejects_window_larger_than_target() {
    let wide = WindowBits::new(22).unwrap();
    let narrow = WindowBits::new(11).unwrap();

    let data = b"window size compatibility is checked per segment";
    let segment_a = test_utils::compress_concat_segment(data, wide);
    let segment_b = test_utils::compress_concat_segment(data, wide);

    let mut merged = vec![];
    let result = concat_blocks([&segment_a[..], &segment_b[..]], &mut merged, Some(narrow));

    assert_matches!(result, Err(Error::WindowSizeExceeded));
}

#[test]
fn test_concat_rejects_uncrafted_segments() {
    let data = b"an ordinary stream is not crafted for concatenation";
    let segment_a = test_utils::std_compress(data, 9, WindowBits::DEFAULT);
    let segment_b = test_utils::std_compress(data, 9, WindowBits::DEFAULT);

    let mut merged = vec![];
    let result = concat_blocks([&segment_a[..], &segment_b[..]], &mut merged, None);

    assert!(matches!(
        result,
        Err(Error::NotCatable | Error::NotAppendable)
    ));
}
