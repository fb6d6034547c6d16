use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use brotli_blocks::error::Error;
use brotli_blocks::frames::{start_block, BlockPosition, WindowBits, END_BLOCK};

mod test_utils;

#[test]
fn test_end_block_is_final_empty_metablock() {
    assert_eq!(END_BLOCK, [0x03]);
}

#[test]
fn test_window_bits_range() {
    assert_matches!(WindowBits::new(9), Err(Error::WindowBitsOutOfRange(9)));
    assert_matches!(WindowBits::new(25), Err(Error::WindowBitsOutOfRange(25)));
    assert_eq!(WindowBits::new(10).unwrap().get(), 10);
    assert_eq!(WindowBits::new(24).unwrap().get(), 24);
    assert_eq!(WindowBits::DEFAULT.get(), 22);
}

#[test]
fn test_position_markers() {
    assert!(BlockPosition::First.needs_start());
    assert!(!BlockPosition::First.needs_end());

    assert!(!BlockPosition::Middle.needs_start());
    assert!(!BlockPosition::Middle.needs_end());

    assert!(!BlockPosition::Last.needs_start());
    assert!(BlockPosition::Last.needs_end());

    assert!(BlockPosition::Single.needs_start());
    assert!(BlockPosition::Single.needs_end());
}

#[test]
fn test_position_for_index() {
    assert_eq!(BlockPosition::for_index(0, 1), BlockPosition::Single);

    assert_eq!(BlockPosition::for_index(0, 4), BlockPosition::First);
    assert_eq!(BlockPosition::for_index(1, 4), BlockPosition::Middle);
    assert_eq!(BlockPosition::for_index(2, 4), BlockPosition::Middle);
    assert_eq!(BlockPosition::for_index(3, 4), BlockPosition::Last);
}

#[test]
fn test_start_block_is_idempotent() {
    for bits in WindowBits::MIN.get()..=WindowBits::MAX.get() {
        let window = WindowBits::new(bits).unwrap();

        let first = start_block(window).unwrap();
        let second = start_block(window).unwrap();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}

#[test]
fn test_start_block_concurrent_first_use() {
    let window = WindowBits::new(19).unwrap();

    let blocks: Vec<&'static [u8]> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || start_block(window).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for block in &blocks {
        assert_eq!(*block, blocks[0]);
    }
}

#[test]
fn test_empty_framed_stream_decodes_to_empty() {
    for bits in WindowBits::MIN.get()..=WindowBits::MAX.get() {
        let window = WindowBits::new(bits).unwrap();

        let mut framed = vec![];
        framed.extend_from_slice(start_block(window).unwrap());
        framed.extend_from_slice(&END_BLOCK);

        let decoded = test_utils::std_decompress(&framed[..]);
        assert_eq!(decoded, Vec::<u8>::new());
    }
}
