// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the flash mode control

use viewfinder::FlashMode;

#[test]
fn test_three_taps_return_to_original_mode() {
    let mut mode = FlashMode::default();
    let original = mode;

    for _ in 0..3 {
        mode = mode.next();
    }

    assert_eq!(mode, original);
}

#[test]
fn test_flash_modes_are_distinct() {
    let first = FlashMode::default();
    let second = first.next();
    let third = second.next();

    assert_ne!(first, second);
    assert_ne!(second, third);
    assert_ne!(first, third);
}
