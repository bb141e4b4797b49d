// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use viewfinder::Config;
use viewfinder::FlashMode;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(
        config.mirror_preview, true,
        "Mirror preview should be enabled by default"
    );
    assert_eq!(
        config.flash_mode,
        FlashMode::Off,
        "Flash should be off by default"
    );
    assert!(
        config.last_camera_path.is_none(),
        "No camera should be remembered on first run"
    );
}
