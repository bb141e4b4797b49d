// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Photo storage constants
pub mod photo {
    /// Album folder created under the XDG pictures directory
    pub const ALBUM_FOLDER: &str = "Viewfinder";

    /// Timestamp pattern for photo filenames (millisecond precision)
    pub const FILENAME_TIMESTAMP: &str = "%Y-%m-%d-%H-%M-%S-%3f";
}

/// Flash and torch constants
pub mod flash {
    /// Time the flash stays lit before the shutter fires, in milliseconds
    pub const FLASH_LEAD_MS: u64 = 1000;

    /// Mean luma (0.0 - 1.0) below which auto flash fires
    pub const AUTO_FLASH_LUMA_THRESHOLD: f32 = 0.25;
}

/// UI timing constants
pub mod ui {
    /// Capture button press animation duration in milliseconds
    pub const CAPTURE_ANIMATION_MS: u64 = 150;

    /// How long a transient notice stays on screen, in milliseconds
    pub const NOTICE_DURATION_MS: u64 = 4000;

    /// Capture button inner circle diameter
    pub const CAPTURE_BUTTON_INNER: f32 = 56.0;

    /// Capture button outer (tap target) diameter
    pub const CAPTURE_BUTTON_OUTER: f32 = 72.0;

    /// Capture button corner radius (half the inner size for a circle)
    pub const CAPTURE_BUTTON_RADIUS: f32 = 28.0;
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffers queued in the appsink before old frames are dropped
    pub const MAX_BUFFERS: u32 = 2;

    /// Number of threads for videoconvert elements
    pub fn videoconvert_threads() -> u32 {
        std::thread::available_parallelism()
            .map(|n| n.get().min(4) as u32)
            .unwrap_or(2)
    }
}

/// Pipeline timing constants
pub mod timing {
    /// Timeout when waiting for the pipeline to reach PLAYING, in seconds
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Timeout when waiting for the pipeline to reach NULL, in seconds
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Timeout for the initial state change query, in milliseconds
    pub const STATE_CHANGE_TIMEOUT_MS: u64 = 3000;

    /// Log frame statistics every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 120;

    /// Seconds between camera hotplug re-enumerations
    pub const HOTPLUG_POLL_SECS: u64 = 2;
}

/// Format enumeration constants
pub mod formats {
    /// Framerates offered when the backend cannot report them
    pub const COMMON_FRAMERATES: &[u32] = &[30, 60];
}

/// Application metadata helpers
pub mod app_info {
    /// Version string baked in at build time
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Whether the app is running inside a flatpak sandbox
    pub fn is_flatpak() -> bool {
        std::path::Path::new("/.flatpak-info").exists()
    }
}
