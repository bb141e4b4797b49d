// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera backend
//!
//! Camera discovery via `pw-cli` and preview capture via a GStreamer
//! `pipewiresrc` pipeline.

mod enumeration;
mod pipeline;

pub use enumeration::{
    enumerate_pipewire_cameras, get_pipewire_formats, is_pipewire_available,
    select_max_resolution_format,
};
pub use pipeline::PipeWirePipeline;
