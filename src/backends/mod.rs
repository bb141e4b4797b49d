// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstractions for hardware access

pub mod camera;
