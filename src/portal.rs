// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission via the XDG desktop portal D-Bus API
//!
//! Asks `org.freedesktop.portal.Camera.AccessCamera` once per application
//! start and waits for the user's decision on the portal Request object.
//! Sessions without a portal (plain desktop, no sandbox) are treated as
//! granted; device presence is handled separately by camera enumeration.

use futures::StreamExt;
use std::collections::HashMap;
use tracing::{info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_BUS: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";

/// Response code on `org.freedesktop.portal.Request::Response` meaning the
/// user granted the request (1 = cancelled, 2 = other failure)
const RESPONSE_GRANTED: u32 = 0;

/// Request camera access from the desktop portal.
///
/// Returns `Ok(true)` when access is granted, `Ok(false)` when the user
/// denied it, and `Err` only when the portal exists but the request itself
/// broke down.
pub async fn request_camera_access() -> Result<bool, String> {
    let connection = match zbus::Connection::session().await {
        Ok(connection) => connection,
        Err(e) => {
            info!(error = %e, "No session bus, assuming direct camera access");
            return Ok(true);
        }
    };

    let proxy = match zbus::Proxy::new(
        &connection,
        PORTAL_BUS,
        PORTAL_PATH,
        "org.freedesktop.portal.Camera",
    )
    .await
    {
        Ok(proxy) => proxy,
        Err(e) => {
            info!(error = %e, "Camera portal not available, assuming direct camera access");
            return Ok(true);
        }
    };

    // The handle_token lets us know the request object path ahead of racing
    // the Response signal
    let handle_token = format!("viewfinder_{}", std::process::id());
    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(handle_token.as_str()));

    let request_path: OwnedObjectPath = match proxy.call("AccessCamera", &(options,)).await {
        Ok(path) => path,
        Err(e) => {
            // Portal daemon present but no camera interface (older xdg-desktop-portal)
            info!(error = %e, "AccessCamera unavailable, assuming direct camera access");
            return Ok(true);
        }
    };

    info!(request = %request_path, "Waiting for camera access decision");

    let request_proxy = zbus::Proxy::new(
        &connection,
        PORTAL_BUS,
        request_path.as_str(),
        "org.freedesktop.portal.Request",
    )
    .await
    .map_err(|e| format!("Failed to create portal request proxy: {}", e))?;

    let mut responses = request_proxy
        .receive_signal("Response")
        .await
        .map_err(|e| format!("Failed to subscribe to portal response: {}", e))?;

    match responses.next().await {
        Some(msg) => {
            let (code, _results): (u32, HashMap<String, OwnedValue>) = msg
                .body()
                .deserialize()
                .map_err(|e| format!("Malformed portal response: {}", e))?;

            let granted = code == RESPONSE_GRANTED;
            if granted {
                info!("Camera access granted");
            } else {
                warn!(code, "Camera access denied by portal");
            }
            Ok(granted)
        }
        None => Err("Portal request closed without a response".to_string()),
    }
}
