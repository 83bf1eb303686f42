//! Best-effort OS color-scheme detection
//!
//! Probes the host once per call; any failure (missing tool, sandboxed
//! process, unsupported desktop) reads as
//! [`SystemPreference::NoPreference`]. Detection never errors and never
//! panics.

use crate::system::SystemPreference;

/// Query the operating system's current light/dark preference
pub fn detect_system_preference() -> SystemPreference {
    let detected = detect_impl();
    tracing::debug!(?detected, "system color-scheme detection");
    detected
}

#[cfg(target_os = "macos")]
fn detect_impl() -> SystemPreference {
    use std::process::Command;

    // AppleInterfaceStyle is only set when dark mode is active; a missing
    // key means light mode, a failed spawn means no capability.
    match Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
    {
        Ok(output) if output.status.success() => {
            let style = String::from_utf8_lossy(&output.stdout);
            if style.trim().eq_ignore_ascii_case("dark") {
                SystemPreference::Dark
            } else {
                SystemPreference::Light
            }
        }
        Ok(_) => SystemPreference::Light,
        Err(_) => SystemPreference::NoPreference,
    }
}

#[cfg(target_os = "linux")]
fn detect_impl() -> SystemPreference {
    use std::process::Command;

    let output = match Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return SystemPreference::NoPreference,
    };

    let scheme = String::from_utf8_lossy(&output.stdout);
    let scheme = scheme.trim().trim_matches('\'');
    match scheme {
        "prefer-dark" => SystemPreference::Dark,
        "prefer-light" => SystemPreference::Light,
        _ => SystemPreference::NoPreference,
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn detect_impl() -> SystemPreference {
    SystemPreference::NoPreference
}
