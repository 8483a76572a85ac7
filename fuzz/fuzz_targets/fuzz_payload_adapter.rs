#![no_main]
use libfuzzer_sys::fuzz_target;

use airq_core::{AveragingWindow, SourceKind, adapt};

fuzz_target!(|data: &[u8]| {
    // We fuzz JSON parsing plus payload adaptation across every source kind
    // and averaging window. Malformed payloads must come back as typed
    // errors, never as panics.
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    for kind in [SourceKind::Cloud, SourceKind::CloudLegacy, SourceKind::Local] {
        for window in [
            AveragingWindow::Instantaneous,
            AveragingWindow::TenMinutes,
            AveragingWindow::ThirtyMinutes,
            AveragingWindow::SixtyMinutes,
        ] {
            let _ = adapt(&value, window, kind);
        }
    }
});
