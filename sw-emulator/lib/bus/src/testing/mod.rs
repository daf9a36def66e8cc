/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains exports for code useful for testing against the host bus.

--*/
mod recording_bus;

pub use recording_bus::{Access, AccessLog, RecordingBus};
