/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Secure Element Emulator Bus library.

--*/
mod accessor;
mod bus;
mod mem;
mod ram;
mod types;

pub mod testing;

pub use crate::accessor::MemoryAccessor;
pub use crate::bus::{Bus, BusError};
pub use crate::ram::Ram;
pub use crate::types::{BusAddr, BusData, BusSize};
