/*++

Licensed under the Apache-2.0 license.

File Name:

    types.rs

Abstract:

    File contains the address, data and access-size types shared by every
    device on the host bus.

--*/

/// Bus data width
pub type BusData = u32;

/// Bus address width
pub type BusAddr = u32;

/// Bus IO operation size
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum BusSize {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}

impl BusSize {
    /// Number of bytes moved by an access of this size
    pub const fn bytes(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for BusSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BusSize::Byte => write!(f, "Byte"),
            BusSize::HalfWord => write!(f, "HalfWord"),
            BusSize::Word => write!(f, "Word"),
        }
    }
}
