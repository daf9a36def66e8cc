/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains definition of the Bus trait.

--*/

use crate::{BusAddr, BusData, BusSize};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Load address misaligned exception
    LoadAddrMisaligned,

    /// Load access fault exception
    LoadAccessFault,

    /// Store address misaligned exception
    StoreAddrMisaligned,

    /// Store access fault exception
    StoreAccessFault,
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BusError::LoadAddrMisaligned => write!(f, "load address misaligned"),
            BusError::LoadAccessFault => write!(f, "load access fault"),
            BusError::StoreAddrMisaligned => write!(f, "store address misaligned"),
            BusError::StoreAccessFault => write!(f, "store access fault"),
        }
    }
}

impl std::error::Error for BusError {}

/// Represents the host memory as seen by the secure element. Every descriptor,
/// key buffer and payload the secure element touches is read and written
/// through this trait, so all accesses are observable by the owner of the bus.
pub trait Bus {
    /// Read data of specified size from given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the read
    /// * `addr` - Address to read from
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::LoadAccessFault` or `BusError::LoadAddrMisaligned`
    fn read(&mut self, size: BusSize, addr: BusAddr) -> Result<BusData, BusError>;

    /// Write data of specified size to given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the write
    /// * `addr` - Address to write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::StoreAccessFault` or `BusError::StoreAddrMisaligned`
    fn write(&mut self, size: BusSize, addr: BusAddr, val: BusData) -> Result<(), BusError>;
}

impl<T: Bus + ?Sized> Bus for Box<T> {
    fn read(&mut self, size: BusSize, addr: BusAddr) -> Result<BusData, BusError> {
        T::read(self, size, addr)
    }

    fn write(&mut self, size: BusSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        T::write(self, size, addr, val)
    }
}

impl<T: Bus + ?Sized> Bus for &mut T {
    fn read(&mut self, size: BusSize, addr: BusAddr) -> Result<BusData, BusError> {
        T::read(self, size, addr)
    }

    fn write(&mut self, size: BusSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        T::write(self, size, addr, val)
    }
}
