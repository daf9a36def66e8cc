/*++

Licensed under the Apache-2.0 license.

File Name:

    ram.rs

Abstract:

    File contains implementation of RAM

--*/

use crate::{mem::Mem, Bus, BusAddr, BusData, BusError, BusSize};

/// Random Access Memory Device mapped at a base address
pub struct Ram {
    /// First bus address covered by the RAM
    base: BusAddr,

    /// Data
    data: Mem,
}

impl Ram {
    /// Create new RAM
    ///
    /// # Arguments
    ///
    /// * `base` - Bus address of the first byte
    /// * `data` - Data to be stored in the RAM
    pub fn new(base: BusAddr, data: Vec<u8>) -> Self {
        Self {
            base,
            data: Mem::new(data),
        }
    }

    /// Create zero filled RAM of `size` bytes
    pub fn zeroed(base: BusAddr, size: usize) -> Self {
        Self::new(base, vec![0; size])
    }

    pub fn base(&self) -> BusAddr {
        self.base
    }

    pub fn mmap_size(&self) -> BusAddr {
        self.data.len() as BusAddr
    }

    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.data_mut()
    }

    fn offset(&self, addr: BusAddr) -> Option<BusAddr> {
        addr.checked_sub(self.base)
    }
}

impl Bus for Ram {
    /// Read data of specified size from given address
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::LoadAccessFault`
    fn read(&mut self, size: BusSize, addr: BusAddr) -> Result<BusData, BusError> {
        let offset = self.offset(addr).ok_or(BusError::LoadAccessFault)?;
        Ok(self.data.read(size, offset)?)
    }

    /// Write data of specified size to given address
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::StoreAccessFault`
    fn write(&mut self, size: BusSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        let offset = self.offset(addr).ok_or(BusError::StoreAccessFault)?;
        Ok(self.data.write(size, offset, val)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read() {
        let mut ram = Ram::new(0x1000, vec![1, 2, 3, 4]);
        assert_eq!(ram.read(BusSize::Byte, 0x1000).ok(), Some(1));
        assert_eq!(ram.read(BusSize::HalfWord, 0x1000).ok(), Some(1 | 2 << 8));
        assert_eq!(
            ram.read(BusSize::Word, 0x1000).ok(),
            Some(1 | 2 << 8 | 3 << 16 | 4 << 24)
        );
    }

    #[test]
    fn test_read_error() {
        let mut ram = Ram::zeroed(0x1000, 4);
        assert_eq!(
            ram.read(BusSize::Byte, 0x1000 + ram.mmap_size()).err(),
            Some(BusError::LoadAccessFault)
        );
        assert_eq!(
            ram.read(BusSize::Byte, 0xfff).err(),
            Some(BusError::LoadAccessFault)
        );
    }

    #[test]
    fn test_write() {
        let mut ram = Ram::zeroed(0x1000, 4);
        assert_eq!(ram.write(BusSize::Word, 0x1000, 0x0403_0201).ok(), Some(()));
        assert_eq!(ram.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_write_error() {
        let mut ram = Ram::zeroed(0x1000, 4);
        assert_eq!(
            ram.write(BusSize::Word, 0x1002, 0).err(),
            Some(BusError::StoreAccessFault)
        );
        assert_eq!(
            ram.write(BusSize::Byte, 0, 0).err(),
            Some(BusError::StoreAccessFault)
        );
    }
}
