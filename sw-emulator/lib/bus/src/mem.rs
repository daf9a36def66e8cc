/*++

Licensed under the Apache-2.0 license.

File Name:

    mem.rs

Abstract:

    File contains the little-endian byte storage backing memory devices on the
    host bus.

--*/

use crate::{BusAddr, BusData, BusError, BusSize};

/// Memory Exception
#[derive(Debug, PartialEq, Eq)]
pub enum MemError {
    /// Read Access fault
    ReadAccessFault,

    /// Write access fault
    WriteAccessFault,
}

impl From<MemError> for BusError {
    /// Converts to this type from the input type.
    fn from(exception: MemError) -> BusError {
        match exception {
            MemError::ReadAccessFault => BusError::LoadAccessFault,
            MemError::WriteAccessFault => BusError::StoreAccessFault,
        }
    }
}

/// Memory
pub struct Mem {
    /// Data storage
    data: Vec<u8>,
}

impl Mem {
    /// Create a new memory object
    ///
    /// # Arguments
    ///
    /// * `data` - Data contents for memory
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Size of the memory in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Immutable reference to data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable reference to data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read data of specified size from given offset. Multi-byte values are
    /// assembled little-endian and need not be aligned.
    ///
    /// # Error
    ///
    /// * `MemError::ReadAccessFault` - Read from invalid or non existent address
    #[inline]
    pub fn read(&self, size: BusSize, offset: BusAddr) -> Result<BusData, MemError> {
        let range = self
            .range(size, offset)
            .ok_or(MemError::ReadAccessFault)?;
        Ok(self.data[range]
            .iter()
            .rev()
            .fold(0, |acc, byte| acc << 8 | BusData::from(*byte)))
    }

    /// Write data of specified size to given offset. Only the low `size` bytes
    /// of `val` are stored.
    ///
    /// # Error
    ///
    /// * `MemError::WriteAccessFault` - Write to invalid or non existent address
    #[inline]
    pub fn write(&mut self, size: BusSize, offset: BusAddr, val: BusData) -> Result<(), MemError> {
        let range = self
            .range(size, offset)
            .ok_or(MemError::WriteAccessFault)?;
        self.data[range].copy_from_slice(&val.to_le_bytes()[..size.bytes()]);
        Ok(())
    }

    fn range(&self, size: BusSize, offset: BusAddr) -> Option<std::ops::Range<usize>> {
        let start = offset as usize;
        let end = start.checked_add(size.bytes())?;
        (end <= self.data.len()).then_some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let mem = Mem::new(vec![1, 2, 3, 4]);
        assert_eq!(mem.len(), 4);
        assert_eq!(mem.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_read_little_endian() {
        let mem = Mem::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(mem.read(BusSize::Byte, 4), Ok(5));
        assert_eq!(mem.read(BusSize::HalfWord, 0), Ok(0x0201));
        assert_eq!(mem.read(BusSize::Word, 0), Ok(0x0403_0201));
        assert_eq!(mem.read(BusSize::Word, 1), Ok(0x0504_0302));
    }

    #[test]
    fn test_read_past_end() {
        let mem = Mem::new(vec![1, 2, 3, 4]);
        assert_eq!(mem.read(BusSize::Word, 1), Err(MemError::ReadAccessFault));
        assert_eq!(mem.read(BusSize::Byte, 4), Err(MemError::ReadAccessFault));
        assert_eq!(
            mem.read(BusSize::Word, u32::MAX),
            Err(MemError::ReadAccessFault)
        );
    }

    #[test]
    fn test_write() {
        let mut mem = Mem::new(vec![0; 6]);
        assert_eq!(mem.write(BusSize::Word, 1, 0xdead_beef), Ok(()));
        assert_eq!(mem.write(BusSize::Byte, 0, 0x1234_5678), Ok(()));
        assert_eq!(mem.data(), &[0x78, 0xef, 0xbe, 0xad, 0xde, 0]);
        assert_eq!(
            mem.write(BusSize::HalfWord, 5, 0),
            Err(MemError::WriteAccessFault)
        );
        mem.data_mut()[5] = 7;
        assert_eq!(mem.read(BusSize::HalfWord, 4), Ok(0x07de));
    }
}
