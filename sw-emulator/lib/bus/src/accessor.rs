/*++

Licensed under the Apache-2.0 license.

File Name:

    accessor.rs

Abstract:

    File contains the byte and word helpers the secure element uses to move
    data across the host bus.

--*/

use crate::{Bus, BusAddr, BusError, BusSize};

/// Byte and word level access to host memory, available on every [`Bus`].
///
/// Words are 32 bits and little-endian, matching the bus. Byte ranges are
/// transferred one byte at a time so every access stays visible to the bus.
pub trait MemoryAccessor: Bus {
    fn read_byte(&mut self, addr: BusAddr) -> Result<u8, BusError> {
        Ok(self.read(BusSize::Byte, addr)? as u8)
    }

    fn write_byte(&mut self, addr: BusAddr, val: u8) -> Result<(), BusError> {
        self.write(BusSize::Byte, addr, val.into())
    }

    fn read_word(&mut self, addr: BusAddr) -> Result<u32, BusError> {
        self.read(BusSize::Word, addr)
    }

    fn write_word(&mut self, addr: BusAddr, val: u32) -> Result<(), BusError> {
        self.write(BusSize::Word, addr, val)
    }

    /// Fill `buf` from consecutive addresses starting at `addr`.
    fn read_bytes(&mut self, addr: BusAddr, buf: &mut [u8]) -> Result<(), BusError> {
        for (i, byte) in buf.iter_mut().enumerate() {
            let addr = addr
                .checked_add(i as BusAddr)
                .ok_or(BusError::LoadAccessFault)?;
            *byte = self.read_byte(addr)?;
        }
        Ok(())
    }

    /// Read `len` bytes starting at `addr`.
    ///
    /// The result grows as bytes arrive, so an out of range `len` fails at
    /// the first bad address instead of reserving `len` bytes.
    fn read_vec(&mut self, addr: BusAddr, len: usize) -> Result<Vec<u8>, BusError> {
        let mut buf = Vec::new();
        for i in 0..len {
            let addr = addr
                .checked_add(i as BusAddr)
                .ok_or(BusError::LoadAccessFault)?;
            buf.push(self.read_byte(addr)?);
        }
        Ok(buf)
    }

    /// Store `data` at consecutive addresses starting at `addr`.
    fn write_bytes(&mut self, addr: BusAddr, data: &[u8]) -> Result<(), BusError> {
        for (i, byte) in data.iter().enumerate() {
            let addr = addr
                .checked_add(i as BusAddr)
                .ok_or(BusError::StoreAccessFault)?;
            self.write_byte(addr, *byte)?;
        }
        Ok(())
    }
}

impl<T: Bus + ?Sized> MemoryAccessor for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ram;

    #[test]
    fn test_words_are_little_endian() {
        let mut ram = Ram::zeroed(0x100, 8);
        ram.write_word(0x100, 0x4433_2211).unwrap();
        assert_eq!(ram.read_byte(0x100).unwrap(), 0x11);
        assert_eq!(ram.read_byte(0x103).unwrap(), 0x44);
        assert_eq!(ram.read_word(0x100).unwrap(), 0x4433_2211);
    }

    #[test]
    fn test_byte_ranges() {
        let mut ram = Ram::zeroed(0x100, 8);
        ram.write_bytes(0x102, b"abcd").unwrap();
        assert_eq!(ram.read_vec(0x101, 6).unwrap(), b"\0abcd\0");

        let mut buf = [0u8; 2];
        ram.read_bytes(0x104, &mut buf).unwrap();
        assert_eq!(&buf, b"cd");
    }

    #[test]
    fn test_range_faults() {
        let mut ram = Ram::zeroed(0x100, 4);
        assert_eq!(
            ram.read_vec(0x102, 4).err(),
            Some(BusError::LoadAccessFault)
        );
        assert_eq!(
            ram.write_bytes(0x103, &[1, 2]).err(),
            Some(BusError::StoreAccessFault)
        );
        // bytes before the fault are already stored
        assert_eq!(ram.data()[3], 1);
        assert_eq!(
            ram.read_vec(0x100, usize::MAX).err(),
            Some(BusError::LoadAccessFault)
        );
    }
}
