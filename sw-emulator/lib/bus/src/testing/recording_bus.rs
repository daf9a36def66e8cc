/*++

Licensed under the Apache-2.0 license.

File Name:

    recording_bus.rs

Abstract:

    File contains a RAM backed Bus that records every access.

--*/
use crate::{Bus, BusAddr, BusData, BusError, BusSize, Ram};
use std::{cell::RefCell, ops::Range, rc::Rc};

/// One access seen by a [`RecordingBus`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Access {
    Read {
        size: BusSize,
        addr: BusAddr,
        result: Result<BusData, BusError>,
    },
    Write {
        size: BusSize,
        addr: BusAddr,
        val: BusData,
    },
}

impl Access {
    pub fn addr(&self) -> BusAddr {
        match *self {
            Access::Read { addr, .. } | Access::Write { addr, .. } => addr,
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Access::Read { .. })
    }
}

/// Accesses shared between a [`RecordingBus`] and the tests holding clones
/// of its log. Clones see the same records.
#[derive(Clone, Default)]
pub struct AccessLog {
    accesses: Rc<RefCell<Vec<Access>>>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, access: Access) {
        self.accesses.borrow_mut().push(access);
    }

    /// Drain the records made so far.
    pub fn take(&self) -> Vec<Access> {
        std::mem::take(&mut *self.accesses.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.accesses.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accesses.borrow().is_empty()
    }

    /// Number of reads that landed inside `range`.
    pub fn reads_in(&self, range: Range<BusAddr>) -> usize {
        self.accesses
            .borrow()
            .iter()
            .filter(|access| access.is_read() && range.contains(&access.addr()))
            .count()
    }

    /// Number of writes that landed inside `range`.
    pub fn writes_in(&self, range: Range<BusAddr>) -> usize {
        self.accesses
            .borrow()
            .iter()
            .filter(|access| !access.is_read() && range.contains(&access.addr()))
            .count()
    }
}

/// A Bus implementation backed by [`Ram`] that records every read and write.
///
/// # Example
///
/// ```
/// use se_emu_bus::{Bus, BusSize, testing::{Access, RecordingBus}};
///
/// let mut bus = RecordingBus::new(0x2000_0000, 16);
/// let log = bus.log.clone();
/// bus.write(BusSize::Word, 0x2000_0004, 0x35).unwrap();
/// assert_eq!(bus.read(BusSize::Byte, 0x2000_0004), Ok(0x35));
/// assert_eq!(log.reads_in(0x2000_0000..0x2000_0010), 1);
/// assert_eq!(
///     log.take()[0],
///     Access::Write { size: BusSize::Word, addr: 0x2000_0004, val: 0x35 }
/// );
/// ```
pub struct RecordingBus {
    pub ram: Ram,
    pub log: AccessLog,
}

impl RecordingBus {
    pub fn new(base: BusAddr, size: usize) -> Self {
        Self {
            ram: Ram::zeroed(base, size),
            log: AccessLog::new(),
        }
    }
}

impl Bus for RecordingBus {
    fn read(&mut self, size: BusSize, addr: BusAddr) -> Result<BusData, BusError> {
        let result = self.ram.read(size, addr);
        self.log.record(Access::Read { size, addr, result });
        result
    }

    fn write(&mut self, size: BusSize, addr: BusAddr, val: BusData) -> Result<(), BusError> {
        self.log.record(Access::Write { size, addr, val });
        self.ram.write(size, addr, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAccessor;

    #[test]
    fn test_recording_bus() {
        let mut bus = RecordingBus::new(0x100, 8);

        assert_eq!(bus.write(BusSize::HalfWord, 0x102, 0xcafe), Ok(()));
        assert_eq!(
            bus.log.take(),
            [Access::Write {
                size: BusSize::HalfWord,
                addr: 0x102,
                val: 0xcafe
            }]
        );

        assert_eq!(bus.read(BusSize::Word, 0x100), Ok(0xcafe_0000));
        assert_eq!(bus.read(BusSize::Byte, 0x108), Err(BusError::LoadAccessFault));
        assert_eq!(
            bus.log.take(),
            [
                Access::Read {
                    size: BusSize::Word,
                    addr: 0x100,
                    result: Ok(0xcafe_0000)
                },
                Access::Read {
                    size: BusSize::Byte,
                    addr: 0x108,
                    result: Err(BusError::LoadAccessFault)
                },
            ]
        );
        assert!(bus.log.is_empty());
    }

    #[test]
    fn test_clones_share_records() {
        let mut bus = RecordingBus::new(0x100, 8);
        let log = bus.log.clone();
        bus.write_bytes(0x104, &[1, 2, 3]).unwrap();
        bus.read_vec(0x100, 2).unwrap();
        assert_eq!(log.len(), 5);
        assert_eq!(log.writes_in(0x104..0x108), 3);
        assert_eq!(log.reads_in(0x104..0x108), 0);
        assert_eq!(log.reads_in(0x100..0x102), 2);
        assert_eq!(bus.ram.data()[4..7], [1, 2, 3]);
    }
}
