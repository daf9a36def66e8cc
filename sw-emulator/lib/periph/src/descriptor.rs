/*++

Licensed under the Apache-2.0 license.

File Name:

    descriptor.rs

Abstract:

    File contains the DMA descriptor walker and the gather / scatter helpers
    command handlers use to move variable length data.

--*/

use crate::{CommandError, ResponseCode, SeError};
use se_emu_bus::{Bus, MemoryAccessor};
use tock_registers::{register_bitfields, LocalRegisterCopy};
use zeroize::Zeroizing;

/// Pointer value terminating a descriptor chain
pub const NULL_DESCRIPTOR: u32 = 1;

/// Size of a descriptor in host memory
pub const DESCRIPTOR_SIZE: u32 = 12;

/// Hops after which a chain is considered cyclic
pub const MAX_CHAIN_HOPS: usize = 4096;

register_bitfields! [
    u32,

    /// Descriptor control word
    Control [
        LENGTH OFFSET(0) NUMBITS(28) [],
        REGISTER OFFSET(28) NUMBITS(1) [],
        MEMORY_REALIGN OFFSET(29) NUMBITS(1) [],
        DISCARD OFFSET(30) NUMBITS(1) [],
    ],
];

/// Transfer options carried in the top bits of the control word
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct TransferFlags {
    /// Every word is transferred to or from the same address
    pub register: bool,

    pub memory_realign: bool,

    /// Output bytes for this hop are dropped
    pub discard: bool,
}

impl TransferFlags {
    pub const NONE: TransferFlags = TransferFlags {
        register: false,
        memory_realign: false,
        discard: false,
    };

    pub const DISCARD: TransferFlags = TransferFlags {
        register: false,
        memory_realign: false,
        discard: true,
    };

    pub const REGISTER: TransferFlags = TransferFlags {
        register: true,
        memory_realign: false,
        discard: false,
    };
}

/// Encode the control word of a descriptor.
pub fn encode_control(len: usize, flags: TransferFlags) -> u32 {
    let mut value = Control::LENGTH.val(len as u32);
    if flags.register {
        value += Control::REGISTER::SET;
    }
    if flags.memory_realign {
        value += Control::MEMORY_REALIGN::SET;
    }
    if flags.discard {
        value += Control::DISCARD::SET;
    }
    value.value
}

/// One hop of a descriptor chain
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Address of the descriptor itself
    pub pointer: u32,

    /// Address of the referenced data
    pub data: u32,

    /// Address of the next descriptor
    pub next: u32,

    control: LocalRegisterCopy<u32, Control::Register>,

    /// Referenced bytes, fetched when the descriptor was walked. Empty for
    /// discard hops.
    pub contents: Vec<u8>,
}

impl Descriptor {
    /// Decode the descriptor at `pointer` and fetch the data it references.
    ///
    /// # Error
    ///
    /// * `SeError::NullDescriptor` - `pointer` is the chain terminator
    /// * `ResponseCode::BusError` - Descriptor or data not readable
    pub fn walk<B: Bus>(
        bus: &mut B,
        pointer: u32,
        pointer_of: &'static str,
    ) -> Result<Self, CommandError> {
        let mut desc = Self::read(bus, pointer, pointer_of)?;
        if desc.len() > 0 && !desc.is_discard() {
            desc.contents = desc.fetch(bus)?;
        }
        Ok(desc)
    }

    /// Decode the descriptor at `pointer` without touching the data it
    /// references. `contents` is left empty.
    pub fn read<B: Bus>(
        bus: &mut B,
        pointer: u32,
        pointer_of: &'static str,
    ) -> Result<Self, CommandError> {
        if pointer == NULL_DESCRIPTOR {
            log::error!("Walked past the end of the {} descriptor chain", pointer_of);
            return Err(SeError::NullDescriptor { pointer_of }.into());
        }
        let data = bus.read_word(pointer)?;
        let next = bus.read_word(pointer.wrapping_add(4))?;
        let control = LocalRegisterCopy::new(bus.read_word(pointer.wrapping_add(8))?);

        let desc = Self {
            pointer,
            data,
            next,
            control,
            contents: Vec::new(),
        };
        log::debug!(
            "{} descriptor {:#010x}: data {:#010x} len {} flags {:#x} next {:#010x}",
            pointer_of,
            pointer,
            data,
            desc.len(),
            desc.control.get() >> 28,
            next
        );
        Ok(desc)
    }

    fn fetch<B: Bus>(&self, bus: &mut B) -> Result<Vec<u8>, CommandError> {
        let len = self.len();
        if !self.is_register() {
            return Ok(bus.read_vec(self.data, len)?);
        }
        let mut bytes = Vec::new();
        for _ in 0..(len + 3) / 4 {
            bytes.extend_from_slice(&bus.read_word(self.data)?.to_le_bytes());
        }
        bytes.truncate(len);
        Ok(bytes)
    }

    pub fn len(&self) -> usize {
        self.control.read(Control::LENGTH) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_register(&self) -> bool {
        self.control.is_set(Control::REGISTER)
    }

    pub fn is_memory_realign(&self) -> bool {
        self.control.is_set(Control::MEMORY_REALIGN)
    }

    pub fn is_discard(&self) -> bool {
        self.control.is_set(Control::DISCARD)
    }

    pub fn flags(&self) -> TransferFlags {
        TransferFlags {
            register: self.is_register(),
            memory_realign: self.is_memory_realign(),
            discard: self.is_discard(),
        }
    }
}

/// Lazily walked descriptor chain with a hop budget
struct Chain {
    next: u32,
    hops: usize,
    pointer_of: &'static str,
    fetch: bool,
}

impl Chain {
    fn walk<B: Bus>(&mut self, bus: &mut B) -> Result<Descriptor, CommandError> {
        if self.hops == MAX_CHAIN_HOPS {
            log::error!(
                "{} descriptor chain exceeds {} hops",
                self.pointer_of,
                MAX_CHAIN_HOPS
            );
            return Err(SeError::DescriptorChainTooLong.into());
        }
        let desc = if self.fetch {
            Descriptor::walk(bus, self.next, self.pointer_of)?
        } else {
            Descriptor::read(bus, self.next, self.pointer_of)?
        };
        self.hops += 1;
        self.next = desc.next;
        Ok(desc)
    }
}

/// Gathers command inputs from the input descriptor chain
pub struct InputChain {
    chain: Chain,
}

impl InputChain {
    pub fn new(head: u32) -> Self {
        Self {
            chain: Chain {
                next: head,
                hops: 0,
                pointer_of: "input",
                fetch: true,
            },
        }
    }

    /// Next descriptor, whatever its length.
    pub fn take_descriptor<B: Bus>(&mut self, bus: &mut B) -> Result<Descriptor, CommandError> {
        self.chain.walk(bus)
    }

    /// Skip one descriptor (authorization data).
    pub fn skip<B: Bus>(&mut self, bus: &mut B) -> Result<(), CommandError> {
        self.chain.walk(bus).map(|_| ())
    }

    /// A field held by exactly one descriptor of exactly `len` bytes.
    ///
    /// # Error
    ///
    /// * `ResponseCode::InvalidParameter` - Descriptor length differs from `len`
    pub fn take_fixed<B: Bus>(&mut self, bus: &mut B, len: usize) -> Result<Vec<u8>, CommandError> {
        let desc = self.chain.walk(bus)?;
        if desc.len() != len {
            log::warn!(
                "Input descriptor {:#010x} holds {} bytes, expected {}",
                desc.pointer,
                desc.len(),
                len
            );
            return Err(ResponseCode::InvalidParameter.into());
        }
        Ok(desc.contents)
    }

    /// Like `take_fixed` for a field of compile-time size.
    pub fn take_array<B: Bus, const N: usize>(
        &mut self,
        bus: &mut B,
    ) -> Result<[u8; N], CommandError> {
        let mut array = [0u8; N];
        array.copy_from_slice(&self.take_fixed(bus, N)?);
        Ok(array)
    }

    /// A field of `len` bytes gathered across as many descriptors as needed.
    /// Zero length fields consume no descriptor. The buffer only grows by
    /// what each hop delivers.
    pub fn take_variable<B: Bus>(
        &mut self,
        bus: &mut B,
        len: usize,
    ) -> Result<Vec<u8>, CommandError> {
        let mut data = Vec::new();
        while data.len() < len {
            let desc = self.chain.walk(bus)?;
            let take = desc.contents.len().min(len - data.len());
            data.extend_from_slice(&desc.contents[..take]);
        }
        Ok(data)
    }
}

/// Scatters command outputs across the output descriptor chain
pub struct OutputChain {
    chain: Chain,
}

impl OutputChain {
    pub fn new(head: u32) -> Self {
        Self {
            chain: Chain {
                next: head,
                hops: 0,
                pointer_of: "output",
                fetch: false,
            },
        }
    }

    /// Write `data` starting at the next descriptor, walking as many hops as
    /// needed. Each hop takes at most its length. Discard hops consume their
    /// share without writing it.
    pub fn put<B: Bus>(&mut self, bus: &mut B, data: &[u8]) -> Result<(), CommandError> {
        let mut offset = 0;
        while offset < data.len() {
            let desc = self.chain.walk(bus)?;
            let chunk = &data[offset..data.len().min(offset + desc.len())];
            Self::store(bus, &desc, chunk)?;
            offset += chunk.len();
        }
        Ok(())
    }

    /// Write `len` generated bytes. `fill` produces each hop's share into a
    /// buffer sized to that hop, so nothing larger than one hop is held.
    pub fn put_generated<B: Bus>(
        &mut self,
        bus: &mut B,
        len: usize,
        mut fill: impl FnMut(&mut [u8]),
    ) -> Result<(), CommandError> {
        let mut remaining = len;
        while remaining > 0 {
            let desc = self.chain.walk(bus)?;
            let mut chunk = Zeroizing::new(vec![0u8; remaining.min(desc.len())]);
            fill(&mut chunk);
            Self::store(bus, &desc, &chunk)?;
            remaining -= chunk.len();
        }
        Ok(())
    }

    fn store<B: Bus>(bus: &mut B, desc: &Descriptor, chunk: &[u8]) -> Result<(), CommandError> {
        if desc.is_discard() {
            log::debug!("Discarding {} output bytes", chunk.len());
        } else if desc.is_register() {
            for word in chunk.chunks(4) {
                let mut bytes = [0u8; 4];
                bytes[..word.len()].copy_from_slice(word);
                bus.write_word(desc.data, u32::from_le_bytes(bytes))?;
            }
        } else {
            bus.write_bytes(desc.data, chunk)?;
        }
        Ok(())
    }
}
