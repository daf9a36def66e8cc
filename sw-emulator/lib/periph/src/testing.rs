/*++

Licensed under the Apache-2.0 license.

File Name:

    testing.rs

Abstract:

    File contains a host side driver that lays out descriptor chains in host
    memory and runs commands through the mailbox FIFOs.

--*/

use crate::descriptor::{encode_control, TransferFlags, NULL_DESCRIPTOR};
use crate::{
    Command, CommandId, InMemoryKeyStorage, MailboxProtocol, ResponseCode, SecureElement,
    SecureElementConfig, SeError,
};
use se_emu_bus::testing::RecordingBus;

/// Base address of the host memory the driver allocates from
pub const HOST_RAM_BASE: u32 = 0x2000_0000;

/// Size of the host memory
pub const HOST_RAM_SIZE: usize = 0x10_0000;

/// Drives a secure element the way host firmware does.
///
/// Memory set up by the driver is written directly into RAM, so the bus log
/// only records accesses made by the secure element.
pub struct HostDriver {
    se: SecureElement<RecordingBus>,
    next_free: u32,
    next_handle: u32,
}

impl HostDriver {
    pub fn new(config: SecureElementConfig) -> Self {
        Self {
            se: SecureElement::new(
                config,
                RecordingBus::new(HOST_RAM_BASE, HOST_RAM_SIZE),
                InMemoryKeyStorage::new(),
            ),
            next_free: HOST_RAM_BASE,
            next_handle: 1,
        }
    }

    pub fn se(&self) -> &SecureElement<RecordingBus> {
        &self.se
    }

    pub fn se_mut(&mut self) -> &mut SecureElement<RecordingBus> {
        &mut self.se
    }

    /// Reserve `len` bytes of word aligned host memory.
    pub fn alloc(&mut self, len: usize) -> u32 {
        let addr = self.next_free;
        self.next_free += (len as u32 + 3) & !3;
        addr
    }

    /// Copy `data` into freshly allocated host memory.
    pub fn write(&mut self, data: &[u8]) -> u32 {
        let addr = self.alloc(data.len());
        self.write_at(addr, data);
        addr
    }

    pub fn write_at(&mut self, addr: u32, data: &[u8]) {
        let offset = (addr - HOST_RAM_BASE) as usize;
        self.se.bus_mut().ram.data_mut()[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn read(&self, addr: u32, len: usize) -> Vec<u8> {
        let offset = (addr - HOST_RAM_BASE) as usize;
        self.se.bus().ram.data()[offset..offset + len].to_vec()
    }

    /// Write one descriptor and return its address.
    pub fn descriptor(&mut self, data: u32, len: usize, flags: TransferFlags, next: u32) -> u32 {
        let mut raw = Vec::with_capacity(12);
        raw.extend_from_slice(&data.to_le_bytes());
        raw.extend_from_slice(&next.to_le_bytes());
        raw.extend_from_slice(&encode_control(len, flags).to_le_bytes());
        self.write(&raw)
    }

    /// Input chain with one descriptor per field.
    pub fn input_chain(&mut self, fields: &[&[u8]]) -> u32 {
        let data: Vec<u32> = fields.iter().map(|field| self.write(field)).collect();
        fields
            .iter()
            .zip(data)
            .rev()
            .fold(NULL_DESCRIPTOR, |next, (field, addr)| {
                self.descriptor(addr, field.len(), TransferFlags::NONE, next)
            })
    }

    /// Output chain with one zeroed buffer per length. Returns the chain head
    /// and the buffer addresses.
    pub fn output_chain(&mut self, lens: &[usize]) -> (u32, Vec<u32>) {
        let buffers: Vec<u32> = lens.iter().map(|len| self.alloc(*len)).collect();
        let head = lens
            .iter()
            .zip(&buffers)
            .rev()
            .fold(NULL_DESCRIPTOR, |next, (len, addr)| {
                self.descriptor(*addr, *len, TransferFlags::NONE, next)
            });
        (head, buffers)
    }

    /// Run one command and return its response code.
    pub fn call(
        &mut self,
        id: CommandId,
        options: u16,
        input: u32,
        output: u32,
        params: &[u32],
    ) -> Result<ResponseCode, SeError> {
        let protocol = self.se.config().protocol;
        let header = 4 * (protocol.prefix_words() + params.len()) as u32;
        let mut words = Vec::new();
        let handle = self.next_handle;
        if protocol == MailboxProtocol::Series3 {
            self.next_handle += 1;
            words.push(handle);
        }
        words.push(Command::command_word(id, options));
        words.push(input);
        words.push(output);
        words.extend_from_slice(params);

        self.se.set_header(header)?;
        for word in words {
            self.se.enqueue(word)?;
        }

        let code = self
            .se
            .pop_response()
            .and_then(|word| ResponseCode::try_from(word).ok())
            .unwrap_or(ResponseCode::InternalError);
        if protocol == MailboxProtocol::Series3 && self.se.pop_response() != Some(handle) {
            return Ok(ResponseCode::InternalError);
        }
        Ok(code)
    }

    /// Run a command whose inputs are one descriptor per field and whose
    /// outputs are one buffer per length. Returns the response code and the
    /// output buffers.
    pub fn run(
        &mut self,
        id: CommandId,
        options: u16,
        inputs: &[&[u8]],
        outputs: &[usize],
        params: &[u32],
    ) -> Result<(ResponseCode, Vec<Vec<u8>>), SeError> {
        let input = self.input_chain(inputs);
        let (output, buffers) = self.output_chain(outputs);
        let code = self.call(id, options, input, output, params)?;
        let data = buffers
            .iter()
            .zip(outputs)
            .map(|(addr, len)| self.read(*addr, *len))
            .collect();
        Ok((code, data))
    }
}
