/*++

Licensed under the Apache-2.0 license.

File Name:

    secure_element.rs

Abstract:

    File contains the secure element: mailbox FIFO entry points, command
    execution and the response channel.

--*/

use crate::fifo::TransactionFramer;
use crate::handlers::{self, Context};
use crate::{
    Command, CommandError, InMemoryKeyStorage, KeyStorage, MailboxProtocol, ResponseChannel,
    ResponseCode, SecureElementConfig, SecureElementState, SeError,
};
use se_emu_bus::Bus;

/// Secure element command processor
pub struct SecureElement<B: Bus, K: KeyStorage = InMemoryKeyStorage> {
    bus: B,
    key_storage: K,
    config: SecureElementConfig,
    state: SecureElementState,
    framer: TransactionFramer,
    responses: ResponseChannel,
}

impl<B: Bus, K: KeyStorage> SecureElement<B, K> {
    /// Create a secure element reaching host memory through `bus`.
    pub fn new(config: SecureElementConfig, bus: B, key_storage: K) -> Self {
        Self {
            bus,
            key_storage,
            state: SecureElementState::new(config.rng_seed),
            config,
            framer: TransactionFramer::new(),
            responses: ResponseChannel::default(),
        }
    }

    /// Announce a transaction of `header` bytes. The header word is the
    /// first word of the transaction.
    ///
    /// # Returns
    ///
    /// * `true` - The transaction completed and was processed
    pub fn set_header(&mut self, header: u32) -> Result<bool, SeError> {
        let complete = self.framer.set_header(header)?;
        if complete {
            self.process_command()?;
        }
        Ok(complete)
    }

    /// Push one transaction word, processing the command once the last
    /// word arrives.
    ///
    /// # Returns
    ///
    /// * `true` - The transaction completed and was processed
    pub fn enqueue(&mut self, word: u32) -> Result<bool, SeError> {
        let complete = self.framer.enqueue(word)?;
        if complete {
            self.process_command()?;
        }
        Ok(complete)
    }

    /// Decode and execute the completed transaction, then queue its response.
    ///
    /// # Error
    ///
    /// * `SeError::TransactionIncomplete` - Words still outstanding
    /// * `SeError::NoTransaction` - Nothing was announced
    /// * Descriptor contract violations; no response is queued for them
    pub fn process_command(&mut self) -> Result<ResponseCode, SeError> {
        let words = self.framer.take()?;
        let handle = match self.config.protocol {
            MailboxProtocol::Series2 => None,
            MailboxProtocol::Series3 => Some(words.get(1).copied().unwrap_or(0)),
        };
        let code = match Command::decode(&words, self.config.protocol) {
            Ok(command) => self.execute(&command)?,
            Err(code) => {
                log::warn!("Malformed transaction of {} words", words.len());
                code
            }
        };
        self.responses.push(code, handle);
        Ok(code)
    }

    fn execute(&mut self, command: &Command) -> Result<ResponseCode, SeError> {
        log::debug!(
            "Command {:#06x} options {:#06x} with {} parameters",
            command.id,
            command.options,
            command.params.len()
        );
        let Some(id) = command.command_id() else {
            log::warn!("Unknown command {:#06x}", command.id);
            return Ok(ResponseCode::InvalidCommand);
        };
        let mut ctx = Context::new(
            &mut self.bus,
            &mut self.state,
            &mut self.key_storage,
            &self.config,
            command,
        );
        match handlers::handler::<B>(id)(&mut ctx) {
            Ok(()) => Ok(ResponseCode::Ok),
            Err(CommandError::Response(code)) => {
                log::debug!("Command {:?} failed with {:?}", id, code);
                Ok(code)
            }
            Err(CommandError::Fault(err)) => Err(err),
        }
    }

    /// Next word of the response channel.
    pub fn pop_response(&mut self) -> Option<u32> {
        self.responses.pop()
    }

    /// Drop any partial transaction and pending responses and reset the
    /// process state.
    pub fn reset(&mut self) {
        self.framer.reset();
        self.responses.clear();
        self.state.reset();
    }

    pub fn config(&self) -> &SecureElementConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn key_storage(&self) -> &K {
        &self.key_storage
    }

    pub fn key_storage_mut(&mut self) -> &mut K {
        &mut self.key_storage
    }

    pub fn state(&self) -> &SecureElementState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandId;
    use se_emu_bus::testing::RecordingBus;

    fn secure_element(protocol: MailboxProtocol) -> SecureElement<RecordingBus> {
        let config = SecureElementConfig {
            protocol,
            rng_seed: Some(7),
            ..Default::default()
        };
        SecureElement::new(config, RecordingBus::new(0x1000, 0x100), InMemoryKeyStorage::new())
    }

    #[test]
    fn test_unknown_command() {
        let mut se = secure_element(MailboxProtocol::Series2);
        assert_eq!(se.set_header(16), Ok(false));
        assert_eq!(se.enqueue(Command::command_word(0x1234u16, 0)), Ok(false));
        assert_eq!(se.enqueue(1), Ok(false));
        assert_eq!(se.enqueue(1), Ok(true));
        assert_eq!(se.pop_response(), Some(ResponseCode::InvalidCommand.into()));
        assert_eq!(se.pop_response(), None);
    }

    #[test]
    fn test_series3_echoes_handle() {
        let mut se = secure_element(MailboxProtocol::Series3);
        se.set_header(20).unwrap();
        se.enqueue(0xCAFE).unwrap();
        se.enqueue(Command::command_word(CommandId::GetStatus, 0)).unwrap();
        se.enqueue(1).unwrap();
        // Output chain is empty but GetStatus produces data
        assert!(se.enqueue(1).is_err());
        assert_eq!(se.pop_response(), None);

        se.set_header(20).unwrap();
        se.enqueue(0xBEEF).unwrap();
        se.enqueue(Command::command_word(CommandId::HashFinish, 0x0400)).unwrap();
        se.enqueue(1).unwrap();
        assert_eq!(se.enqueue(1), Ok(true));
        assert_eq!(se.pop_response(), Some(ResponseCode::Abort.into()));
        assert_eq!(se.pop_response(), Some(0xBEEF));
    }

    #[test]
    fn test_parameter_count_checked_before_bus() {
        let mut se = secure_element(MailboxProtocol::Series2);
        se.set_header(24).unwrap();
        se.enqueue(Command::command_word(CommandId::Hash, 0x0400)).unwrap();
        se.enqueue(0x1000).unwrap();
        se.enqueue(0x1000).unwrap();
        se.enqueue(4).unwrap();
        assert_eq!(se.enqueue(5), Ok(true));
        assert_eq!(se.pop_response(), Some(ResponseCode::Abort.into()));
        assert!(se.bus().log.is_empty());
    }

    #[test]
    fn test_short_transaction_is_mailbox_invalid() {
        let mut se = secure_element(MailboxProtocol::Series2);
        se.set_header(8).unwrap();
        assert_eq!(se.enqueue(0), Ok(true));
        assert_eq!(se.pop_response(), Some(ResponseCode::MailboxInvalid.into()));
    }

    #[test]
    fn test_series3_header_only_echoes_zero_handle() {
        let mut se = secure_element(MailboxProtocol::Series3);
        assert_eq!(se.set_header(4), Ok(true));
        assert_eq!(se.pop_response(), Some(ResponseCode::MailboxInvalid.into()));
        assert_eq!(se.pop_response(), Some(0));
        assert_eq!(se.pop_response(), None);
    }

    #[test]
    fn test_process_without_transaction() {
        let mut se = secure_element(MailboxProtocol::Series2);
        assert_eq!(se.process_command(), Err(SeError::NoTransaction));
        se.set_header(16).unwrap();
        assert_eq!(
            se.process_command(),
            Err(SeError::TransactionIncomplete { words_left: 3 })
        );
    }
}
