/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Secure Element Emulator Peripheral library.

--*/

mod command;
mod config;
pub mod descriptor;
mod error;
mod fifo;
mod handlers;
pub mod key;
mod key_storage;
mod response;
mod secure_element;
mod state;
pub mod testing;

pub use command::{AesMode, Command, CommandId, ContextMode, HashOption, MAX_PARAMS};
pub use config::{MailboxProtocol, SecureElementConfig};
pub use error::{CommandError, SeError};
pub use fifo::{FramerState, TransactionFramer};
pub use key::{KeyMetadata, KeyMode, KeyRestriction, KeyType};
pub use key_storage::{InMemoryKeyStorage, KeyStorage};
pub use response::{ResponseChannel, ResponseCode};
pub use secure_element::SecureElement;
pub use state::{EccKeyPair, SecureElementState, NVM3_KEY, NVM3_KEY_INDEX};
