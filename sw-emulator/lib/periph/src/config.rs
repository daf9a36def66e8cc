/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the construction parameters of the secure element.

--*/

/// Mailbox wire protocol revision
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum MailboxProtocol {
    /// Header, command word, descriptors and parameters
    #[default]
    Series2,

    /// Series 2 plus a transaction handle after the header that is echoed
    /// after the response code. A header only transaction echoes handle 0.
    /// Flash commands require a configured flash geometry.
    Series3,
}

impl MailboxProtocol {
    /// Number of words preceding the parameters in a transaction
    pub const fn prefix_words(self) -> usize {
        match self {
            MailboxProtocol::Series2 => 4,
            MailboxProtocol::Series3 => 5,
        }
    }
}

/// Secure element construction parameters
#[derive(Debug, Clone)]
pub struct SecureElementConfig {
    pub protocol: MailboxProtocol,

    /// First bus address of the flash window
    pub flash_base: u32,

    /// Flash window size in bytes, zero if not configured
    pub flash_size: u32,

    /// Flash page size in bytes, zero if not configured
    pub flash_page_size: u32,

    /// Reported by `GetStatus`
    pub firmware_version: u32,

    /// Reported by `ReadSerial`
    pub serial_number: [u8; 16],

    /// Seed for the internal PRNG. `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SecureElementConfig {
    fn default() -> Self {
        Self {
            protocol: MailboxProtocol::Series2,
            flash_base: 0,
            flash_size: 0,
            flash_page_size: 0,
            firmware_version: 0x0001_0000,
            serial_number: [0u8; 16],
            rng_seed: None,
        }
    }
}
