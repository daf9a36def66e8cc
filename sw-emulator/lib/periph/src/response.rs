/*++

Licensed under the Apache-2.0 license.

File Name:

    response.rs

Abstract:

    File contains the response codes and the response channel of the secure
    element.

--*/

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::collections::VecDeque;

#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ResponseCode {
    Ok = 0x0000_0000,
    InvalidCommand = 0x0001_0000,
    AuthorizationError = 0x0002_0000,
    InvalidSignature = 0x0003_0000,
    BusError = 0x0004_0000,
    InternalError = 0x0005_0000,
    CryptoError = 0x0006_0000,
    InvalidParameter = 0x0007_0000,
    SecureBootError = 0x0009_0000,
    SelfTestError = 0x000A_0000,
    NotInitialized = 0x000B_0000,
    MailboxInvalid = 0x00FE_0000,
    Abort = 0x00FF_0000,
}

/// Response FIFO read by the host
#[derive(Default)]
pub struct ResponseChannel {
    words: VecDeque<u32>,
}

impl ResponseChannel {
    /// Queue the result of one transaction. `handle` is echoed after the
    /// code when the protocol carries one.
    pub fn push(&mut self, code: ResponseCode, handle: Option<u32>) {
        self.words.push_back(code.into());
        if let Some(handle) = handle {
            self.words.push_back(handle);
        }
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.words.pop_front()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(u32::from(ResponseCode::InvalidParameter), 0x0007_0000);
        assert_eq!(
            ResponseCode::try_from(0x00FE_0000u32).ok(),
            Some(ResponseCode::MailboxInvalid)
        );
        assert!(ResponseCode::try_from(0x0008_0000u32).is_err());
    }

    #[test]
    fn test_handle_follows_code() {
        let mut channel = ResponseChannel::default();
        channel.push(ResponseCode::Ok, None);
        channel.push(ResponseCode::Abort, Some(0x77));
        assert_eq!(channel.len(), 3);
        assert_eq!(channel.pop(), Some(0));
        assert_eq!(channel.pop(), Some(0x00FF_0000));
        assert_eq!(channel.pop(), Some(0x77));
        assert!(channel.is_empty());
    }
}
