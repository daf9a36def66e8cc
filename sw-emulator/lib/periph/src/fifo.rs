/*++

Licensed under the Apache-2.0 license.

File Name:

    fifo.rs

Abstract:

    File contains the command FIFO that accumulates host words into one
    pending transaction.

--*/

use crate::SeError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FramerState {
    /// No transaction announced
    Idle,

    /// Header seen, waiting for more words
    Receiving { words_left: usize },

    /// All announced words received, waiting to be processed
    Complete,
}

/// Single-slot transaction accumulator.
///
/// The header word announces the byte length of the whole transaction,
/// header included, and is itself the first word of the transaction.
pub struct TransactionFramer {
    state: FramerState,
    words: Vec<u32>,
}

impl Default for TransactionFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionFramer {
    pub fn new() -> Self {
        Self {
            state: FramerState::Idle,
            words: Vec::new(),
        }
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Start a new transaction, discarding a partially received one.
    ///
    /// Returns true if the header alone completes the transaction.
    ///
    /// # Error
    ///
    /// * `SeError::EmptyHeader` - `header` announces less than one word
    pub fn set_header(&mut self, header: u32) -> Result<bool, SeError> {
        if let FramerState::Receiving { words_left } = self.state {
            log::warn!(
                "Dropping partial transaction with {} words outstanding",
                words_left
            );
        }
        self.words.clear();

        let total = header as usize / 4;
        if total == 0 {
            self.state = FramerState::Idle;
            return Err(SeError::EmptyHeader);
        }
        self.words.push(header);
        self.state = match total - 1 {
            0 => FramerState::Complete,
            words_left => FramerState::Receiving { words_left },
        };
        Ok(self.state == FramerState::Complete)
    }

    /// Append one word. Returns true when it completes the transaction.
    ///
    /// # Error
    ///
    /// * `SeError::UnexpectedWord` - No transaction is being received
    pub fn enqueue(&mut self, word: u32) -> Result<bool, SeError> {
        match self.state {
            FramerState::Receiving { words_left } => {
                self.words.push(word);
                self.state = match words_left - 1 {
                    0 => FramerState::Complete,
                    words_left => FramerState::Receiving { words_left },
                };
                Ok(self.state == FramerState::Complete)
            }
            _ => {
                log::warn!("Dropping word {:#010x} enqueued outside of a transaction", word);
                Err(SeError::UnexpectedWord)
            }
        }
    }

    /// Hand out the complete transaction and return to idle.
    ///
    /// # Error
    ///
    /// * `SeError::TransactionIncomplete` - Words are still outstanding
    /// * `SeError::NoTransaction` - Nothing was announced
    pub fn take(&mut self) -> Result<Vec<u32>, SeError> {
        match self.state {
            FramerState::Complete => {
                self.state = FramerState::Idle;
                Ok(std::mem::take(&mut self.words))
            }
            FramerState::Receiving { words_left } => {
                Err(SeError::TransactionIncomplete { words_left })
            }
            FramerState::Idle => Err(SeError::NoTransaction),
        }
    }

    pub fn reset(&mut self) {
        self.state = FramerState::Idle;
        self.words.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_counts_itself() {
        let mut framer = TransactionFramer::new();
        assert_eq!(framer.set_header(16), Ok(false));
        assert_eq!(framer.state(), FramerState::Receiving { words_left: 3 });
        assert_eq!(framer.enqueue(1), Ok(false));
        assert_eq!(framer.enqueue(2), Ok(false));
        assert_eq!(
            framer.take(),
            Err(SeError::TransactionIncomplete { words_left: 1 })
        );
        assert_eq!(framer.enqueue(3), Ok(true));
        assert_eq!(framer.take(), Ok(vec![16, 1, 2, 3]));
        assert_eq!(framer.state(), FramerState::Idle);
        assert_eq!(framer.take(), Err(SeError::NoTransaction));
    }

    #[test]
    fn test_word_outside_transaction() {
        let mut framer = TransactionFramer::new();
        assert_eq!(framer.enqueue(5), Err(SeError::UnexpectedWord));
        framer.set_header(8).unwrap();
        assert_eq!(framer.enqueue(5), Ok(true));
        assert_eq!(framer.enqueue(6), Err(SeError::UnexpectedWord));
    }

    #[test]
    fn test_header_only_and_empty() {
        let mut framer = TransactionFramer::new();
        assert_eq!(framer.set_header(4), Ok(true));
        assert_eq!(framer.take(), Ok(vec![4]));
        assert_eq!(framer.set_header(3), Err(SeError::EmptyHeader));
        assert_eq!(framer.state(), FramerState::Idle);
    }

    #[test]
    fn test_new_header_discards_partial() {
        let mut framer = TransactionFramer::new();
        framer.set_header(20).unwrap();
        framer.enqueue(0xdead).unwrap();
        assert_eq!(framer.set_header(8), Ok(false));
        assert_eq!(framer.enqueue(0xbeef), Ok(true));
        assert_eq!(framer.take(), Ok(vec![8, 0xbeef]));
    }
}
