//! Per-direction AEAD nonce counters.

use skad_crypto::AEAD_NONCE_LENGTH;

use super::errors::ChannelError;

/// Monotonic message counter for one direction of a session.
///
/// Nonce layout: the counter as 8 little-endian bytes followed by 4 zero
/// bytes. Each value is handed out once; after `u64::MAX` has been used the
/// counter refuses instead of wrapping.
#[derive(Debug, Default)]
pub struct NonceCounter {
    next: u64,
    exhausted: bool,
}

impl NonceCounter {
    /// Counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn starting_at(next: u64) -> Self {
        Self {
            next,
            exhausted: false,
        }
    }

    /// Messages sealed or opened so far in this direction.
    ///
    /// Saturates at `u64::MAX` once exhausted.
    pub fn used(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            self.next
        }
    }

    /// Take the next nonce.
    pub fn next_nonce(&mut self) -> Result<[u8; AEAD_NONCE_LENGTH], ChannelError> {
        if self.exhausted {
            return Err(ChannelError::NonceExhausted);
        }
        let nonce = encode_nonce(self.next);
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        Ok(nonce)
    }
}

/// `counter (u64 LE) ‖ [0; 4]`
pub fn encode_nonce(counter: u64) -> [u8; AEAD_NONCE_LENGTH] {
    let mut nonce = [0u8; AEAD_NONCE_LENGTH];
    nonce[..8].copy_from_slice(&counter.to_le_bytes());
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_layout() {
        assert_eq!(encode_nonce(0), [0u8; 12]);
        assert_eq!(
            encode_nonce(0x0102),
            [0x02, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_nonces_strictly_increase() {
        let mut counter = NonceCounter::new();
        let mut previous = None;
        for expected in 0..100u64 {
            let nonce = counter.next_nonce().unwrap();
            let value = u64::from_le_bytes(nonce[..8].try_into().unwrap());
            assert_eq!(value, expected);
            if let Some(previous) = previous {
                assert!(value > previous);
            }
            previous = Some(value);
        }
        assert_eq!(counter.used(), 100);
    }

    #[test]
    fn test_counter_never_wraps() {
        let mut counter = NonceCounter::starting_at(u64::MAX - 1);

        assert_eq!(counter.next_nonce().unwrap(), encode_nonce(u64::MAX - 1));
        assert_eq!(counter.next_nonce().unwrap(), encode_nonce(u64::MAX));
        assert_eq!(counter.next_nonce(), Err(ChannelError::NonceExhausted));
        assert_eq!(counter.next_nonce(), Err(ChannelError::NonceExhausted));
        assert_eq!(counter.used(), u64::MAX);
    }
}
