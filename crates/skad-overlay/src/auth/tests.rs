//! Tests for weak and strong message signatures.

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::adapters::identity::Ed25519Signer;
use crate::domain::PeerId;
use crate::ports::{Signer, TimeSource};

const NOW: i64 = 1_700_000_000_000_000_000;
const SECOND: i64 = 1_000_000_000;

struct Clock(i64);

impl TimeSource for Clock {
    fn now_nanos(&self) -> i64 {
        self.0
    }
}

fn authenticator(seed: u8) -> MessageAuthenticator {
    let signer: Arc<dyn Signer> = Arc::new(Ed25519Signer::from_seed([seed; 32]));
    let peer = PeerId::new(signer.public_key(), format!("127.0.0.1:{}", 3000 + seed as u16));
    MessageAuthenticator::new(peer, signer, Arc::new(Clock(NOW)))
}

// =============================================================================
// Test Group 1: Weak Signatures
// =============================================================================

#[test]
fn test_weak_signature_check_order() {
    let auth = authenticator(1);
    let expired = NOW - SECOND;
    let mut msg = SignedMessage::default().with_expiration(expired);

    // No signature
    assert_eq!(auth.verify_weak_signature(&msg), Err(SignatureError::NoSender));

    // Signature but no sender
    msg.signature = auth.weak_signature(expired);
    assert_eq!(auth.verify_weak_signature(&msg), Err(SignatureError::NoSender));

    // Valid signature, expired
    msg.sender = Some(auth.self_peer().clone());
    assert_eq!(auth.verify_weak_signature(&msg), Err(SignatureError::Expired));

    // Fresh expiration, signature no longer matches
    msg.expiration = NOW + SECOND;
    assert_eq!(auth.verify_weak_signature(&msg), Err(SignatureError::Invalid));

    // Re-signed with the fresh expiration
    msg.signature = auth.weak_signature(msg.expiration);
    assert_eq!(auth.verify_weak_signature(&msg), Ok(()));
}

#[test]
fn test_weak_signature_expiry_is_checked_before_validity() {
    let auth = authenticator(1);
    let msg = SignedMessage {
        sender: Some(auth.self_peer().clone()),
        signature: b"invalid-signature".to_vec(),
        expiration: NOW - SECOND,
        body: Vec::new(),
    };

    assert_eq!(auth.verify_weak_signature(&msg), Err(SignatureError::Expired));
}

#[test]
fn test_weak_signature_tampered() {
    let auth = authenticator(1);
    let mut msg = auth.weak_message(b"hello".to_vec(), Duration::from_secs(5));
    assert_eq!(auth.verify_weak_signature(&msg), Ok(()));

    msg.signature[0] ^= 0xFF;
    assert_eq!(auth.verify_weak_signature(&msg), Err(SignatureError::Invalid));
}

#[test]
fn test_weak_signature_expiring_exactly_now_is_accepted() {
    let auth = authenticator(1);
    let msg = auth.weak_message(Vec::new(), Duration::ZERO);

    assert_eq!(msg.expiration, NOW);
    assert_eq!(auth.verify_weak_signature(&msg), Ok(()));
}

#[test]
fn test_weak_signature_from_other_peer_verifies() {
    let alice = authenticator(1);
    let bob = authenticator(2);
    let msg = alice.weak_message(Vec::new(), Duration::from_secs(5));

    assert_eq!(bob.verify_weak_signature(&msg), Ok(()));
}

#[test]
fn test_weak_signature_with_forged_sender_is_invalid() {
    let alice = authenticator(1);
    let bob = authenticator(2);
    let mut msg = alice.weak_message(Vec::new(), Duration::from_secs(5));
    msg.sender = Some(bob.self_peer().clone());

    assert_eq!(bob.verify_weak_signature(&msg), Err(SignatureError::Invalid));
}

// =============================================================================
// Test Group 2: Strong Signatures
// =============================================================================

#[test]
fn test_strong_signature_sequence() {
    let auth = authenticator(1);
    let mut msg = SignedMessage {
        body: b"payload".to_vec(),
        ..SignedMessage::default()
    };

    // No signature, no sender
    assert_eq!(auth.verify_strong_signature(&msg), Err(SignatureError::NoSender));

    // Refuses to sign over an existing signature
    msg.signature = b"invalid-signature".to_vec();
    assert_eq!(auth.strong_signature(&msg), Err(SignatureError::AlreadySigned));

    // Signature without sender
    assert_eq!(auth.verify_strong_signature(&msg), Err(SignatureError::NoSender));

    // Sender present, signature garbage
    msg.sender = Some(auth.self_peer().clone());
    assert_eq!(auth.verify_strong_signature(&msg), Err(SignatureError::Invalid));

    // Cleared and properly signed
    msg.signature.clear();
    msg.signature = auth.strong_signature(&msg).unwrap();
    assert_eq!(auth.verify_strong_signature(&msg), Ok(()));
}

#[test]
fn test_strong_signature_without_sender() {
    let auth = authenticator(1);
    let msg = SignedMessage::default();

    assert_eq!(auth.strong_signature(&msg), Err(SignatureError::NoSender));
}

#[test]
fn test_strong_signature_binds_body() {
    let auth = authenticator(1);
    let mut msg = SignedMessage::new(auth.self_peer().clone(), b"original".to_vec());
    msg.signature = auth.strong_signature(&msg).unwrap();

    msg.body = b"modified".to_vec();
    assert_eq!(auth.verify_strong_signature(&msg), Err(SignatureError::Invalid));
}

#[test]
fn test_strong_signature_ignores_expiration_time() {
    let auth = authenticator(1);
    let mut msg = SignedMessage::new(auth.self_peer().clone(), b"body".to_vec())
        .with_expiration(NOW - 100 * SECOND);
    msg.signature = auth.strong_signature(&msg).unwrap();

    assert_eq!(auth.verify_strong_signature(&msg), Ok(()));
}

#[test]
fn test_weak_and_strong_payloads_differ() {
    let auth = authenticator(1);
    let sender = auth.self_peer();

    assert_ne!(weak_payload(sender, 7), strong_payload(sender, 7, b""));
}

#[test]
fn test_strong_payload_separates_sender_and_body() {
    let sender = PeerId::new(vec![1, 2], "a:1");
    let payload = strong_payload(&sender, 0, b"xy");

    let body_prefix = payload.len() - 2 - 8;
    assert_eq!(&payload[body_prefix..body_prefix + 8], &2u64.to_le_bytes());
    assert_eq!(&payload[payload.len() - 2..], b"xy");
}
