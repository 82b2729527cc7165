//! Tamper-evident team barcodes.
//!
//! Format: `{eventId}:{teamId}:{timestampMs}:{sig}` where `sig` is the first
//! 16 hex characters of `HMAC-SHA256("{eventId}:{teamId}:{timestampMs}",
//! secret)`. The codec is stateless and carries no expiry; callers add
//! context checks (event match, invalidation window) on top.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use bbqjudge_core::{EventId, TeamId};

type HmacSha256 = Hmac<Sha256>;

const SIG_HEX_LEN: usize = 16;
const LEGACY_PREFIX: &str = "AZTEC-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("Invalid barcode format")]
    InvalidFormat,

    #[error("Invalid signature")]
    InvalidSignature,
}

/// The parsed, unverified fields of a barcode payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedBarcode {
    pub event_id: EventId,
    pub team_id: TeamId,
    pub timestamp_ms: i64,
}

/// Outcome of [`verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub event_id: Option<EventId>,
    pub team_id: Option<TeamId>,
    pub timestamp_ms: Option<i64>,
    pub error: Option<String>,
}

fn sign(event_id: EventId, team_id: TeamId, timestamp_ms: i64, secret: &[u8]) -> String {
    let message = format!("{event_id}:{team_id}:{timestamp_ms}");
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    let digest = mac.finalize().into_bytes();
    hex::encode(digest)[..SIG_HEX_LEN].to_string()
}

/// Mint a new barcode payload stamped with the current wall-clock time.
pub fn generate(event_id: EventId, team_id: TeamId, secret: &[u8]) -> String {
    let timestamp_ms = Utc::now().timestamp_millis();
    let sig = sign(event_id, team_id, timestamp_ms, secret);
    format!("{event_id}:{team_id}:{timestamp_ms}:{sig}")
}

/// Parse a payload's structure without verifying its signature.
///
/// Succeeds only when there are exactly four non-empty `:`-separated parts
/// and the timestamp parses as an integer.
pub fn parse(payload: &str) -> Option<(ParsedBarcode, String)> {
    let parts: Vec<&str> = payload.split(':').collect();
    if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let event_id: EventId = parts[0].parse().ok()?;
    let team_id: TeamId = parts[1].parse().ok()?;
    let timestamp_ms: i64 = parts[2].parse().ok()?;
    let sig = parts[3].to_string();

    Some((
        ParsedBarcode {
            event_id,
            team_id,
            timestamp_ms,
        },
        sig,
    ))
}

/// Verify a payload's signature against `secret`.
///
/// Comparison of the recomputed signature against the carried one is
/// constant-time; only the *existence* of a mismatch is observable, not its
/// position.
pub fn verify(payload: &str, secret: &[u8]) -> VerifyOutcome {
    let Some((parsed, carried_sig)) = parse(payload) else {
        return VerifyOutcome {
            valid: false,
            event_id: None,
            team_id: None,
            timestamp_ms: None,
            error: Some(BarcodeError::InvalidFormat.to_string()),
        };
    };

    let expected_sig = sign(
        parsed.event_id,
        parsed.team_id,
        parsed.timestamp_ms,
        secret,
    );

    let matches: bool = expected_sig
        .as_bytes()
        .ct_eq(carried_sig.as_bytes())
        .into();

    if !matches {
        return VerifyOutcome {
            valid: false,
            event_id: None,
            team_id: None,
            timestamp_ms: None,
            error: Some(BarcodeError::InvalidSignature.to_string()),
        };
    }

    VerifyOutcome {
        valid: true,
        event_id: Some(parsed.event_id),
        team_id: Some(parsed.team_id),
        timestamp_ms: Some(parsed.timestamp_ms),
        error: None,
    }
}

/// Whether `payload` is a prefix-tagged legacy barcode (`AZTEC-…`).
///
/// The service may still accept these during migration but must not mint
/// new ones.
pub fn is_legacy(payload: &str) -> bool {
    payload.starts_with(LEGACY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn round_trip() {
        let event_id = EventId::new();
        let team_id = TeamId::new();
        let payload = generate(event_id, team_id, SECRET);

        let outcome = verify(&payload, SECRET);
        assert!(outcome.valid);
        assert_eq!(outcome.event_id, Some(event_id));
        assert_eq!(outcome.team_id, Some(team_id));
    }

    #[test]
    fn tamper_detection() {
        let event_id = EventId::new();
        let team_id = TeamId::new();
        let mut payload = generate(event_id, team_id, SECRET);

        // Flip the last character of the signature.
        let last = payload.pop().unwrap();
        let flipped = if last == '0' { '1' } else { '0' };
        payload.push(flipped);

        let outcome = verify(&payload, SECRET);
        assert!(!outcome.valid);
        assert_eq!(outcome.error.as_deref(), Some("Invalid signature"));
    }

    #[test]
    fn malformed_payload_is_format_error() {
        let outcome = verify("not-a-barcode", SECRET);
        assert!(!outcome.valid);
        assert_eq!(outcome.error.as_deref(), Some("Invalid barcode format"));
    }

    #[test]
    fn rejects_non_integer_timestamp() {
        let event_id = EventId::new();
        let team_id = TeamId::new();
        let payload = format!("{event_id}:{team_id}:not-a-number:abcd1234abcd1234");
        assert!(parse(&payload).is_none());
    }

    #[test]
    fn rejects_empty_segment() {
        let event_id = EventId::new();
        let payload = format!("{event_id}::12345:abcd1234abcd1234");
        assert!(parse(&payload).is_none());
    }

    #[test]
    fn legacy_prefix_detection() {
        assert!(is_legacy("AZTEC-deadbeef"));
        assert!(!is_legacy("not-legacy"));
    }

    #[test]
    fn different_secrets_disagree() {
        let event_id = EventId::new();
        let team_id = TeamId::new();
        let payload = generate(event_id, team_id, SECRET);
        let outcome = verify(&payload, b"other-secret");
        assert!(!outcome.valid);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_trip_holds_for_any_id_pair(seed_a in any::<u128>(), seed_b in any::<u128>()) {
            let event_id = EventId::from_uuid(uuid::Uuid::from_u128(seed_a));
            let team_id = TeamId::from_uuid(uuid::Uuid::from_u128(seed_b));
            let payload = generate(event_id, team_id, SECRET);

            let outcome = verify(&payload, SECRET);
            prop_assert!(outcome.valid);
            prop_assert_eq!(outcome.event_id, Some(event_id));
            prop_assert_eq!(outcome.team_id, Some(team_id));
        }

        #[test]
        fn single_char_mutation_invalidates(seed_a in any::<u128>(), seed_b in any::<u128>(), idx in 0usize..16) {
            let event_id = EventId::from_uuid(uuid::Uuid::from_u128(seed_a));
            let team_id = TeamId::from_uuid(uuid::Uuid::from_u128(seed_b));
            let payload = generate(event_id, team_id, SECRET);

            let sig_start = payload.len() - SIG_HEX_LEN;
            let mut bytes = payload.into_bytes();
            let pos = sig_start + idx;
            let original = bytes[pos];
            bytes[pos] = if original == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(bytes).unwrap();

            prop_assert!(!verify(&mutated, SECRET).valid);
        }
    }
}
