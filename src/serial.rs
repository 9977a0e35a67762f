//! Binary serialization and deserialization of compiled rule sets.
//!
//! This module provides a stable binary format for caching compiled
//! [`CompiledRuleSet`](crate::CompiledRuleSet) values so a process can skip
//! parsing on startup. The format consists of a 32-byte fixed header followed
//! by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"CIRC"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compile::{check_lines, rank};
use crate::{CompiledRuleSet, Condition, Facet, PolicyKind, PolicyMap, RuleLine};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"CIRC";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`CompiledRuleSet`] to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode rule set: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`CompiledRuleSet`] from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a circulation rule cache: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRuleSet {
    metadata: RuleSetMetadata,
    defaults: Vec<(SerializedKind, String)>,
    lines: Vec<SerializedLine>,
    ranked: Vec<Vec<usize>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleSetMetadata {
    line_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedLine {
    line: u32,
    /// One entry per facet, in `Facet::ALL` order.
    conditions: Vec<SerializedCondition>,
    policies: Vec<(SerializedKind, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum SerializedCondition {
    Any,
    In(Vec<String>),
    NotIn(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum SerializedKind {
    Loan,
    Request,
    Notice,
}

// ---------------------------------------------------------------------------
// Kind and condition conversion
// ---------------------------------------------------------------------------

fn serialize_kind(kind: PolicyKind) -> SerializedKind {
    match kind {
        PolicyKind::Loan => SerializedKind::Loan,
        PolicyKind::Request => SerializedKind::Request,
        PolicyKind::Notice => SerializedKind::Notice,
    }
}

fn deserialize_kind(kind: SerializedKind) -> PolicyKind {
    match kind {
        SerializedKind::Loan => PolicyKind::Loan,
        SerializedKind::Request => PolicyKind::Request,
        SerializedKind::Notice => PolicyKind::Notice,
    }
}

fn serialize_condition(condition: &Condition) -> SerializedCondition {
    match condition {
        Condition::Any => SerializedCondition::Any,
        Condition::In(ids) => SerializedCondition::In(ids.iter().cloned().collect()),
        Condition::NotIn(ids) => SerializedCondition::NotIn(ids.iter().cloned().collect()),
    }
}

fn deserialize_condition(condition: SerializedCondition) -> Condition {
    match condition {
        SerializedCondition::Any => Condition::Any,
        SerializedCondition::In(ids) => Condition::is_in(ids),
        SerializedCondition::NotIn(ids) => Condition::not_in(ids),
    }
}

fn serialize_policies(map: &PolicyMap) -> Vec<(SerializedKind, String)> {
    map.iter()
        .map(|(kind, id)| (serialize_kind(kind), id.to_owned()))
        .collect()
}

fn deserialize_policies(
    pairs: Vec<(SerializedKind, String)>,
    line: u32,
) -> Result<PolicyMap, DeserializeError> {
    let mut map = PolicyMap::new();
    for (kind, id) in pairs {
        let kind = deserialize_kind(kind);
        if map.insert(kind, id).is_some() {
            return Err(DeserializeError::Validation(format!(
                "line {line} assigns {kind} policy twice"
            )));
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// CompiledRuleSet -> SerializedRuleSet
// ---------------------------------------------------------------------------

fn ruleset_to_serialized(
    ruleset: &CompiledRuleSet,
    source_text: Option<&str>,
) -> SerializedRuleSet {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let lines: Vec<SerializedLine> = ruleset
        .lines
        .iter()
        .map(|l| SerializedLine {
            line: l.line,
            conditions: l.conditions.iter().map(serialize_condition).collect(),
            policies: serialize_policies(&l.policies),
        })
        .collect();

    SerializedRuleSet {
        metadata: RuleSetMetadata {
            line_count: ruleset.lines.len(),
            source_digest,
        },
        defaults: serialize_policies(&ruleset.defaults),
        lines,
        ranked: ruleset.ranked.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// SerializedRuleSet -> CompiledRuleSet
// ---------------------------------------------------------------------------

fn serialized_to_ruleset(ser: SerializedRuleSet) -> Result<CompiledRuleSet, DeserializeError> {
    if ser.metadata.line_count != ser.lines.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} lines but payload has {}",
            ser.metadata.line_count,
            ser.lines.len()
        )));
    }

    let defaults = deserialize_policies(ser.defaults, 0)?;

    let mut lines: Vec<RuleLine> = Vec::with_capacity(ser.lines.len());
    for sl in ser.lines {
        if sl.line == 0 {
            return Err(DeserializeError::Validation(
                "line number 0 is reserved for the fallback".to_owned(),
            ));
        }
        if let Some(prev) = lines.last() {
            if prev.line >= sl.line {
                return Err(DeserializeError::Validation(format!(
                    "line {} follows line {}: line numbers must strictly increase",
                    sl.line, prev.line
                )));
            }
        }

        let found = sl.conditions.len();
        let conditions: Vec<Condition> = sl
            .conditions
            .into_iter()
            .map(deserialize_condition)
            .collect();
        let conditions: [Condition; Facet::COUNT] = conditions.try_into().map_err(|_| {
            DeserializeError::Validation(format!(
                "line {} carries {found} conditions, expected {}",
                sl.line,
                Facet::COUNT
            ))
        })?;
        let policies = deserialize_policies(sl.policies, sl.line)?;
        lines.push(RuleLine::new(sl.line, conditions, policies));
    }

    check_lines(&lines, &defaults)
        .map_err(|e| DeserializeError::Validation(e.to_string()))?;

    let ranked = validate_ranked(ser.ranked, &lines)?;

    Ok(CompiledRuleSet {
        lines,
        defaults,
        ranked,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// The stored per-kind orderings must cover exactly the lines assigning each
/// kind, in the order the compiler would have produced.
fn validate_ranked(
    ranked: Vec<Vec<usize>>,
    lines: &[RuleLine],
) -> Result<[Vec<usize>; PolicyKind::COUNT], DeserializeError> {
    let found = ranked.len();
    let ranked: [Vec<usize>; PolicyKind::COUNT] = ranked.try_into().map_err(|_| {
        DeserializeError::Validation(format!(
            "payload has {found} kind rankings, expected {}",
            PolicyKind::COUNT
        ))
    })?;

    for kind in PolicyKind::ALL {
        let stored = &ranked[kind.slot()];
        if let Some(&idx) = stored.iter().find(|&&idx| idx >= lines.len()) {
            return Err(DeserializeError::Validation(format!(
                "{kind} ranking references index {idx} but only {} lines exist",
                lines.len()
            )));
        }
        if *stored != rank(lines, kind) {
            return Err(DeserializeError::Validation(format!(
                "{kind} ranking is not sorted by specificity and line number"
            )));
        }
    }
    Ok(ranked)
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] is engine_version (informational, not used for checks)
    // bytes[8..12] is flags (reserved)
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

/// Check the header and checksum, then decode the payload without validating it.
fn open(bytes: &[u8]) -> Result<SerializedRuleSet, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedRuleSet, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok(serialized)
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    ruleset: &CompiledRuleSet,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = ruleset_to_serialized(ruleset, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);

    tracing::debug!(
        lines = ruleset.lines.len(),
        bytes = buf.len(),
        "encoded rule set cache"
    );
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<CompiledRuleSet, DeserializeError> {
    let ruleset = serialized_to_ruleset(open(bytes)?)?;
    tracing::debug!(lines = ruleset.lines.len(), "decoded rule set cache");
    Ok(ruleset)
}

/// The BLAKE3 digest of the rule text a cache blob was encoded from, if one
/// was supplied to [`CompiledRuleSet::to_bytes`].
///
/// Compare against `blake3::hash(current_text)` to tell whether the cache is
/// stale before paying for a full decode and validation.
///
/// # Errors
///
/// Returns [`DeserializeError`] if the header, checksum or payload is invalid.
pub fn source_digest(bytes: &[u8]) -> Result<Option<[u8; 32]>, DeserializeError> {
    Ok(open(bytes)?.metadata.source_digest)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
