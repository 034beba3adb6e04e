//! # Schema Fingerprints
//!
//! A `SchemaFingerprint` is a SHA-256 digest over the *shape* of a
//! [`SchemaNode`]: field names in order, field kinds, scalar types, rule
//! flags, allowed values and, recursively, nested schemas (including the
//! names of named definitions).
//!
//! Two schemas with the same fingerprint are structurally identical, so any
//! model type derived from one is behaviorally equivalent to one derived from
//! the other. The model-type cache keys on this value.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::schema::{ChildSchema, FieldKind, SchemaNode};

/// Structural digest of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaFingerprint(pub [u8; 32]);

impl SchemaFingerprint {
    /// Compute the fingerprint of a schema.
    pub fn of(schema: &SchemaNode) -> Self {
        let mut hasher = Sha256::new();
        feed_schema(&mut hasher, schema);
        Self(hasher.finalize().into())
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The first eight hex characters, for log lines.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

// Every variable-length item is length-prefixed so that adjacent fields
// cannot collide by concatenation.
fn feed_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_be_bytes());
    hasher.update(s.as_bytes());
}

fn feed_schema(hasher: &mut Sha256, schema: &SchemaNode) {
    hasher.update((schema.len() as u64).to_be_bytes());
    for field in schema.fields() {
        feed_str(hasher, field.name());
        match field.kind() {
            FieldKind::Scalar { scalar } => {
                hasher.update([0u8]);
                feed_str(hasher, scalar.as_str());
            }
            FieldKind::Object { child } => {
                hasher.update([1u8]);
                feed_child(hasher, child);
            }
            FieldKind::ArrayOfObject { child } => {
                hasher.update([2u8]);
                feed_child(hasher, child);
            }
        }
        let rules = field.rules();
        hasher.update([u8::from(rules.required), u8::from(rules.present)]);
        hasher.update((field.allowed_values().len() as u64).to_be_bytes());
        for option in field.allowed_values() {
            feed_str(hasher, &option.to_string());
        }
    }
}

fn feed_child(hasher: &mut Sha256, child: &ChildSchema) {
    match child.name() {
        Some(name) => {
            hasher.update([1u8]);
            feed_str(hasher, name);
        }
        None => hasher.update([0u8]),
    }
    feed_schema(hasher, child.schema());
}
