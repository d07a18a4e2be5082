//! Canonical CBOR encoding for deterministic signing.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! Certificates are signed over `SIGN_DOMAIN || content_bytes`, so the same
//! certificate must produce identical bytes on every platform.

use ciborium::value::Value;

use crate::caveat::Caveat;
use crate::certificate::{Certificate, Chain};
use crate::crypto::{Blake3Hash, PublicKey};

/// Domain separator prefixed to every signed certificate message.
pub const SIGN_DOMAIN: &[u8] = b"blessings/certificate/v1\0";

/// Certificate field keys (integer keys for compact encoding).
mod keys {
    pub const EXTENSION: u64 = 0;
    pub const CAVEATS: u64 = 1;
    pub const SUBJECT_KEY: u64 = 2;
    pub const PARENT: u64 = 3;
    pub const SIGNATURE: u64 = 4;

    pub const CAVEAT_ID: u64 = 0;
    pub const CAVEAT_PARAMS: u64 = 1;
}

/// Encode the signed content of a certificate.
///
/// `parent` is the digest of the preceding certificate's signature, or `None`
/// for the self-signed root of a chain.
pub fn certificate_content_bytes(
    extension: &str,
    caveats: &[Caveat],
    subject_key: &PublicKey,
    parent: Option<&Blake3Hash>,
) -> Vec<u8> {
    encode_value(&content_value(extension, caveats, subject_key, parent))
}

/// Construct the signed message (domain || content).
pub fn signed_message(content: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SIGN_DOMAIN.len() + content.len());
    buf.extend_from_slice(SIGN_DOMAIN);
    buf.extend_from_slice(content);
    buf
}

/// Encode a whole chain, signatures included.
///
/// This is what a [`crate::ChainId`] is computed over.
pub fn chain_bytes(chain: &Chain) -> Vec<u8> {
    let mut parent: Option<Blake3Hash> = None;
    let mut certs = Vec::with_capacity(chain.len());
    for cert in chain.certificates() {
        certs.push(certificate_value(cert, parent.as_ref()));
        parent = Some(cert.signature.digest());
    }
    encode_value(&Value::Array(certs))
}

fn content_value(
    extension: &str,
    caveats: &[Caveat],
    subject_key: &PublicKey,
    parent: Option<&Blake3Hash>,
) -> Value {
    let caveats = caveats
        .iter()
        .map(|c| {
            Value::Map(vec![
                (int(keys::CAVEAT_ID), Value::Bytes(c.id.0.to_vec())),
                (int(keys::CAVEAT_PARAMS), Value::Bytes(c.params.to_vec())),
            ])
        })
        .collect();

    let parent = match parent {
        Some(digest) => Value::Bytes(digest.0.to_vec()),
        None => Value::Null,
    };

    Value::Map(vec![
        (int(keys::EXTENSION), Value::Text(extension.to_string())),
        (int(keys::CAVEATS), Value::Array(caveats)),
        (int(keys::SUBJECT_KEY), Value::Bytes(subject_key.0.to_vec())),
        (int(keys::PARENT), parent),
    ])
}

fn certificate_value(cert: &Certificate, parent: Option<&Blake3Hash>) -> Value {
    let mut value = content_value(&cert.extension, &cert.caveats, &cert.subject_key, parent);
    if let Value::Map(entries) = &mut value {
        entries.push((int(keys::SIGNATURE), Value::Bytes(cert.signature.0.to_vec())));
    }
    value
}

fn int(key: u64) -> Value {
    Value::Integer(key.into())
}

/// Encode a CBOR Value to canonical bytes.
pub(crate) fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Tag(tag, inner) => {
            encode_uint(buf, 6, *tag);
            encode_value_to(buf, inner);
        }
        // Floats are never part of signed content; everything else is null.
        _ => buf.push(0xf6),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| (encode_value(k), v))
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}
