//! Quell Packet Protection Primitives
//!
//! Cryptographic building blocks for Quell Initial packets. Pure
//! functions with deterministic outputs: both endpoints derive the same
//! keys from the first packet's destination connection ID, so the
//! handshake can be protected before any key exchange completes.
//!
//! # Key Hierarchy
//!
//! This section describes the key hierarchy from the client's initial
//! destination connection ID to per-direction packet protection keys.
//! Each protocol version pins its own extraction salt, so the same
//! connection ID yields unrelated keys across versions.
//!
//! ```text
//! Destination Connection ID
//!        │
//!        ▼
//! HKDF-Extract (version salt) → Initial Secret
//!        │
//!        ▼
//! HKDF-Expand-Label "client in" / "server in" → Directional Secrets
//!        │
//!        ▼
//! HKDF-Expand-Label "quic key" / "quic iv" / "quic hp" → Key Material
//!        │
//!        ▼
//! AEAD Sealing + Header Protection → Protected Packet
//! ```
//!
//! Each endpoint seals with its own direction's keys and opens with the
//! peer's, so a client's sealer and a server's opener always agree.
//!
//! # Security
//!
//! Scope:
//! - Initial keys derive from values visible on the wire, so any
//!   observer can compute them
//! - Protection defeats injection and accidental corruption, not
//!   eavesdropping; confidentiality starts with the handshake keys
//!
//! Authenticity:
//! - AES-128-GCM binds the ciphertext to the cleartext header via AAD
//! - Failed authentication tag -> reject packet
//!
//! Header Privacy:
//! - Packet number bytes and the low first-byte bits are masked with an
//!   AES-ECB keystream sampled from the ciphertext
//! - Masking hides packet numbers from casual observation only
//!
//! Key Hygiene:
//! - Secrets and derived key material are zeroized on drop
//! - Nonce = static IV XOR packet number; sealing each packet number
//!   once keeps nonces unique

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod initial;

pub use initial::{
    CryptoError, DirectionalSecret, HeaderProtector, InitialOpener, InitialSealer, KeyMaterial,
    PacketCipher, SECRET_LEN, TAG_LEN, derive_directional_secrets, initial_protection,
};
