//! Initial packet protection: key derivation, sealing, opening
//!
//! Everything needed to protect and unprotect Initial packets before
//! the handshake yields negotiated keys. The module splits along the
//! key hierarchy:
//!
//! - [`secrets`]: connection ID to per-direction secrets
//! - [`key_schedule`]: secrets to AEAD key, IV, and header-protection key
//! - [`packet_cipher`]: AEAD sealing and opening with derived nonces
//! - [`header_protection`]: first-byte and packet-number masking
//! - [`protection`]: sealer/opener facades tying the layers together

pub mod error;
pub mod header_protection;
pub mod key_schedule;
pub mod packet_cipher;
pub mod protection;
pub mod secrets;

pub use error::CryptoError;
pub use header_protection::HeaderProtector;
pub use key_schedule::{HP_KEY_LEN, IV_LEN, KEY_LEN, KeyMaterial};
pub use packet_cipher::{InitialAead, PacketCipher, TAG_LEN};
pub use protection::{InitialOpener, InitialSealer, initial_protection};
pub use secrets::{DirectionalSecret, SECRET_LEN, derive_directional_secrets};
