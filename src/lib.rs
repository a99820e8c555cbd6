//#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

//! Pure Rust implementation of the Grain-128AEADv2 authenticated encryption
//! algorithm, a finalist of the NIST lightweight cryptography competition.
//!
//! The cipher couples a 128-bit LFSR and a 128-bit NFSR into a pre-output
//! generator whose bit stream alternates between encryption and
//! authentication duty; a 64-bit accumulator/shift-register pair turns the
//! authentication bits into an 8-byte tag. Internally all bulk work runs
//! through 8- and 32-wide clocking paths that are bit-identical to the
//! single-bit cipher definition.
//!
//! ## Usage
//!
//! ```
//! use grain_128aead::{Grain128Aead, KeyInit};
//!
//! let key = [0x42u8; 16];
//! let nonce = [0x24u8; 12]; // a nonce must be used only once per key
//!
//! let cipher = Grain128Aead::new(&key.into());
//!
//! let (ciphertext, tag) = cipher.encrypt_aead(&nonce.into(), b"header", b"a secret message");
//! let plaintext = cipher
//!     .decrypt_aead(&nonce.into(), b"header", &ciphertext, &tag)
//!     .expect("tag must verify");
//!
//! assert_eq!(plaintext, b"a secret message");
//! ```

#[macro_use]
extern crate alloc;

pub use aead::{
    self,
    array::Array,
    consts::{U12, U16, U8},
    inout::InOutBuf,
    AeadCore, AeadInOut, Error, Key, KeyInit, KeySizeUser, Nonce, Tag,
};
use aead::TagPosition;

#[cfg(feature = "zeroize")]
pub use zeroize;

mod fsr;
mod grain_core;
mod traits;
mod utils;

use alloc::vec::Vec;
use grain_core::GrainCore;

/// Grain-128AEADv2 cipher instance holding the 128-bit key.
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub struct Grain128Aead {
    key: [u8; 16],
}

impl KeySizeUser for Grain128Aead {
    type KeySize = U16;
}

impl KeyInit for Grain128Aead {
    fn new(key: &Key<Self>) -> Self {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(key.as_slice());

        Grain128Aead { key: bytes }
    }
}

impl AeadCore for Grain128Aead {
    type NonceSize = U12;
    type TagSize = U8;
    const TAG_POSITION: TagPosition = TagPosition::Postfix;
}

impl Grain128Aead {
    /// Encrypt `plaintext` under `nonce`, authenticating it together with
    /// `associated_data`; returns the ciphertext (same length as the
    /// plaintext) and the 8-byte tag.
    pub fn encrypt_aead(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> (Vec<u8>, Tag<Self>) {
        let mut cipher = GrainCore::new(&self.key, &nonce_bytes(nonce));

        let mut buffer = plaintext.to_vec();
        let tag = cipher.encrypt_inout(associated_data, buffer.as_mut_slice().into());

        (buffer, Tag::<Self>::from(tag))
    }

    /// Decrypt `ciphertext` and verify `expected_tag` over the associated
    /// data and the recovered plaintext. Fails with [`Error`] on tag
    /// mismatch; no plaintext is released in that case.
    pub fn decrypt_aead(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        ciphertext: &[u8],
        expected_tag: &Tag<Self>,
    ) -> Result<Vec<u8>, Error> {
        let mut cipher = GrainCore::new(&self.key, &nonce_bytes(nonce));

        let mut buffer = ciphertext.to_vec();
        cipher.decrypt_inout(
            associated_data,
            buffer.as_mut_slice().into(),
            expected_tag.as_slice(),
        )?;

        Ok(buffer)
    }
}

impl AeadInOut for Grain128Aead {
    fn encrypt_inout_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: InOutBuf<'_, '_, u8>,
    ) -> Result<Tag<Self>, Error> {
        let mut cipher = GrainCore::new(&self.key, &nonce_bytes(nonce));

        Ok(Tag::<Self>::from(
            cipher.encrypt_inout(associated_data, buffer),
        ))
    }

    fn decrypt_inout_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: InOutBuf<'_, '_, u8>,
        tag: &Tag<Self>,
    ) -> Result<(), Error> {
        let mut cipher = GrainCore::new(&self.key, &nonce_bytes(nonce));

        cipher.decrypt_inout(associated_data, buffer, tag.as_slice())
    }
}

fn nonce_bytes(nonce: &Nonce<Grain128Aead>) -> [u8; 12] {
    let mut bytes = [0u8; 12];
    bytes.copy_from_slice(nonce.as_slice());
    bytes
}
