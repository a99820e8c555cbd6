use aead::{inout::InOutBuf, Error};
use subtle::ConstantTimeEq;

use crate::fsr::{Authenticator, BitReg128};
use crate::traits::ClockWidth;
use crate::utils::{self, split_streams};

/// Complete Grain-128AEADv2 runtime state: the coupled LFSR/NFSR pair of
/// the pre-output generator plus the accumulator/shift-register pair of the
/// authenticator.
///
/// A `GrainCore` is built per encryption or decryption call, driven
/// linearly through initialization, associated data, message and padding,
/// and then discarded.
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
#[derive(Clone)]
pub(crate) struct GrainCore {
    lfsr: BitReg128,
    nfsr: BitReg128,
    auth: Authenticator,
}

impl GrainCore {
    /// Initialize the cipher from key and nonce by clocking 512 rounds:
    /// 320 mixing rounds with the pre-output folded back into both
    /// feedbacks, 64 rounds re-introducing the key, then 64 + 64 rounds
    /// whose pre-output seeds the accumulator and the auth shift register.
    /// Everything runs through the 32-wide path.
    pub(crate) fn new(key: &[u8; 16], nonce: &[u8; 12]) -> Self {
        let mut lfsr = [0u8; 16];
        lfsr[..12].copy_from_slice(nonce);
        lfsr[12..].copy_from_slice(&[0xff, 0xff, 0xff, 0x7f]);

        let mut cipher = GrainCore {
            lfsr: BitReg128::from_le_bytes(lfsr),
            nfsr: BitReg128::from_le_bytes(*key),
            auth: Authenticator::new(),
        };

        for _ in 0..10 {
            cipher.clock_init(0u32, 0u32);
        }

        // The key enters a second time, upper half into the LFSR and lower
        // half into the NFSR, as little-endian words.
        for t in 0..2 {
            let lo = t * 4;
            let ka = u32::from_le_bytes([key[lo + 8], key[lo + 9], key[lo + 10], key[lo + 11]]);
            let kb = u32::from_le_bytes([key[lo], key[lo + 1], key[lo + 2], key[lo + 3]]);
            cipher.clock_init(ka, kb);
        }

        let mut acc = 0u64;
        for t in 0..2 {
            acc |= u64::from(cipher.clock::<u32>()) << (t * 32);
        }
        cipher.auth.acc = acc;

        let mut sreg = 0u64;
        for t in 0..2 {
            sreg |= u64::from(cipher.clock::<u32>()) << (t * 32);
        }
        cipher.auth.sreg = sreg;

        cipher
    }

    /// Pre-output bits for the next `W::BITS` rounds:
    /// `y = h(x) ^ LFSR[93] ^ NFSR[2,15,36,45,64,73,89]` where
    /// `h(x) = x0x1 ^ x2x3 ^ x4x5 ^ x6x7 ^ x0x4x8`.
    fn pre_output<W: ClockWidth>(&self) -> W {
        let x0: W = self.nfsr.slice(12);
        let x1: W = self.lfsr.slice(8);
        let x2: W = self.lfsr.slice(13);
        let x3: W = self.lfsr.slice(20);
        let x4: W = self.nfsr.slice(95);
        let x5: W = self.lfsr.slice(42);
        let x6: W = self.lfsr.slice(60);
        let x7: W = self.lfsr.slice(79);
        let x8: W = self.lfsr.slice(94);

        let hx = (x0 & x1) ^ (x2 & x3) ^ (x4 & x5) ^ (x6 & x7) ^ (x0 & x4 & x8);

        hx ^ self.lfsr.slice(93)
            ^ self.nfsr.slice(2)
            ^ self.nfsr.slice(15)
            ^ self.nfsr.slice(36)
            ^ self.nfsr.slice(45)
            ^ self.nfsr.slice(64)
            ^ self.nfsr.slice(73)
            ^ self.nfsr.slice(89)
    }

    /// Linear feedback `L = s0 ^ s7 ^ s38 ^ s70 ^ s81 ^ s96`.
    fn lfsr_feedback<W: ClockWidth>(&self) -> W {
        self.lfsr.slice::<W>(0)
            ^ self.lfsr.slice(7)
            ^ self.lfsr.slice(38)
            ^ self.lfsr.slice(70)
            ^ self.lfsr.slice(81)
            ^ self.lfsr.slice(96)
    }

    /// Non-linear feedback `s0 ^ F(b)`, the LFSR[0] term included.
    fn nfsr_feedback<W: ClockWidth>(&self) -> W {
        let b = &self.nfsr;

        let linear: W = self.lfsr.slice::<W>(0)
            ^ b.slice(0)
            ^ b.slice(26)
            ^ b.slice(56)
            ^ b.slice(91)
            ^ b.slice(96);

        linear
            ^ (b.slice::<W>(3) & b.slice(67))
            ^ (b.slice::<W>(11) & b.slice(13))
            ^ (b.slice::<W>(17) & b.slice(18))
            ^ (b.slice::<W>(27) & b.slice(59))
            ^ (b.slice::<W>(40) & b.slice(48))
            ^ (b.slice::<W>(61) & b.slice(65))
            ^ (b.slice::<W>(68) & b.slice(84))
            ^ (b.slice::<W>(22) & b.slice(24) & b.slice(25))
            ^ (b.slice::<W>(70) & b.slice(78) & b.slice(82))
            ^ (b.slice::<W>(88) & b.slice(92) & b.slice(93) & b.slice(95))
    }

    /// Advance the cipher by `W::BITS` rounds in keystream mode (no
    /// overlays), returning the pre-output bits. All taps sit at index 96
    /// or below, so the pre-shift values stay intact across a window of up
    /// to 32 rounds and the result is bit-identical to repeated single-bit
    /// clocking.
    fn clock<W: ClockWidth>(&mut self) -> W {
        let y = self.pre_output::<W>();
        let s = self.lfsr_feedback::<W>();
        let b = self.nfsr_feedback::<W>();

        self.lfsr.shift_append(s);
        self.nfsr.shift_append(b);

        y
    }

    /// Initialization-mode advance: the pre-output is folded back into
    /// both feedback bits, with the caller's overlays (key
    /// re-introduction) xored on top.
    fn clock_init<W: ClockWidth>(&mut self, ov_lfsr: W, ov_nfsr: W) {
        let y = self.pre_output::<W>();
        let s = self.lfsr_feedback::<W>();
        let b = self.nfsr_feedback::<W>();

        self.lfsr.shift_append(s ^ y ^ ov_lfsr);
        self.nfsr.shift_append(b ^ y ^ ov_nfsr);
    }

    /// Two width-`W` clocks yield `2 * W::BITS` interleaved pre-output
    /// bits; deinterleaved, the even positions are the encryption key
    /// stream and the odd positions the authentication key stream.
    fn keystream_unit<W: ClockWidth>(&mut self) -> (W, W) {
        let y0 = self.clock::<W>();
        let y1 = self.clock::<W>();
        split_streams(y0, y1)
    }

    /// Authenticate one unit of associated data; the encryption half of
    /// the key stream is discarded.
    fn absorb_unit<W: ClockWidth>(&mut self, data: W) {
        let (_, auth_stream) = self.keystream_unit::<W>();
        self.auth.absorb(data, auth_stream);
    }

    /// Encrypt and authenticate one unit of plaintext.
    fn encrypt_unit<W: ClockWidth>(&mut self, plaintext: W) -> W {
        let (key_stream, auth_stream) = self.keystream_unit::<W>();
        self.auth.absorb(plaintext, auth_stream);
        plaintext ^ key_stream
    }

    /// Decrypt one unit of ciphertext and authenticate the recovered
    /// plaintext.
    fn decrypt_unit<W: ClockWidth>(&mut self, ciphertext: W) -> W {
        let (key_stream, auth_stream) = self.keystream_unit::<W>();
        let plaintext = ciphertext ^ key_stream;
        self.auth.absorb(plaintext, auth_stream);
        plaintext
    }

    /// Authenticate the DER-encoded length of the associated data followed
    /// by the data itself. The DER header runs through the byte path, the
    /// body through the word path with a byte-path tail.
    pub(crate) fn absorb_associated_data(&mut self, associated_data: &[u8]) {
        for &byte in utils::len_encode(associated_data.len() as u64).iter() {
            self.absorb_unit(byte);
        }

        let mut chunks = associated_data.chunks_exact(4);
        for chunk in chunks.by_ref() {
            let word = u32::from_le_bytes(chunk.try_into().expect("4-byte chunk"));
            self.absorb_unit(word);
        }
        for &byte in chunks.remainder() {
            self.absorb_unit(byte);
        }
    }

    /// Authenticate the closing `1` bit. It is absorbed as the byte `0x01`;
    /// the seven upper zero bits contribute nothing to the accumulator,
    /// but the two clocks of the unit still advance the registers.
    fn absorb_padding(&mut self) {
        let (_, auth_stream) = self.keystream_unit::<u8>();
        self.auth.absorb(0x01u8, auth_stream);
    }

    /// Encrypt the buffer in place (input and output may alias; each
    /// position is read before it is written) and return the tag.
    pub(crate) fn encrypt_inout(
        &mut self,
        associated_data: &[u8],
        mut buffer: InOutBuf<'_, '_, u8>,
    ) -> [u8; 8] {
        self.absorb_associated_data(associated_data);

        let len = buffer.len();
        let words = len / 4;

        for i in 0..words {
            let off = i * 4;
            let mut word = [0u8; 4];
            word.copy_from_slice(&buffer.get_in()[off..off + 4]);

            let enc = self.encrypt_unit(u32::from_le_bytes(word));
            buffer.get_out()[off..off + 4].copy_from_slice(&enc.to_le_bytes());
        }
        for i in (words * 4)..len {
            let enc = self.encrypt_unit(buffer.get_in()[i]);
            buffer.get_out()[i] = enc;
        }

        self.absorb_padding();
        self.auth.tag()
    }

    /// Decrypt the buffer in place and verify the tag.
    ///
    /// The comparison is constant-time over all eight tag bytes and only
    /// the final verdict is branched on; when it fails, the full output
    /// buffer is overwritten with zeroes so no unverified plaintext is
    /// released.
    pub(crate) fn decrypt_inout(
        &mut self,
        associated_data: &[u8],
        mut buffer: InOutBuf<'_, '_, u8>,
        expected_tag: &[u8],
    ) -> Result<(), Error> {
        self.absorb_associated_data(associated_data);

        let len = buffer.len();
        let words = len / 4;

        for i in 0..words {
            let off = i * 4;
            let mut word = [0u8; 4];
            word.copy_from_slice(&buffer.get_in()[off..off + 4]);

            let dec = self.decrypt_unit(u32::from_le_bytes(word));
            buffer.get_out()[off..off + 4].copy_from_slice(&dec.to_le_bytes());
        }
        for i in (words * 4)..len {
            let dec = self.decrypt_unit(buffer.get_in()[i]);
            buffer.get_out()[i] = dec;
        }

        self.absorb_padding();

        let tag = self.auth.tag();
        if bool::from(tag[..].ct_eq(expected_tag)) {
            Ok(())
        } else {
            buffer.get_out().fill(0);
            Err(Error)
        }
    }
}
