//! AES-256-CBC decryption for V1 values (`{iv_hex}:{ciphertext_hex}`)
//!
//! V1 predates authenticated encryption. It is read-only: nothing writes V1
//! any more, but stored values must keep decrypting until they are migrated.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};

use super::encryption::decode_fixed;
use super::MasterKey;
use crate::outcome::FailureReason;

/// CBC IV length in bytes
pub const LEGACY_IV_LEN: usize = 16;

type LegacyDecryptor = cbc::Decryptor<Aes256>;

/// Decrypt the hex fields of a V1 value
pub fn decrypt_legacy(
    iv_hex: &str,
    ciphertext_hex: &str,
    key: &MasterKey,
) -> Result<Vec<u8>, FailureReason> {
    let iv = decode_fixed::<LEGACY_IV_LEN>("iv", iv_hex)?;
    let ciphertext =
        hex::decode(ciphertext_hex).map_err(|_| FailureReason::MalformedHex("ciphertext"))?;

    LegacyDecryptor::new_from_slices(key.as_bytes(), &iv)
        .map_err(|_| FailureReason::NoCipherKey)?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| FailureReason::LegacyDecryptFailed)
}

/// Produce a V1 value the way the pre-GCM writer did (tests only)
#[cfg(test)]
pub(crate) fn encrypt_legacy(plaintext: &[u8], iv: [u8; LEGACY_IV_LEN], key: &MasterKey) -> String {
    use cbc::cipher::BlockEncryptMut;

    let ciphertext = cbc::Encryptor::<Aes256>::new(key.as_bytes().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> MasterKey {
        MasterKey::new(*b"0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn test_decrypts_known_vector() {
        // Written by the Node aes-256-cbc routine before the V2 format existed
        let plaintext = decrypt_legacy(
            "00112233445566778899aabbccddeeff",
            "06b792642ccfc795a9ac0ab0f6ac3a717e0ed03f77119df73a40ba9237e2a92c",
            &test_key(),
        )
        .unwrap();

        assert_eq!(plaintext, b"legacy-password-42");
    }

    #[test]
    fn test_encrypt_legacy_matches_known_vector() {
        let iv = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        assert_eq!(
            encrypt_legacy(b"legacy-password-42", iv, &test_key()),
            "00112233445566778899aabbccddeeff:06b792642ccfc795a9ac0ab0f6ac3a717e0ed03f77119df73a40ba9237e2a92c"
        );
    }

    #[test]
    fn test_wrong_key_fails_or_garbles() {
        let other = MasterKey::new([1u8; 32]);
        let result = decrypt_legacy(
            "00112233445566778899aabbccddeeff",
            "06b792642ccfc795a9ac0ab0f6ac3a717e0ed03f77119df73a40ba9237e2a92c",
            &other,
        );
        // CBC has no integrity check: a wrong key usually breaks the padding
        // but can occasionally yield bytes that merely look padded.
        assert_ne!(result.as_deref(), Ok(&b"legacy-password-42"[..]));
    }

    #[test]
    fn test_rejects_partial_block() {
        let result = decrypt_legacy("00112233445566778899aabbccddeeff", "abcd", &test_key());
        assert_eq!(result, Err(FailureReason::LegacyDecryptFailed));
    }

    #[test]
    fn test_rejects_short_iv() {
        let result = decrypt_legacy("0011", "00", &test_key());
        assert!(matches!(
            result,
            Err(FailureReason::BadLength { field: "iv", .. })
        ));
    }
}
