//! Asymmetric cipher engine: armored age encryption.
//!
//! Repository-form asymmetric content is a standard armored age file
//! encrypted to the X25519 recipients named by the nearest policy marker.
//! The armor header string is load-bearing: it is how classification
//! recognizes asymmetric content in arbitrary historical blobs.

use std::io::{Read, Write};

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::x25519::{Identity, Recipient};
use age::{DecryptError, Decryptor, EncryptError, Encryptor};

use crate::error::{CofferError, Result};

/// ASCII armor header of the age format.
pub const ARMOR_HEADER: &str = "-----BEGIN AGE ENCRYPTED FILE-----";

/// Encrypt plaintext to a set of recipients, producing an armored age file.
pub fn encrypt(plaintext: &[u8], recipients: &[Recipient]) -> Result<Vec<u8>> {
    let encryptor =
        Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn age::Recipient))
            .map_err(map_encrypt_err)?;

    let mut ciphertext = Vec::new();
    let armored = ArmoredWriter::wrap_output(&mut ciphertext, Format::AsciiArmor)
        .map_err(CofferError::Io)?;
    let mut writer = encryptor.wrap_output(armored).map_err(CofferError::Io)?;
    writer.write_all(plaintext).map_err(CofferError::Io)?;
    let armored = writer.finish().map_err(CofferError::Io)?;
    armored.finish().map_err(CofferError::Io)?;

    Ok(ciphertext)
}

/// Decrypt an armored age file with any of the given identities.
pub fn decrypt(armored: &[u8], identities: &[Identity]) -> Result<Vec<u8>> {
    let decryptor = Decryptor::new(ArmoredReader::new(armored)).map_err(map_decrypt_err)?;

    let mut reader = decryptor
        .decrypt(identities.iter().map(|i| i as &dyn age::Identity))
        .map_err(map_decrypt_err)?;
    let mut plaintext = Vec::new();
    reader
        .read_to_end(&mut plaintext)
        .map_err(CofferError::Io)?;

    Ok(plaintext)
}

/// Parse a recipients marker file: one age public key per line, surrounding
/// whitespace trimmed, blank lines and `#` comments skipped. Any malformed
/// key line fails the whole file.
pub fn parse_recipients(text: &str) -> Result<Vec<Recipient>> {
    let mut recipients = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let recipient: Recipient = line
            .parse()
            .map_err(|e| CofferError::Age(format!("invalid recipient on line {}: {e}", index + 1)))?;
        recipients.push(recipient);
    }
    if recipients.is_empty() {
        return Err(CofferError::Age("recipients file contains no keys".into()));
    }
    Ok(recipients)
}

/// Parse identity file content: one X25519 secret key per line, `#` comments
/// and blank lines skipped.
pub fn parse_identities(text: &str) -> Result<Vec<Identity>> {
    let mut identities = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let identity: Identity = line
            .parse()
            .map_err(|e| CofferError::Age(format!("invalid identity on line {}: {e}", index + 1)))?;
        identities.push(identity);
    }
    if identities.is_empty() {
        return Err(CofferError::Age("identity file contains no identities".into()));
    }
    Ok(identities)
}

fn map_encrypt_err(err: EncryptError) -> CofferError {
    CofferError::Age(format!("age encryption failed: {err}"))
}

fn map_decrypt_err(err: DecryptError) -> CofferError {
    CofferError::Age(format!("age decryption failed: {err}"))
}
