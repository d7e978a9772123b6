use crate::config::Config;
use crate::crypto::SecretKey;
use crate::error::Result;
use crate::keyring::Keyring;

/// Generate a new symmetric key and append it to the keyring.
pub fn gen_key(description: &str, cfg: &Config) -> Result<()> {
    let mut keyring = Keyring::load_or_default(&cfg.keyring_path)?;

    let key = SecretKey::generate();
    keyring.add(description, &key);
    keyring.save(&cfg.keyring_path)?;

    println!("Added key '{description}' to {}", cfg.keyring_path.display());
    println!("key-id: {}", key.key_id());
    println!();
    println!("Put the key-id in a .coffer-keyid file to encrypt everything beneath it");

    Ok(())
}
