use age::x25519::Identity;

use crate::config::Config;
use crate::error::Result;
use crate::keyring;

/// Generate a new age identity and append it to the identity file.
pub fn gen_identity(description: &str, cfg: &Config) -> Result<()> {
    let identity = Identity::generate();
    keyring::append_identity(&cfg.identity_path, description, &identity)?;

    println!(
        "Added identity '{description}' to {}",
        cfg.identity_path.display()
    );
    println!("public key: {}", identity.to_public());
    println!();
    println!("Put the public key in a .coffer-recipients file to encrypt to it");

    Ok(())
}
