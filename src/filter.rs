//! Filter Engine: the clean and smudge transforms.
//!
//! Clean moves content from the working tree into the repository
//! (encrypt-if-needed); smudge moves it back (decrypt-if-possible). Git
//! invokes each once per file, as an independent process, with the content on
//! stdin and the path as an argument; the functions here take the content as
//! a buffer so the process wiring stays in the command layer.
//!
//! Degradation policy: clean fails rather than silently store plaintext,
//! smudge passes ciphertext through rather than corrupt a checkout. A
//! checkout with a missing symmetric key completes, leaving those files in
//! repository form; asymmetric decryption failures are reported, since a
//! configured workstation is expected to hold a working identity.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::armor;
use crate::classify::{classify, Classification};
use crate::config::Config;
use crate::error::{CofferError, Result};
use crate::keyring::{self, FileKeyStore};
use crate::resolve::{self, OsFs, Resolution};

/// Working-tree form to repository form.
///
/// Idempotent: content that is already repository form is returned unchanged,
/// never re-encrypted. Plaintext with no resolvable policy is a fatal
/// configuration error.
pub fn clean(input: &[u8], path: &Path, cfg: &Config) -> Result<Vec<u8>> {
    if classify(input) != Classification::Plaintext {
        return Ok(input.to_vec());
    }

    let keys = FileKeyStore::new(&cfg.keyring_path);
    match resolve::resolve(path, &OsFs, &keys)? {
        Resolution::Recipients(recipients) => armor::encrypt(input, &recipients),
        Resolution::Key(key) => key.encrypt(input),
    }
}

/// Repository form to working-tree form.
///
/// Symmetric content whose key is unavailable, and symmetric content that
/// fails to decrypt, pass through unchanged so the caller's checkout
/// completes. Asymmetric failures are returned to the caller.
pub fn smudge(input: &[u8], path: &Path, cfg: &Config) -> Result<Vec<u8>> {
    match classify(input) {
        Classification::AsymmetricArmored => {
            let identities = keyring::load_identities(&cfg.identity_path)?;
            armor::decrypt(input, &identities)
        }
        Classification::SymmetricCiphertext => {
            let keys = FileKeyStore::new(&cfg.keyring_path);
            let key = match resolve::resolve_key(path, &OsFs, &keys) {
                Ok(key) => key,
                Err(CofferError::KeyNotFound(key_id)) => {
                    // expected on a workstation that simply lacks this key
                    debug!(%key_id, path = %path.display(), "key not in keyring, passing through");
                    return Ok(input.to_vec());
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "key lookup failed, passing through");
                    return Ok(input.to_vec());
                }
            };
            match key.decrypt(input) {
                Ok(plaintext) => Ok(plaintext),
                Err(err) => {
                    warn!(path = %path.display(), %err, "decryption failed, passing through");
                    Ok(input.to_vec())
                }
            }
        }
        Classification::Plaintext => Ok(input.to_vec()),
    }
}

/// Read a repository-form file and smudge it. Backs the diff textconv and
/// the merge driver's materialization step.
pub fn smudge_file(path: &Path, cfg: &Config) -> Result<Vec<u8>> {
    let input = fs::read(path)?;
    smudge(&input, path, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecretKey;
    use crate::keyring::Keyring;
    use crate::resolve::{KEYID_FILENAME, RECIPIENTS_FILENAME};
    use age::secrecy::ExposeSecret;
    use age::x25519::Identity;
    use tempfile::TempDir;

    struct Setup {
        _home: TempDir,
        work: TempDir,
        cfg: Config,
        key: SecretKey,
    }

    // A working tree governed by a key-id marker, with the key present in a
    // keyring under a separate temporary home.
    fn symmetric_setup() -> Setup {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let key = SecretKey::generate();
        let keyring_path = home.path().join(".coffer_keyring");
        let mut keyring = Keyring::default();
        keyring.add("test", &key);
        keyring.save(&keyring_path).unwrap();

        std::fs::write(work.path().join(KEYID_FILENAME), key.key_id()).unwrap();

        let cfg = Config {
            keyring_path,
            identity_path: home.path().join(".coffer_identity"),
        };
        Setup {
            _home: home,
            work,
            cfg,
            key,
        }
    }

    #[test]
    fn symmetric_round_trip() {
        let setup = symmetric_setup();
        let path = setup.work.path().join("secret.txt");
        let plaintext = b"the plans";

        let repo_form = clean(plaintext, &path, &setup.cfg).unwrap();
        assert_eq!(
            classify(&repo_form),
            Classification::SymmetricCiphertext
        );

        let restored = smudge(&repo_form, &path, &setup.cfg).unwrap();
        assert_eq!(restored, plaintext);
    }

    #[test]
    fn clean_is_idempotent() {
        let setup = symmetric_setup();
        let path = setup.work.path().join("secret.txt");

        let once = clean(b"data", &path, &setup.cfg).unwrap();
        let twice = clean(&once, &path, &setup.cfg).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn clean_without_policy_is_fatal() {
        let setup = symmetric_setup();
        // no marker anywhere above this tree
        let orphan = TempDir::new().unwrap();
        let path = orphan.path().join("file.txt");

        let err = clean(b"data", &path, &setup.cfg).unwrap_err();
        assert!(matches!(err, CofferError::PolicyNotFound(_)));
    }

    #[test]
    fn smudge_with_missing_key_passes_through() {
        let setup = symmetric_setup();
        let path = setup.work.path().join("secret.txt");
        let repo_form = clean(b"data", &path, &setup.cfg).unwrap();

        // a workstation whose keyring lacks the key
        let other_home = TempDir::new().unwrap();
        let other_keyring = other_home.path().join(".coffer_keyring");
        Keyring::default().save(&other_keyring).unwrap();
        let cfg = Config {
            keyring_path: other_keyring,
            identity_path: other_home.path().join(".coffer_identity"),
        };

        let out = smudge(&repo_form, &path, &cfg).unwrap();
        assert_eq!(out, repo_form);
    }

    #[test]
    fn smudge_with_corrupt_ciphertext_passes_through() {
        let setup = symmetric_setup();
        let path = setup.work.path().join("secret.txt");
        let mut repo_form = clean(b"data", &path, &setup.cfg).unwrap();
        let last = repo_form.len() - 1;
        repo_form[last] ^= 0xFF;

        let out = smudge(&repo_form, &path, &setup.cfg).unwrap();
        assert_eq!(out, repo_form);
    }

    #[test]
    fn smudge_leaves_plaintext_alone() {
        let setup = symmetric_setup();
        let path = setup.work.path().join("secret.txt");

        let out = smudge(b"never encrypted", &path, &setup.cfg).unwrap();
        assert_eq!(out, b"never encrypted");
    }

    #[test]
    fn asymmetric_round_trip() {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let identity = Identity::generate();
        let identity_path = home.path().join(".coffer_identity");
        std::fs::write(
            &identity_path,
            format!("{}\n", identity.to_string().expose_secret()),
        )
        .unwrap();
        std::fs::write(
            work.path().join(RECIPIENTS_FILENAME),
            format!("{}\n", identity.to_public()),
        )
        .unwrap();

        let cfg = Config {
            keyring_path: home.path().join(".coffer_keyring"),
            identity_path,
        };
        let path = work.path().join("secret.txt");

        let repo_form = clean(b"for alice", &path, &cfg).unwrap();
        assert_eq!(classify(&repo_form), Classification::AsymmetricArmored);

        let restored = smudge(&repo_form, &path, &cfg).unwrap();
        assert_eq!(restored, b"for alice");
    }

    #[test]
    fn asymmetric_smudge_without_identity_is_an_error() {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let identity = Identity::generate();
        std::fs::write(
            work.path().join(RECIPIENTS_FILENAME),
            format!("{}\n", identity.to_public()),
        )
        .unwrap();

        let cfg = Config {
            keyring_path: home.path().join(".coffer_keyring"),
            identity_path: home.path().join(".coffer_identity"), // absent
        };
        let path = work.path().join("secret.txt");
        let repo_form = clean(b"for alice", &path, &cfg).unwrap();

        let err = smudge(&repo_form, &path, &cfg).unwrap_err();
        assert!(matches!(err, CofferError::IdentityNotFound(_)));
    }

    #[test]
    fn recipients_marker_wins_over_keyid_for_clean() {
        let setup = symmetric_setup();
        let identity = Identity::generate();
        std::fs::write(
            setup.work.path().join(RECIPIENTS_FILENAME),
            format!("{}\n", identity.to_public()),
        )
        .unwrap();

        let path = setup.work.path().join("secret.txt");
        let repo_form = clean(b"data", &path, &setup.cfg).unwrap();
        assert_eq!(classify(&repo_form), Classification::AsymmetricArmored);
        // the symmetric key is still resolvable but must not be chosen
        let _ = &setup.key;
    }
}
