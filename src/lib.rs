//! # coffer
//!
//! Transparent file encryption in git. Files matching a policy are stored
//! encrypted in history but appear as plaintext in the working tree.
//!
//! ## How it works
//!
//! coffer plugs into git's filter, diff, and merge driver pipeline:
//!
//! 1. **Clean filter** (encryption): when a file is staged, the clean filter
//!    encrypts it before it is stored in the repository.
//! 2. **Smudge filter** (decryption): on checkout, the smudge filter
//!    decrypts it into the working directory.
//! 3. **Diff textconv**: `git diff` and `git log -p` show the decrypted
//!    form instead of ciphertext.
//! 4. **Merge driver**: three-way merges run over decrypted temporary
//!    copies, so an encryption-unaware line merge can resolve them.
//!
//! ```text
//! working tree ── git add ──▶ clean ──▶ encrypt ──▶ repository
//! repository ── git checkout ──▶ smudge ──▶ decrypt ──▶ working tree
//! ```
//!
//! ## Policies
//!
//! Which key material applies to a file is decided by marker files in the
//! directory tree, nearest ancestor first:
//!
//! - `.coffer-recipients` - one age X25519 public key per line; files
//!   beneath it are stored as armored age ciphertext any listed recipient
//!   can decrypt.
//! - `.coffer-keyid` - a single key identifier; files beneath it are stored
//!   in the symmetric AES-256-GCM container, with the key looked up in the
//!   local keyring.
//!
//! When both markers share a directory, recipients win. Staging a file with
//! no resolvable policy is an error - coffer never silently stores
//! plaintext for a path routed through its filter.
//!
//! A checkout on a machine that lacks the symmetric key still completes:
//! smudge passes ciphertext through unchanged rather than fail the whole
//! operation, and logs why. A missing or wrong *identity* is reported
//! instead, since a configured workstation is expected to hold one.
//!
//! ## Setup
//!
//! ```bash
//! coffer git-config                 # register the git drivers (once)
//! coffer gen-key team-secrets      # prints the key-id
//! echo <key-id> > secrets/.coffer-keyid
//! echo 'secrets/** filter=coffer diff=coffer merge=coffer' >> .gitattributes
//! ```
//!
//! Key material lives under `$COFFER_HOME` (or `$HOME`): `.coffer_keyring`
//! holds symmetric keys, `.coffer_identity` holds age identities. Both can
//! be overridden per invocation with `--keyring` / `--identity-file`.
//!
//! ## Module overview
//!
//! - [`classify`] - decide what a byte stream is (plaintext, symmetric
//!   container, armored age)
//! - [`resolve`] - walk ancestor directories for the nearest policy marker
//! - [`filter`] - the clean/smudge transforms built from the two above
//! - [`crypto`] - symmetric engine (deterministic AES-256-GCM container)
//! - [`armor`] - asymmetric engine (armored age encryption)
//! - [`keyring`] - keyring and identity file handling
//! - [`merge`] - the three-way merge driver
//! - [`walk`] - recursive tree decryption
//! - [`config`] - per-invocation configuration
//! - [`git`] - git configuration wiring

pub mod armor;
pub mod classify;
pub mod config;
pub mod crypto;
pub mod error;
pub mod filter;
pub mod git;
pub mod keyring;
pub mod merge;
pub mod resolve;
pub mod walk;

// Re-export commonly used types
pub use classify::{classify, Classification};
pub use config::Config;
pub use crypto::SecretKey;
pub use error::{CofferError, Result};
pub use keyring::Keyring;
