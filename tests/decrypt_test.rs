//! Tests for the decrypt command: single-file decryption with an explicit
//! key, and recursive tree decryption that survives per-file failures.

mod common;

use common::{coffer_cmd, TestHome};
use coffer::SecretKey;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_single_file_decrypt_with_explicit_key() {
    let key = SecretKey::generate();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sealed.bin");
    fs::write(&path, key.encrypt(b"hand me the key").unwrap()).unwrap();

    let home = TestHome::new();
    let output = coffer_cmd()
        .env("COFFER_HOME", home.dir.path())
        .arg("decrypt")
        .arg("--key")
        .arg(key.encode())
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(&output.stdout[..], b"hand me the key");
}

#[test]
fn test_single_file_decrypt_requires_a_key() {
    let home = TestHome::new();
    coffer_cmd()
        .env("COFFER_HOME", home.dir.path())
        .arg("decrypt")
        .arg("whatever.bin")
        .assert()
        .failure();
}

#[test]
fn test_single_file_decrypt_reads_stdin() {
    let key = SecretKey::generate();
    let sealed = key.encrypt(b"piped in").unwrap();

    let home = TestHome::new();
    let output = coffer_cmd()
        .env("COFFER_HOME", home.dir.path())
        .arg("decrypt")
        .arg("--key")
        .arg(key.encode())
        .write_stdin(sealed)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(&output.stdout[..], b"piped in");
}

#[test]
fn test_recursive_decrypt_continues_past_failures() {
    let home = TestHome::new();
    let known = home.add_key("known");
    let unknown = SecretKey::generate();

    let tree = TempDir::new().unwrap();
    let good = tree.path().join("good");
    let bad = tree.path().join("bad");
    fs::create_dir_all(&good).unwrap();
    fs::create_dir_all(&bad).unwrap();
    fs::write(good.join(".coffer-keyid"), known.key_id()).unwrap();
    fs::write(bad.join(".coffer-keyid"), unknown.key_id()).unwrap();

    fs::write(good.join("a.txt"), known.encrypt(b"alpha").unwrap()).unwrap();
    fs::write(good.join("b.txt"), known.encrypt(b"beta").unwrap()).unwrap();
    let sealed = unknown.encrypt(b"gamma").unwrap();
    fs::write(bad.join("c.txt"), &sealed).unwrap();

    coffer_cmd()
        .env("COFFER_HOME", home.dir.path())
        .arg("decrypt")
        .arg("--recursive")
        .arg(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decrypt"));

    // the resolvable files were decrypted in place regardless
    assert_eq!(fs::read(good.join("a.txt")).unwrap(), b"alpha");
    assert_eq!(fs::read(good.join("b.txt")).unwrap(), b"beta");
    // the unresolvable one is untouched
    assert_eq!(fs::read(bad.join("c.txt")).unwrap(), sealed);
}

#[test]
fn test_recursive_decrypt_with_pinned_key() {
    let home = TestHome::new();
    let key = SecretKey::generate(); // deliberately not in any keyring

    let tree = TempDir::new().unwrap();
    fs::write(
        tree.path().join("f.txt"),
        key.encrypt(b"pinned decrypt").unwrap(),
    )
    .unwrap();

    coffer_cmd()
        .env("COFFER_HOME", home.dir.path())
        .arg("decrypt")
        .arg("--recursive")
        .arg("--key")
        .arg(key.encode())
        .arg(tree.path())
        .assert()
        .success();

    assert_eq!(fs::read(tree.path().join("f.txt")).unwrap(), b"pinned decrypt");
}

#[test]
fn test_recursive_decrypt_rejects_bad_override_up_front() {
    let home = TestHome::new();
    let key = home.add_key("known");

    let tree = TempDir::new().unwrap();
    fs::write(tree.path().join(".coffer-keyid"), key.key_id()).unwrap();
    let sealed = key.encrypt(b"data").unwrap();
    fs::write(tree.path().join("f.txt"), &sealed).unwrap();

    coffer_cmd()
        .env("COFFER_HOME", home.dir.path())
        .arg("decrypt")
        .arg("--recursive")
        .arg("--key")
        .arg("definitely-not-base64-key-material")
        .arg(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key override"));

    // no file was touched: the override failed validation before the walk
    assert_eq!(fs::read(tree.path().join("f.txt")).unwrap(), sealed);
}
