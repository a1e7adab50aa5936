//! Integration tests for the CLI binary.
//!
//! Verifies that the `ppid` binary responds to basic flags and drives a
//! full request → attest → verify exchange between two data directories.
//!
//! This test is registered as a [[test]] in the peerplay-cli crate
//! so that CARGO_BIN_EXE_ppid is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `ppid` binary, isolated from the
/// caller's environment.
fn ppid_binary(home: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ppid"));
    cmd.arg("--home")
        .arg(home)
        .current_dir(cwd)
        .env_remove("PEERPLAY_HOME")
        .env_remove("PEERPLAY_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn run(home: &Path, cwd: &Path, args: &[&str]) -> Output {
    ppid_binary(home, cwd)
        .args(args)
        .output()
        .expect("failed to execute ppid")
}

fn run_ok(home: &Path, cwd: &Path, args: &[&str]) -> String {
    let output = run(home, cwd, args);
    assert!(
        output.status.success(),
        "ppid {args:?} should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_responds_to_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_ppid"))
        .arg("--help")
        .output()
        .expect("failed to execute ppid --help");

    assert!(
        output.status.success(),
        "ppid --help should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("ppid") || stdout.contains("PeerPlay") || stdout.contains("Usage"),
        "ppid --help output should contain usage information, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_ppid"))
        .arg("--version")
        .output()
        .expect("failed to execute ppid --version");

    assert!(
        output.status.success(),
        "ppid --version should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("0.1") || stdout.contains("ppid"),
        "ppid --version should contain version info, got: {stdout}"
    );
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_ppid"))
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute ppid");

    assert!(
        !output.status.success(),
        "ppid with unknown flag should exit with error"
    );
}

#[test]
fn cli_claim_without_identity_fails_cleanly() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();

    let output = run(
        home.path(),
        cwd.path(),
        &["claim", "request", "--form", "x"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");
    assert!(stderr.contains("identity"), "stderr: {stderr}");
}

#[test]
fn cli_import_rejects_invalid_file() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();
    std::fs::write(cwd.path().join("bad.json"), r#"{"did": "did:key:z1"}"#).unwrap();

    let output = run(home.path(), cwd.path(), &["identity", "import", "bad.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid file format"), "stderr: {stderr}");
    assert!(!home.path().join("peerplay-identity.json").exists());
}

#[test]
fn cli_identity_generate_and_import() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();

    let out = run_ok(home.path(), cwd.path(), &["identity", "generate"]);
    assert!(out.contains("did:key:z"), "{out}");
    assert!(cwd.path().join("peerplay-identity.json").exists());
    assert!(!home.path().join("peerplay-identity.json").exists());

    run_ok(
        home.path(),
        cwd.path(),
        &["identity", "import", "peerplay-identity.json"],
    );
    let shown = run_ok(home.path(), cwd.path(), &["identity", "show"]);
    assert!(shown.contains("Ed25519"), "{shown}");

    run_ok(home.path(), cwd.path(), &["identity", "clear"]);
    assert!(!run(home.path(), cwd.path(), &["identity", "show"])
        .status
        .success());
}

#[test]
fn cli_full_exchange_between_two_wallets() {
    let alice = tempfile::tempdir().unwrap();
    let bob = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();

    run_ok(alice.path(), cwd.path(), &["identity", "generate", "--save", "-o", "alice.json"]);
    run_ok(bob.path(), cwd.path(), &["identity", "generate", "--save", "-o", "bob.json"]);

    run_ok(
        alice.path(),
        cwd.path(),
        &["form", "create", "--title", "Trusted Actor", "--field", "reputation"],
    );
    let forms = run_ok(alice.path(), cwd.path(), &["form", "list"]);
    assert!(forms.contains("trusted-actor"), "{forms}");

    run_ok(
        alice.path(),
        cwd.path(),
        &["claim", "request", "--form", "trusted-actor", "--value", "reputation=trusted"],
    );
    let claim_link = run_ok(alice.path(), cwd.path(), &["claim", "link", "0"]);
    let claim_link = claim_link.trim();
    assert!(claim_link.starts_with("http://localhost:5173/attest?claim="));

    let attested = run_ok(bob.path(), cwd.path(), &["attest", "sign", "--link", claim_link]);
    let vc_link = attested
        .lines()
        .find(|l| l.contains("/verify?vc="))
        .expect("attest sign should print a credential link")
        .trim()
        .to_string();

    let verified = run_ok(alice.path(), cwd.path(), &["verify", "--link", &vc_link, "--save"]);
    assert!(verified.contains("valid"), "{verified}");
    assert!(!verified.contains("invalid"), "{verified}");

    let listed = run_ok(alice.path(), cwd.path(), &["verify", "list"]);
    assert!(listed.contains("AttestedClaim"), "{listed}");

    let checked = run_ok(alice.path(), cwd.path(), &["verify", "check", "0"]);
    assert!(checked.contains("valid"), "{checked}");

    run_ok(bob.path(), cwd.path(), &["attest", "export", "0"]);
    assert!(cwd.path().join("verifiable_cred.json").exists());
}

#[test]
fn cli_generate_never_overwrites_stored_identity() {
    let home = tempfile::tempdir().unwrap();

    run_ok(home.path(), home.path(), &["identity", "generate", "--save", "-o", "first.json"]);
    let before = run_ok(home.path(), home.path(), &["identity", "show"]);

    // The default export name is the identity's own storage file here.
    let output = run(home.path(), home.path(), &["identity", "generate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("storage file"), "stderr: {stderr}");

    let output = run(home.path(), home.path(), &["identity", "generate", "--force"]);
    assert!(!output.status.success(), "--force must not unlock storage files");

    let after = run_ok(home.path(), home.path(), &["identity", "show"]);
    assert_eq!(before, after);
}

#[test]
fn cli_export_requires_force_to_overwrite() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();

    run_ok(home.path(), cwd.path(), &["identity", "generate", "-o", "id.json"]);
    let output = run(home.path(), cwd.path(), &["identity", "generate", "-o", "id.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"), "stderr: {stderr}");

    run_ok(
        home.path(),
        cwd.path(),
        &["identity", "generate", "-o", "id.json", "--force"],
    );
}

#[test]
fn cli_issued_credentials_can_be_imported_removed_and_cleared() {
    let issuer = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();

    run_ok(issuer.path(), cwd.path(), &["identity", "generate", "--save", "-o", "issuer.json"]);
    std::fs::write(
        cwd.path().join("claim.json"),
        r#"{"formId":"member","credentialSubject":{"id":"did:key:zHolder","level":"gold"}}"#,
    )
    .unwrap();
    run_ok(issuer.path(), cwd.path(), &["attest", "sign", "--file", "claim.json"]);
    run_ok(issuer.path(), cwd.path(), &["attest", "sign", "--file", "claim.json"]);
    run_ok(issuer.path(), cwd.path(), &["attest", "export", "0", "-o", "vc.json"]);

    run_ok(other.path(), cwd.path(), &["attest", "import", "vc.json"]);
    let listed = run_ok(other.path(), cwd.path(), &["attest", "list"]);
    assert!(listed.contains("did:key:zHolder"), "{listed}");

    let output = run(other.path(), cwd.path(), &["attest", "import", "claim.json"]);
    assert!(!output.status.success());

    run_ok(issuer.path(), cwd.path(), &["attest", "remove", "0"]);
    let listed = run_ok(issuer.path(), cwd.path(), &["attest", "list"]);
    assert_eq!(listed.lines().filter(|l| l.contains("did:key:zHolder")).count(), 1);
    assert!(!run(issuer.path(), cwd.path(), &["attest", "remove", "5"])
        .status
        .success());

    run_ok(issuer.path(), cwd.path(), &["attest", "clear"]);
    let listed = run_ok(issuer.path(), cwd.path(), &["attest", "list"]);
    assert!(listed.contains("No issued credentials"), "{listed}");
}
