//! Argument lists for the gpg invocations. Everything runs in batch mode with
//! loopback pinentry so the passphrase is taken from the command line.

use std::path::Path;

fn batch_prefix(passphrase: &str) -> Vec<String> {
    vec![
        "--batch".into(),
        "--yes".into(),
        "--pinentry-mode".into(),
        "loopback".into(),
        "--passphrase".into(),
        passphrase.into(),
    ]
}

pub fn version_args() -> Vec<String> {
    vec!["--version".into()]
}

pub fn keygen_args(key_name: &str, passphrase: &str) -> Vec<String> {
    let mut args = batch_prefix(passphrase);
    args.extend(["--quick-gen-key".into(), key_name.into()]);
    args
}

pub fn detach_sign_args(
    key_name: &str,
    passphrase: &str,
    script: &Path,
    output: &Path,
) -> Vec<String> {
    let mut args = batch_prefix(passphrase);
    args.extend([
        "--local-user".into(),
        key_name.into(),
        "--armor".into(),
        "--output".into(),
        output.to_string_lossy().into_owned(),
        "--detach-sign".into(),
        script.to_string_lossy().into_owned(),
    ]);
    args
}

pub fn export_public_key_args(key_name: &str, output: &Path) -> Vec<String> {
    vec![
        "--batch".into(),
        "--yes".into(),
        "--armor".into(),
        "--output".into(),
        output.to_string_lossy().into_owned(),
        "--export".into(),
        key_name.into(),
    ]
}
