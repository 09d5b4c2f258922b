#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stand-in for gpg. Logs each key-store operation to `$FAKE_GPG_LOG`, fails
/// signing for `$FAKE_GPG_FAIL_ON`, and exits with `$FAKE_GPG_KEYGEN_EXIT` on
/// key generation.
const FAKE_GPG: &str = r#"#!/bin/sh
log="${FAKE_GPG_LOG:-/dev/null}"
out=""
mode=""
prev=""
last=""
for a in "$@"; do
  if [ "$prev" = "--output" ]; then out="$a"; fi
  case "$a" in
    --version) echo "gpg (fake) 2.4.0"; exit 0 ;;
    --quick-gen-key) mode=keygen ;;
    --detach-sign) mode=sign ;;
    --export) mode=export ;;
  esac
  prev="$a"
  last="$a"
done
case "$mode" in
  keygen)
    echo "keygen $last" >> "$log"
    exit "${FAKE_GPG_KEYGEN_EXIT:-0}"
    ;;
  sign)
    name=$(basename "$last")
    echo "sign $name" >> "$log"
    if [ -n "$FAKE_GPG_FAIL_ON" ] && [ "$name" = "$FAKE_GPG_FAIL_ON" ]; then
      echo "gpg: signing failed: Bad passphrase" >&2
      exit 2
    fi
    printf -- '-----BEGIN PGP SIGNATURE-----\nfake\n-----END PGP SIGNATURE-----\n' > "$out"
    exit 0
    ;;
  export)
    echo "export $last" >> "$log"
    echo "fake public key" > "$out"
    exit 0
    ;;
esac
echo "gpg: unsupported invocation" >&2
exit 64
"#;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub gpg: PathBuf,
    pub log: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("work");
        fs::create_dir_all(root.join("scripts")).expect("create scripts dir");

        let bin = tmp.path().join("bin");
        fs::create_dir_all(&bin).expect("create bin dir");
        let gpg = bin.join("fake-gpg");
        fs::write(&gpg, FAKE_GPG).expect("write fake gpg");
        fs::set_permissions(&gpg, fs::Permissions::from_mode(0o755)).expect("chmod fake gpg");

        let log = tmp.path().join("gpg.log");
        let env = Self {
            _tmp: tmp,
            root,
            gpg,
            log,
        };
        env.write_settings("");
        env
    }

    /// Base settings pointing at the fake tool, followed by `extra` YAML lines.
    pub fn write_settings(&self, extra: &str) {
        let body = format!(
            "gpg_program: {}\ncommand_timeout_secs: 10\n{}",
            self.gpg.display(),
            extra
        );
        fs::write(self.root.join("settings.yaml"), body).expect("write settings");
    }

    pub fn add_script(&self, name: &str, body: &str) {
        fs::write(self.root.join("scripts").join(name), body).expect("write script");
    }

    pub fn plant_key_artifact(&self, key_name: &str) {
        let dir = self.root.join("gpg_signatures");
        fs::create_dir_all(&dir).expect("create key dir");
        fs::write(dir.join(format!("{}.asc", key_name)), "existing key").expect("write key");
    }

    pub fn signature(&self, script: &str) -> PathBuf {
        self.root
            .join("gpg_signatures")
            .join(format!("{}.asc", script))
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("scriptsign").expect("scriptsign binary");
        cmd.current_dir(&self.root)
            .env("FAKE_GPG_LOG", &self.log)
            .env_remove("FAKE_GPG_FAIL_ON")
            .env_remove("FAKE_GPG_KEYGEN_EXIT")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_failure(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("error json output")
    }

    /// The registry document, as JSON for easy indexing.
    pub fn registry(&self) -> Value {
        registry_at(&self.root.join("resources.yml"))
    }

    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn keygen_count(&self) -> usize {
        self.log_lines()
            .iter()
            .filter(|l| l.starts_with("keygen "))
            .count()
    }
}

pub fn registry_at(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("read registry");
    let doc: serde_yaml::Value = serde_yaml::from_str(&raw).expect("registry yaml");
    serde_json::to_value(doc).expect("registry as json")
}
