pub const DEFAULT_CONFIG_PATH: &str = "settings.yaml";

pub const DEFAULT_KEY_NAME: &str = "my_gpg_key";
pub const DEFAULT_SCRIPT_LOCATION_PREFIX: &str = "https://example.com/scripts/";
pub const DEFAULT_SIGNATURE_LOCATION_PREFIX: &str = "https://example.com/signatures/";

pub const DEFAULT_SCRIPTS_DIR: &str = "scripts";
pub const DEFAULT_SIGNATURES_DIR: &str = "gpg_signatures";
pub const DEFAULT_REGISTRY_PATH: &str = "resources.yml";

pub const DEFAULT_GPG_PROGRAM: &str = "gpg";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Extension of every signature artifact and of the key artifact.
pub const SIGNATURE_EXTENSION: &str = "asc";

/// Random bytes per passphrase; hex encoding doubles the length.
pub const PASSPHRASE_BYTES: usize = 16;
