//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `config.rs` — settings document loading, defaults, validation.
//! - `passphrase.rs` — per-script random secrets.
//! - `metadata.rs` — comment-header field extraction.
//! - `runner.rs` — bounded subprocess execution (`CommandRunner`).
//! - `gpg.rs` — signing-tool argument lists.
//! - `keystore.rs` — key-store exclusive section + key lifecycle.
//! - `signer.rs` — detached signature creation.
//! - `discovery.rs` — script corpus listing.
//! - `pipeline.rs` — per-script coordinator and the full run.
//! - `registry.rs` — atomic registry document writes.
//! - `doctor.rs` — environment report.
//! - `output.rs` — JSON/text output helpers and status lines.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Anything touching the key store takes a `KeyStoreSection`.

pub mod config;
pub mod discovery;
pub mod doctor;
pub mod gpg;
pub mod keystore;
pub mod metadata;
pub mod output;
pub mod passphrase;
pub mod pipeline;
pub mod registry;
pub mod runner;
pub mod signer;

#[cfg(test)]
pub mod testing;
