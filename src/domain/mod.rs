//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — script records, the registry, report/output structs.
//! - `constants.rs` — configuration defaults and fixed names.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/process side effects.
//!
//! ## Compatibility note
//! `Registry` serialization is the published registry format, and the report
//! structs back `--json` output. Keep schema-impacting changes explicit and
//! synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;
