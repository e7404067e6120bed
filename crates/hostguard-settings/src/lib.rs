//! Config parsing and profile/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{CheckConfig, HostguardConfigV1, SCHEMA_CONFIG_V1};
pub use presets::PROFILES;
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `hostguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<HostguardConfigV1> {
    let cfg: HostguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (profile + overrides + per-check config).
pub fn resolve_config(
    cfg: HostguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
