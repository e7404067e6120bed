use crate::model::HostEntry;
use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// `--limit` filter: comma-separated host-name globs.
#[derive(Clone, Debug)]
pub struct HostLimit {
    set: GlobSet,
    raw: String,
}

impl HostLimit {
    pub fn parse(pattern: &str) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut any = false;
        for part in pattern.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            builder.add(Glob::new(part).with_context(|| format!("invalid --limit glob: {part}"))?);
            any = true;
        }
        if !any {
            anyhow::bail!("--limit must name at least one host pattern");
        }
        Ok(Self {
            set: builder.build().context("build --limit globset")?,
            raw: pattern.to_string(),
        })
    }

    pub fn matches(&self, host: &str) -> bool {
        self.set.is_match(host)
    }

    pub fn apply(&self, hosts: Vec<HostEntry>) -> Vec<HostEntry> {
        let before = hosts.len();
        let kept: Vec<HostEntry> = hosts.into_iter().filter(|h| self.matches(&h.name)).collect();
        tracing::debug!(limit = %self.raw, before, after = kept.len(), "applied host limit");
        kept
    }
}
