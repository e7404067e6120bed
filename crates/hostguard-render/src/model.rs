#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableVerdictStatus {
    Pass,
    Warn,
    Fail,
}

/// Per-host tally, in report order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableHost {
    pub name: String,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableFailure {
    pub host: String,
    pub suite: String,
    pub check: String,
    pub check_id: String,
    pub code: String,
    pub severity: RenderableSeverity,
    /// The host could not be queried, as opposed to a false expectation.
    pub transport: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableDegraded {
    pub host: String,
    pub check: String,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableData {
    pub profile: String,
    pub service_fallback: String,
    pub checks_total: u32,
    pub checks_failed: u32,
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub verdict: RenderableVerdictStatus,
    pub hosts: Vec<RenderableHost>,
    pub failures: Vec<RenderableFailure>,
    pub degraded: Vec<RenderableDegraded>,
    pub data: RenderableData,
}
