use hostguard_types::{CheckResult, HostguardData, VerdictSummary};

/// What was targeted in a run, in report order.
#[derive(Clone, Debug, Default)]
pub struct RunScope {
    pub groups: Vec<String>,
    pub hosts: Vec<String>,
    pub suites: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: VerdictSummary,
    pub results: Vec<CheckResult>,
    pub data: HostguardData,
}
