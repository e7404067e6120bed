use crate::model::{Check, Predicate, SocketAddress, Suite};
use crate::policy::{CheckPolicy, EffectiveConfig, FailOn, ServiceFallback};
use crate::target::{CommandOutput, FileStat, ServiceStatus, Target, TransportError};
use hostguard_types::{HostPath, Severity, ids};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug)]
pub struct FakeFile {
    pub is_directory: bool,
    pub mode: u32,
    pub content: String,
}

/// In-memory host. Every answer comes from the maps below.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub name: String,
    pub packages: BTreeSet<String>,
    pub services: BTreeMap<String, ServiceStatus>,
    pub files: BTreeMap<String, FakeFile>,
    pub commands: BTreeMap<String, CommandOutput>,
    pub inet_listeners: Vec<(String, u16)>,
    pub unix_listeners: Vec<String>,
    pub groups: BTreeSet<String>,
    pub users: BTreeMap<String, Vec<String>>,
    pub binaries: BTreeSet<String>,
    /// Every query fails with a connection error.
    pub unreachable: bool,
    /// Number of queries answered so far.
    pub queries: Cell<u32>,
}

impl FakeHost {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_package(mut self, name: &str) -> Self {
        self.packages.insert(name.to_string());
        self
    }

    pub fn with_service(mut self, name: &str, running: bool, enabled: bool) -> Self {
        self.services.insert(
            name.to_string(),
            ServiceStatus {
                running,
                enabled,
                unit_present: true,
            },
        );
        self
    }

    /// A service the init system has no unit file for.
    pub fn with_unitless_service(mut self, name: &str, running: bool) -> Self {
        self.services.insert(
            name.to_string(),
            ServiceStatus {
                running,
                enabled: false,
                unit_present: false,
            },
        );
        self
    }

    pub fn with_file(mut self, path: &str, mode: u32, content: &str) -> Self {
        self.files.insert(
            path.to_string(),
            FakeFile {
                is_directory: false,
                mode,
                content: content.to_string(),
            },
        );
        self
    }

    pub fn with_dir(mut self, path: &str, mode: u32) -> Self {
        self.files.insert(
            path.to_string(),
            FakeFile {
                is_directory: true,
                mode,
                content: String::new(),
            },
        );
        self
    }

    pub fn with_command(mut self, command: &str, exit_code: i32, stdout: &str) -> Self {
        self.commands.insert(
            command.to_string(),
            CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    pub fn with_listener(mut self, host: &str, port: u16) -> Self {
        self.inet_listeners.push((host.to_string(), port));
        self
    }

    pub fn with_unix_listener(mut self, path: &str) -> Self {
        self.unix_listeners.push(path.to_string());
        self
    }

    pub fn with_group(mut self, name: &str) -> Self {
        self.groups.insert(name.to_string());
        self
    }

    pub fn with_user(mut self, name: &str, groups: &[&str]) -> Self {
        self.users.insert(
            name.to_string(),
            groups.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    pub fn with_binary(mut self, name: &str) -> Self {
        self.binaries.insert(name.to_string());
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn query(&self) -> Result<(), TransportError> {
        self.queries.set(self.queries.get() + 1);
        if self.unreachable {
            return Err(TransportError::Connection {
                host: self.name.clone(),
                detail: "host unreachable".to_string(),
            });
        }
        Ok(())
    }
}

impl Target for FakeHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.query()?;
        Ok(self.commands.get(command).cloned().unwrap_or(CommandOutput {
            exit_code: 127,
            stdout: String::new(),
            stderr: format!("sh: {command}: not found"),
        }))
    }

    fn file(&self, path: &HostPath) -> Result<FileStat, TransportError> {
        self.query()?;
        Ok(match self.files.get(path.as_str()) {
            Some(f) => FileStat {
                exists: true,
                is_directory: f.is_directory,
                is_file: !f.is_directory,
                mode: Some(f.mode),
            },
            None => FileStat::missing(),
        })
    }

    fn read_file(&self, path: &HostPath) -> Result<String, TransportError> {
        self.query()?;
        self.files
            .get(path.as_str())
            .map(|f| f.content.clone())
            .ok_or_else(|| TransportError::UnexpectedStatus {
                query: format!("cat {path}"),
                code: 1,
                stderr: "No such file or directory".to_string(),
            })
    }

    fn package_installed(&self, name: &str) -> Result<bool, TransportError> {
        self.query()?;
        Ok(self.packages.contains(name))
    }

    fn service(&self, name: &str) -> Result<ServiceStatus, TransportError> {
        self.query()?;
        Ok(self.services.get(name).copied().unwrap_or_default())
    }

    fn socket_listening(&self, address: &SocketAddress) -> Result<bool, TransportError> {
        self.query()?;
        Ok(match address {
            SocketAddress::Inet { .. } => self
                .inet_listeners
                .iter()
                .any(|(h, p)| address.matches_inet_listener(h, *p)),
            SocketAddress::Unix { .. } => self
                .unix_listeners
                .iter()
                .any(|p| address.matches_unix_listener(p)),
        })
    }

    fn group_exists(&self, name: &str) -> Result<bool, TransportError> {
        self.query()?;
        Ok(self.groups.contains(name))
    }

    fn user_groups(&self, user: &str) -> Result<Option<Vec<String>>, TransportError> {
        self.query()?;
        Ok(self.users.get(user).cloned())
    }

    fn binary_exists(&self, name: &str) -> Result<bool, TransportError> {
        self.query()?;
        Ok(self.binaries.contains(name))
    }
}

pub fn check(name: &str, predicate: Predicate) -> Check {
    Check {
        name: name.to_string(),
        predicate,
        severity: None,
        fallback: None,
        only_hosts: Vec::new(),
    }
}

pub fn suite(name: &str, checks: Vec<Check>) -> Suite {
    Suite {
        name: name.to_string(),
        group: "all".to_string(),
        checks,
    }
}

/// Every check kind enabled at error severity, strict fallback.
pub fn strict_config() -> EffectiveConfig {
    let checks = ids::ALL_CHECK_IDS
        .iter()
        .map(|id| (id.to_string(), CheckPolicy::enabled(Severity::Error)))
        .collect();
    EffectiveConfig {
        profile: "test".to_string(),
        fail_on: FailOn::Error,
        service_fallback: ServiceFallback::Strict,
        parallel: false,
        max_output_bytes: 4096,
        checks,
    }
}

pub fn config_with_check(check_id: &str, severity: Severity) -> EffectiveConfig {
    let mut cfg = strict_config();
    cfg.checks
        .insert(check_id.to_string(), CheckPolicy::enabled(severity));
    cfg
}

pub fn path(p: &str) -> HostPath {
    HostPath::new(p)
}
