//! The boundary between the engine and a machine under test.

use crate::model::SocketAddress;
use hostguard_types::HostPath;
use thiserror::Error;

/// A query against the host could not be performed.
///
/// This is distinct from a false expectation: the question was never answered.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {host} failed: {detail}")]
    Connection { host: String, detail: String },

    #[error("`{tool}` is not available on the host")]
    MissingTool { tool: String },

    #[error("`{query}` exited with status {code}: {stderr}")]
    UnexpectedStatus {
        query: String,
        code: i32,
        stderr: String,
    },

    #[error("could not parse output of `{query}`: {detail}")]
    Parse { query: String, detail: String },

    #[error("`{query}` was terminated by a signal")]
    Terminated { query: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStat {
    pub exists: bool,
    pub is_directory: bool,
    pub is_file: bool,
    /// Permission bits (`0o7777` range), when the path exists.
    pub mode: Option<u32>,
}

impl FileStat {
    pub fn missing() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceStatus {
    pub running: bool,
    pub enabled: bool,
    /// Whether the init system has a unit (or init script) for the service at all.
    pub unit_present: bool,
}

/// A reachable machine.
///
/// Every method is a read-only query. Implementations must not cache answers
/// across calls: a check reflects host state at the instant it runs.
pub trait Target {
    /// Inventory name of the host.
    fn name(&self) -> &str;

    /// Run a non-interactive shell command.
    fn run(&self, command: &str) -> Result<CommandOutput, TransportError>;

    fn file(&self, path: &HostPath) -> Result<FileStat, TransportError>;

    /// Read a file's contents; only called after [`Target::file`] reported it exists.
    fn read_file(&self, path: &HostPath) -> Result<String, TransportError>;

    fn package_installed(&self, name: &str) -> Result<bool, TransportError>;

    fn service(&self, name: &str) -> Result<ServiceStatus, TransportError>;

    fn socket_listening(&self, address: &SocketAddress) -> Result<bool, TransportError>;

    fn group_exists(&self, name: &str) -> Result<bool, TransportError>;

    /// Group names of `user`, or `None` when the user does not exist.
    fn user_groups(&self, user: &str) -> Result<Option<Vec<String>>, TransportError>;

    /// Whether an executable is on the host's `PATH`.
    fn binary_exists(&self, name: &str) -> Result<bool, TransportError>;
}
