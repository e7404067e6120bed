use crate::policy::ServiceFallback;
use hostguard_types::{HostPath, Severity, ids};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A suite: named checks aimed at one inventory group.
#[derive(Clone, Debug, PartialEq)]
pub struct Suite {
    pub name: String,
    /// Inventory group whose hosts this suite runs against.
    pub group: String,
    pub checks: Vec<Check>,
}

/// A named predicate plus per-check settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Check {
    pub name: String,
    pub predicate: Predicate,
    /// Overrides the severity from the check policy.
    pub severity: Option<Severity>,
    /// Overrides the configured service fallback for this check.
    pub fallback: Option<ServiceFallback>,
    /// Hostname substrings; when non-empty the check only runs on matching hosts.
    pub only_hosts: Vec<String>,
}

impl Check {
    pub fn applies_to(&self, host: &str) -> bool {
        self.only_hosts.is_empty() || self.only_hosts.iter().any(|s| host.contains(s.as_str()))
    }
}

/// One declarative host-state expectation.
///
/// The set is closed: adding a kind means adding a variant here and an arm in
/// [`crate::checks::evaluate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Predicate {
    PackageInstalled {
        package: String,
    },
    ServiceState {
        service: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        running: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enabled: Option<bool>,
    },
    FileExists {
        path: HostPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_type: Option<FileType>,
    },
    FileContains {
        path: HostPath,
        substring: String,
    },
    FileMode {
        path: HostPath,
        mode: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mask: Option<u32>,
    },
    CommandResult {
        command: String,
        #[serde(default)]
        exit_code: ExitExpectation,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        stdout: Vec<OutputMatcher>,
    },
    SocketListening {
        address: SocketAddress,
    },
    GroupExists {
        group: String,
    },
    UserInGroup {
        user: String,
        group: String,
    },
}

impl Predicate {
    /// Stable check id for this predicate kind.
    pub fn check_id(&self) -> &'static str {
        match self {
            Predicate::PackageInstalled { .. } => ids::CHECK_PACKAGE_INSTALLED,
            Predicate::ServiceState { .. } => ids::CHECK_SERVICE_STATE,
            Predicate::FileExists { .. } => ids::CHECK_FILE_EXISTS,
            Predicate::FileContains { .. } => ids::CHECK_FILE_CONTAINS,
            Predicate::FileMode { .. } => ids::CHECK_FILE_MODE,
            Predicate::CommandResult { .. } => ids::CHECK_COMMAND_RESULT,
            Predicate::SocketListening { .. } => ids::CHECK_SOCKET_LISTENING,
            Predicate::GroupExists { .. } => ids::CHECK_GROUP_EXISTS,
            Predicate::UserInGroup { .. } => ids::CHECK_USER_IN_GROUP,
        }
    }

    /// Check the input constraints of the predicate kind.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Predicate::PackageInstalled { package } => non_empty("package", package),
            Predicate::ServiceState {
                service,
                running,
                enabled,
            } => {
                non_empty("service", service)?;
                if running.is_none() && enabled.is_none() {
                    return Err(ValidationError::new(
                        "running",
                        "at least one of `running` or `enabled` must be set",
                    ));
                }
                Ok(())
            }
            Predicate::FileExists { path, .. } => absolute("path", path),
            Predicate::FileContains { path, substring } => {
                absolute("path", path)?;
                non_empty("substring", substring)
            }
            Predicate::FileMode { path, mode, mask } => {
                absolute("path", path)?;
                if *mode > 0o7777 {
                    return Err(ValidationError::new(
                        "mode",
                        format!("mode {mode:o} exceeds 7777"),
                    ));
                }
                if mask.is_some_and(|m| m > 0o7777) {
                    return Err(ValidationError::new("mask", "mask exceeds 7777"));
                }
                Ok(())
            }
            Predicate::CommandResult { command, .. } => non_empty("command", command),
            // Addresses are validated when parsed.
            Predicate::SocketListening { .. } => Ok(()),
            Predicate::GroupExists { group } => non_empty("group", group),
            Predicate::UserInGroup { user, group } => {
                non_empty("user", user)?;
                non_empty("group", group)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{field}`: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

fn absolute(field: &'static str, path: &HostPath) -> Result<(), ValidationError> {
    if !path.is_absolute() {
        return Err(ValidationError::new(
            field,
            format!("path must be absolute: {path}"),
        ));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    File,
    Directory,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::File => f.write_str("regular file"),
            FileType::Directory => f.write_str("directory"),
        }
    }
}

/// Expected exit status of a command: an exact code, or any non-zero code.
///
/// In suites: `exit_code = 0` or `exit_code = "nonzero"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitExpectation {
    Code(i32),
    NonZero,
}

impl Default for ExitExpectation {
    fn default() -> Self {
        ExitExpectation::Code(0)
    }
}

impl ExitExpectation {
    pub fn matches(&self, exit_code: i32) -> bool {
        match self {
            ExitExpectation::Code(expected) => *expected == exit_code,
            ExitExpectation::NonZero => exit_code != 0,
        }
    }
}

impl fmt::Display for ExitExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitExpectation::Code(c) => write!(f, "{c}"),
            ExitExpectation::NonZero => f.write_str("non-zero"),
        }
    }
}

impl Serialize for ExitExpectation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExitExpectation::Code(c) => serializer.serialize_i32(*c),
            ExitExpectation::NonZero => serializer.serialize_str("nonzero"),
        }
    }
}

impl<'de> Deserialize<'de> for ExitExpectation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExitVisitor;

        impl Visitor<'_> for ExitVisitor {
            type Value = ExitExpectation;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an exit code integer or \"nonzero\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                i32::try_from(v)
                    .map(ExitExpectation::Code)
                    .map_err(|_| E::custom(format!("exit code out of range: {v}")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i32::try_from(v)
                    .map(ExitExpectation::Code)
                    .map_err(|_| E::custom(format!("exit code out of range: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                match v {
                    "nonzero" | "non-zero" | "non_zero" => Ok(ExitExpectation::NonZero),
                    other => other
                        .parse::<i32>()
                        .map(ExitExpectation::Code)
                        .map_err(|_| E::custom(format!("unknown exit expectation: {other}"))),
                }
            }
        }

        deserializer.deserialize_any(ExitVisitor)
    }
}

/// A property of a command's stdout.
///
/// `Equals`, `OneOf`, `NotEmpty` and `IntAtLeast` look at the trimmed output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMatcher {
    Contains(String),
    Equals(String),
    OneOf(Vec<String>),
    ContainsAny(Vec<String>),
    NotEmpty,
    MinLines(usize),
    IntAtLeast(i64),
}

impl OutputMatcher {
    pub fn matches(&self, stdout: &str) -> bool {
        let trimmed = stdout.trim();
        match self {
            OutputMatcher::Contains(s) => stdout.contains(s.as_str()),
            OutputMatcher::Equals(s) => trimmed == s,
            OutputMatcher::OneOf(options) => options.iter().any(|s| trimmed == s),
            OutputMatcher::ContainsAny(options) => {
                options.iter().any(|s| stdout.contains(s.as_str()))
            }
            OutputMatcher::NotEmpty => !trimmed.is_empty(),
            OutputMatcher::MinLines(n) => trimmed.lines().count() >= *n,
            OutputMatcher::IntAtLeast(n) => trimmed.parse::<i64>().is_ok_and(|v| v >= *n),
        }
    }
}

impl fmt::Display for OutputMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMatcher::Contains(s) => write!(f, "contains {s:?}"),
            OutputMatcher::Equals(s) => write!(f, "equals {s:?}"),
            OutputMatcher::OneOf(v) => write!(f, "is one of {v:?}"),
            OutputMatcher::ContainsAny(v) => write!(f, "contains any of {v:?}"),
            OutputMatcher::NotEmpty => f.write_str("is not empty"),
            OutputMatcher::MinLines(n) => write!(f, "has at least {n} lines"),
            OutputMatcher::IntAtLeast(n) => write!(f, "is an integer >= {n}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InetProtocol {
    Tcp,
    Udp,
}

/// Address of a socket expected to be listening.
///
/// Accepted forms: `tcp://host:port`, `udp://host:port`, `unix:///path`, or a bare
/// `host:port` (TCP). IPv6 hosts are bracketed: `tcp://[::]:2377`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketAddress {
    Inet {
        protocol: InetProtocol,
        host: String,
        port: u16,
    },
    Unix {
        path: String,
    },
}

impl SocketAddress {
    /// Whether a listener bound to `listener_host:listener_port` satisfies this address.
    ///
    /// A wildcard listener satisfies any host on the same port. A wildcard request is
    /// only satisfied by a wildcard listener.
    pub fn matches_inet_listener(&self, listener_host: &str, listener_port: u16) -> bool {
        let SocketAddress::Inet { host, port, .. } = self else {
            return false;
        };
        if *port != listener_port {
            return false;
        }
        let listener = normalize_host(listener_host);
        is_wildcard(listener) || listener == normalize_host(host)
    }

    pub fn matches_unix_listener(&self, listener_path: &str) -> bool {
        matches!(self, SocketAddress::Unix { path } if run_dir_alias(path) == run_dir_alias(listener_path))
    }
}

/// `/var/run` is a symlink to `/run` on every systemd host; `ss` reports the target.
fn run_dir_alias(path: &str) -> &str {
    path.strip_prefix("/var").filter(|p| p.starts_with("/run/")).unwrap_or(path)
}

fn normalize_host(host: &str) -> &str {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    // Interface-scoped addresses (`127.0.0.53%lo`).
    host.split('%').next().unwrap_or(host)
}

fn is_wildcard(host: &str) -> bool {
    matches!(host, "" | "*" | "0.0.0.0" | "::")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid socket address `{input}`: {reason}")]
pub struct AddressError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for SocketAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| AddressError {
            input: s.to_string(),
            reason,
        };
        let s_trim = s.trim();

        if let Some(path) = s_trim.strip_prefix("unix://") {
            if !path.starts_with('/') {
                return Err(err("unix socket path must be absolute"));
            }
            return Ok(SocketAddress::Unix {
                path: path.to_string(),
            });
        }

        let (protocol, rest) = if let Some(rest) = s_trim.strip_prefix("tcp://") {
            (InetProtocol::Tcp, rest)
        } else if let Some(rest) = s_trim.strip_prefix("udp://") {
            (InetProtocol::Udp, rest)
        } else if s_trim.contains("://") {
            return Err(err("unknown scheme (expected tcp, udp or unix)"));
        } else {
            (InetProtocol::Tcp, s_trim)
        };

        let (host, port) = rest.rsplit_once(':').ok_or_else(|| err("expected host:port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(err("host must not be empty"));
        }
        let port = port.parse::<u16>().map_err(|_| err("port must be 0-65535"))?;

        Ok(SocketAddress::Inet {
            protocol,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketAddress::Unix { path } => write!(f, "unix://{path}"),
            SocketAddress::Inet {
                protocol,
                host,
                port,
            } => {
                let scheme = match protocol {
                    InetProtocol::Tcp => "tcp",
                    InetProtocol::Udp => "udp",
                };
                if host.contains(':') {
                    write!(f, "{scheme}://[{host}]:{port}")
                } else {
                    write!(f, "{scheme}://{host}:{port}")
                }
            }
        }
    }
}

impl Serialize for SocketAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SocketAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
