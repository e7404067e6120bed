use crate::connection::Connection;
use crate::parse;
use crate::quote::shell_quote;
use hostguard_domain::model::{InetProtocol, SocketAddress};
use hostguard_domain::target::{
    CommandOutput, FileStat, ServiceStatus, Target, TransportError,
};
use hostguard_types::HostPath;

/// Exit status a shell uses for "command not found".
const EXIT_NOT_FOUND: i32 = 127;
/// Exit status ssh uses for its own failures.
const EXIT_SSH_ERROR: i32 = 255;

const SYSTEMD_UNIT_DIRS: [&str; 4] = [
    "/etc/systemd/system",
    "/run/systemd/system",
    "/lib/systemd/system",
    "/usr/lib/systemd/system",
];

/// A host reached by running POSIX shell snippets over a [`Connection`].
#[derive(Clone, Debug)]
pub struct ShellTarget {
    name: String,
    connection: Connection,
    unit_dirs: Vec<String>,
}

impl ShellTarget {
    pub fn new(name: impl Into<String>, connection: Connection) -> Self {
        Self {
            name: name.into(),
            connection,
            unit_dirs: SYSTEMD_UNIT_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Directories searched for systemd unit files.
    pub fn with_unit_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unit_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Run `script` and classify failures of the connection itself.
    fn exec(&self, script: &str) -> Result<CommandOutput, TransportError> {
        tracing::trace!(host = %self.name, connection = %self.connection, script, "exec");
        let output = self
            .connection
            .command(script)
            .output()
            .map_err(|source| TransportError::Spawn {
                program: self.connection.program().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let Some(exit_code) = output.status.code() else {
            return Err(TransportError::Terminated {
                query: script.to_string(),
            });
        };

        if let Some(detail) = self.connection_failure(exit_code, &stderr) {
            return Err(TransportError::Connection {
                host: self.name.clone(),
                detail,
            });
        }

        Ok(CommandOutput {
            exit_code,
            stdout,
            stderr,
        })
    }

    fn connection_failure(&self, exit_code: i32, stderr: &str) -> Option<String> {
        match &self.connection {
            Connection::Local => None,
            Connection::Ssh(_) => (exit_code == EXIT_SSH_ERROR).then(|| first_line(stderr)),
            Connection::Container { container, .. } => {
                if exit_code == 0 {
                    return None;
                }
                // `exec` passes the command's stderr through, so the engine is
                // asked directly whether the container is up.
                container_failure(container, stderr, || self.container_running())
            }
        }
    }

    fn container_running(&self) -> Result<bool, String> {
        let Some(mut inspect) = self.connection.inspect_command() else {
            return Ok(true);
        };
        let output = inspect
            .output()
            .map_err(|err| format!("{}: {err}", self.connection.program()))?;
        if !output.status.success() {
            return Err(first_line(&String::from_utf8_lossy(&output.stderr)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    /// Run a query script; 127 means the tooling it relies on is absent.
    fn query(&self, script: &str, tool: &str) -> Result<CommandOutput, TransportError> {
        let out = self.exec(script)?;
        if out.exit_code == EXIT_NOT_FOUND {
            return Err(TransportError::MissingTool {
                tool: tool.to_string(),
            });
        }
        Ok(out)
    }

    fn expect_success(&self, script: &str, tool: &str) -> Result<String, TransportError> {
        let out = self.query(script, tool)?;
        if out.exit_code != 0 {
            return Err(unexpected(script, &out));
        }
        Ok(out.stdout)
    }
}

fn first_line(stderr: &str) -> String {
    stderr.lines().next().unwrap_or_default().trim().to_string()
}

/// Decide whether a failed container exec failed to reach the container.
fn container_failure(
    container: &str,
    stderr: &str,
    running: impl FnOnce() -> Result<bool, String>,
) -> Option<String> {
    match running() {
        Ok(true) => None,
        Ok(false) => Some(format!("container `{container}` is not running")),
        Err(detail) if detail.is_empty() => Some(first_line(stderr)),
        Err(detail) => Some(detail),
    }
}

fn unexpected(script: &str, out: &CommandOutput) -> TransportError {
    TransportError::UnexpectedStatus {
        query: script.to_string(),
        code: out.exit_code,
        stderr: out.stderr.trim().to_string(),
    }
}

fn parse_error(script: &str, detail: String) -> TransportError {
    TransportError::Parse {
        query: script.to_string(),
        detail,
    }
}

impl Target for ShellTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.exec(command)
    }

    fn file(&self, path: &HostPath) -> Result<FileStat, TransportError> {
        let p = shell_quote(path.as_str());
        let script = format!("if [ -e {p} ]; then stat -L -c '%F|%a' {p}; else echo missing; fi");
        let stdout = self.expect_success(&script, "stat")?;
        parse::parse_stat(&stdout).map_err(|d| parse_error(&script, d))
    }

    fn read_file(&self, path: &HostPath) -> Result<String, TransportError> {
        let script = format!("cat {}", shell_quote(path.as_str()));
        self.expect_success(&script, "cat")
    }

    fn package_installed(&self, name: &str) -> Result<bool, TransportError> {
        let n = shell_quote(name);
        let script = format!(
            "if command -v dpkg-query >/dev/null 2>&1; then \
               echo dpkg; dpkg-query -W -f='${{Status}}\\n' {n} 2>/dev/null; \
             elif command -v rpm >/dev/null 2>&1; then \
               echo rpm; rpm -q {n} >/dev/null 2>&1 && echo installed; \
             elif command -v apk >/dev/null 2>&1; then \
               echo apk; apk info -e {n} >/dev/null 2>&1 && echo installed; \
             else exit 127; fi; exit 0"
        );
        let stdout = self.expect_success(&script, "dpkg-query, rpm or apk")?;
        parse::parse_package_status(&stdout).map_err(|d| parse_error(&script, d))
    }

    fn service(&self, name: &str) -> Result<ServiceStatus, TransportError> {
        let n = shell_quote(name);
        let dirs = self
            .unit_dirs
            .iter()
            .map(|d| shell_quote(d))
            .collect::<Vec<_>>()
            .join(" ");
        // The unit file lookup runs whether or not systemd is booted, so a
        // container with systemd installed still reports its units. Offline,
        // `systemctl is-enabled` reads the install symlinks directly.
        let script = format!(
            "unit=; \
             for d in {dirs}; do \
               if [ -e \"$d\"/{n}.service ] || [ -e \"$d\"/{n} ]; then unit=systemd; break; fi; \
             done; \
             if [ -z \"$unit\" ] && [ -e /etc/init.d/{n} ]; then unit=sysv; fi; \
             if [ -d /run/systemd/system ]; then \
               command -v systemctl >/dev/null 2>&1 || exit 127; \
               echo systemd; \
               echo \"active=$(systemctl is-active {n} 2>/dev/null)\"; \
               echo \"enabled=$(systemctl is-enabled {n} 2>/dev/null)\"; \
             else \
               echo sysv; \
               if service {n} status >/dev/null 2>&1; then echo active=active; else echo active=inactive; fi; \
               if [ \"$unit\" = systemd ] && command -v systemctl >/dev/null 2>&1; then \
                 echo \"enabled=$(systemctl is-enabled {n} 2>/dev/null)\"; \
               elif ls /etc/rc[2345].d/S??{n} >/dev/null 2>&1; then echo enabled=enabled; \
               else echo enabled=disabled; fi; \
             fi; \
             if [ -n \"$unit\" ]; then echo unit=present; fi; exit 0"
        );
        let stdout = self.expect_success(&script, "systemctl")?;
        parse::parse_service_status(&stdout).map_err(|d| parse_error(&script, d))
    }

    fn socket_listening(&self, address: &SocketAddress) -> Result<bool, TransportError> {
        let flags = match address {
            SocketAddress::Inet {
                protocol: InetProtocol::Tcp,
                ..
            } => "-H -ltn",
            SocketAddress::Inet {
                protocol: InetProtocol::Udp,
                ..
            } => "-H -lun",
            SocketAddress::Unix { .. } => "-H -lxn",
        };
        let script = format!("ss {flags}");
        let stdout = self.expect_success(&script, "ss")?;

        Ok(match address {
            SocketAddress::Inet { .. } => parse::parse_inet_listeners(&stdout)
                .iter()
                .any(|(host, port)| address.matches_inet_listener(host, *port)),
            SocketAddress::Unix { .. } => parse::parse_unix_listeners(&stdout)
                .iter()
                .any(|path| address.matches_unix_listener(path)),
        })
    }

    fn group_exists(&self, name: &str) -> Result<bool, TransportError> {
        let script = format!("getent group {}", shell_quote(name));
        let out = self.query(&script, "getent")?;
        match out.exit_code {
            0 => Ok(true),
            // getent: key not found
            2 => Ok(false),
            _ => Err(unexpected(&script, &out)),
        }
    }

    fn user_groups(&self, user: &str) -> Result<Option<Vec<String>>, TransportError> {
        let script = format!("id -Gn {}", shell_quote(user));
        let out = self.query(&script, "id")?;
        match out.exit_code {
            0 => Ok(Some(parse::parse_id_groups(&out.stdout))),
            // id: no such user
            1 => Ok(None),
            _ => Err(unexpected(&script, &out)),
        }
    }

    fn binary_exists(&self, name: &str) -> Result<bool, TransportError> {
        let script = format!("command -v {} >/dev/null 2>&1", shell_quote(name));
        Ok(self.exec(&script)?.exit_code == 0)
    }
}
