use crate::quote::shell_quote;
use anyhow::Context;
use hostguard_inventory::{HostEntry, LOCALHOST};
use std::fmt;
use std::process::Command;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerEngine {
    Docker,
    Podman,
}

impl ContainerEngine {
    pub fn program(&self) -> &'static str {
        match self {
            ContainerEngine::Docker => "docker",
            ContainerEngine::Podman => "podman",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SshOptions {
    pub host: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<String>,
    pub connect_timeout_secs: u32,
}

/// How shell snippets reach a host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connection {
    Local,
    Container {
        engine: ContainerEngine,
        container: String,
        user: Option<String>,
    },
    Ssh(SshOptions),
}

impl Connection {
    /// Pick a connection from inventory vars.
    ///
    /// `ansible_connection` defaults to `ssh`, except for `localhost`.
    pub fn from_host(host: &HostEntry) -> anyhow::Result<Self> {
        let default = if host.name == LOCALHOST { "local" } else { "ssh" };
        let kind = host.var("ansible_connection").unwrap_or(default);
        let address = host.var("ansible_host").unwrap_or(&host.name).to_string();
        let user = host.var("ansible_user").map(str::to_string);

        let connection = match kind {
            "local" => Connection::Local,
            "docker" | "community.docker.docker" => Connection::Container {
                engine: ContainerEngine::Docker,
                container: address,
                user,
            },
            "podman" | "containers.podman.podman" => Connection::Container {
                engine: ContainerEngine::Podman,
                container: address,
                user,
            },
            "ssh" | "smart" | "paramiko" => {
                let port = host
                    .var("ansible_port")
                    .map(|p| p.parse::<u16>())
                    .transpose()
                    .with_context(|| format!("host `{}`: invalid ansible_port", host.name))?;
                Connection::Ssh(SshOptions {
                    host: address,
                    user,
                    port,
                    identity_file: host.var("ansible_ssh_private_key_file").map(str::to_string),
                    connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
                })
            }
            other => anyhow::bail!(
                "host `{}`: unsupported ansible_connection `{other}` (expected local|docker|podman|ssh)",
                host.name
            ),
        };
        Ok(connection)
    }

    /// Build the process that runs `script` on the host.
    pub fn command(&self, script: &str) -> Command {
        match self {
            Connection::Local => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(script);
                cmd
            }
            Connection::Container {
                engine,
                container,
                user,
            } => {
                let mut cmd = Command::new(engine.program());
                cmd.arg("exec");
                if let Some(user) = user {
                    cmd.arg("-u").arg(user);
                }
                cmd.arg(container).arg("sh").arg("-c").arg(script);
                cmd
            }
            Connection::Ssh(opts) => {
                let mut cmd = Command::new("ssh");
                cmd.arg("-o")
                    .arg("BatchMode=yes")
                    .arg("-o")
                    .arg(format!("ConnectTimeout={}", opts.connect_timeout_secs));
                if let Some(port) = opts.port {
                    cmd.arg("-p").arg(port.to_string());
                }
                if let Some(key) = &opts.identity_file {
                    cmd.arg("-i").arg(key);
                }
                match &opts.user {
                    Some(user) => cmd.arg(format!("{user}@{}", opts.host)),
                    None => cmd.arg(&opts.host),
                };
                // ssh joins remote arguments with spaces, so the script travels as one word.
                cmd.arg("--").arg(format!("sh -c {}", shell_quote(script)));
                cmd
            }
        }
    }

    /// Ask the container engine whether the container is running.
    ///
    /// Prints `true` or `false`; fails when the engine or the container is gone.
    pub fn inspect_command(&self) -> Option<Command> {
        let Connection::Container {
            engine, container, ..
        } = self
        else {
            return None;
        };
        let mut cmd = Command::new(engine.program());
        cmd.args(["inspect", "--type", "container", "--format", "{{.State.Running}}"])
            .arg(container);
        Some(cmd)
    }

    /// Program spawned locally, for error messages.
    pub fn program(&self) -> &'static str {
        match self {
            Connection::Local => "sh",
            Connection::Container { engine, .. } => engine.program(),
            Connection::Ssh(_) => "ssh",
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Local => f.write_str("local"),
            Connection::Container {
                engine,
                container,
                user,
            } => {
                write!(f, "{}:{container}", engine.program())?;
                if let Some(user) = user {
                    write!(f, " (user {user})")?;
                }
                Ok(())
            }
            Connection::Ssh(opts) => {
                f.write_str("ssh:")?;
                if let Some(user) = &opts.user {
                    write!(f, "{user}@")?;
                }
                f.write_str(&opts.host)?;
                if let Some(port) = opts.port {
                    write!(f, ":{port}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostguard_inventory::Vars;

    fn host(name: &str, vars: &[(&str, &str)]) -> HostEntry {
        HostEntry {
            name: name.to_string(),
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vars>(),
        }
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn localhost_defaults_to_local_and_others_to_ssh() {
        assert_eq!(
            Connection::from_host(&host("localhost", &[])).unwrap(),
            Connection::Local
        );
        let ssh = Connection::from_host(&host("worker-1", &[])).unwrap();
        assert!(matches!(ssh, Connection::Ssh(ref o) if o.host == "worker-1"));
    }

    #[test]
    fn docker_connection_uses_ansible_host_and_user() {
        let conn = Connection::from_host(&host(
            "manager-1",
            &[
                ("ansible_connection", "docker"),
                ("ansible_host", "swarm-manager-1"),
                ("ansible_user", "root"),
            ],
        ))
        .unwrap();
        let cmd = conn.command("true");
        assert_eq!(cmd.get_program(), "docker");
        assert_eq!(
            args(&cmd),
            vec!["exec", "-u", "root", "swarm-manager-1", "sh", "-c", "true"]
        );
        assert_eq!(conn.to_string(), "docker:swarm-manager-1 (user root)");

        let inspect = conn.inspect_command().unwrap();
        assert_eq!(inspect.get_program(), "docker");
        assert_eq!(
            args(&inspect),
            vec![
                "inspect",
                "--type",
                "container",
                "--format",
                "{{.State.Running}}",
                "swarm-manager-1"
            ]
        );
        assert!(Connection::Local.inspect_command().is_none());
    }

    #[test]
    fn ssh_command_carries_options_and_quoted_script() {
        let conn = Connection::from_host(&host(
            "worker-1",
            &[
                ("ansible_host", "10.0.0.5"),
                ("ansible_user", "ops"),
                ("ansible_port", "2222"),
                ("ansible_ssh_private_key_file", "/keys/id"),
            ],
        ))
        .unwrap();
        let cmd = conn.command("echo 'hi'");
        assert_eq!(cmd.get_program(), "ssh");
        assert_eq!(
            args(&cmd),
            vec![
                "-o",
                "BatchMode=yes",
                "-o",
                "ConnectTimeout=10",
                "-p",
                "2222",
                "-i",
                "/keys/id",
                "ops@10.0.0.5",
                "--",
                "sh -c 'echo '\\''hi'\\'''",
            ]
        );
        assert_eq!(conn.to_string(), "ssh:ops@10.0.0.5:2222");
    }

    #[test]
    fn rejects_unknown_connection_and_bad_port() {
        assert!(Connection::from_host(&host("h", &[("ansible_connection", "winrm")])).is_err());
        assert!(Connection::from_host(&host("h", &[("ansible_port", "ssh")])).is_err());
    }
}
