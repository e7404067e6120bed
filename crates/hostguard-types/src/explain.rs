//! Explain registry for checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and how it queries the host.
    pub description: &'static str,
    /// How to fix failures.
    pub remediation: &'static str,
    /// Check ids that report this code; empty for check ids themselves.
    pub raised_by: &'static [&'static str],
    /// A suite `[[check]]` entry using the check, or one that can report the code.
    pub suite_example: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Check IDs
        ids::CHECK_PACKAGE_INSTALLED => Some(explain_package_installed()),
        ids::CHECK_SERVICE_STATE => Some(explain_service_state()),
        ids::CHECK_FILE_EXISTS => Some(explain_file_exists()),
        ids::CHECK_FILE_CONTAINS => Some(explain_file_contains()),
        ids::CHECK_FILE_MODE => Some(explain_file_mode()),
        ids::CHECK_COMMAND_RESULT => Some(explain_command_result()),
        ids::CHECK_SOCKET_LISTENING => Some(explain_socket_listening()),
        ids::CHECK_GROUP_EXISTS => Some(explain_group_exists()),
        ids::CHECK_USER_IN_GROUP => Some(explain_user_in_group()),

        // Codes
        ids::CODE_NOT_INSTALLED => Some(explain_not_installed()),
        ids::CODE_RUNNING_MISMATCH => Some(explain_running_mismatch()),
        ids::CODE_ENABLED_MISMATCH => Some(explain_enabled_mismatch()),
        ids::CODE_FILE_MISSING => Some(explain_file_missing()),
        ids::CODE_FILE_TYPE_MISMATCH => Some(explain_file_type_mismatch()),
        ids::CODE_SUBSTRING_MISSING => Some(explain_substring_missing()),
        ids::CODE_MODE_MISMATCH => Some(explain_mode_mismatch()),
        ids::CODE_EXIT_CODE_MISMATCH => Some(explain_exit_code_mismatch()),
        ids::CODE_STDOUT_MISMATCH => Some(explain_stdout_mismatch()),
        ids::CODE_NOT_LISTENING => Some(explain_not_listening()),
        ids::CODE_GROUP_MISSING => Some(explain_group_missing()),
        ids::CODE_USER_MISSING => Some(explain_user_missing()),
        ids::CODE_USER_NOT_IN_GROUP => Some(explain_user_not_in_group()),
        ids::CODE_TRANSPORT_FAILURE => Some(explain_transport_failure()),

        _ => None,
    }
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    ids::ALL_CHECK_IDS
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_NOT_INSTALLED,
        ids::CODE_RUNNING_MISMATCH,
        ids::CODE_ENABLED_MISMATCH,
        ids::CODE_FILE_MISSING,
        ids::CODE_FILE_TYPE_MISMATCH,
        ids::CODE_SUBSTRING_MISSING,
        ids::CODE_MODE_MISMATCH,
        ids::CODE_EXIT_CODE_MISMATCH,
        ids::CODE_STDOUT_MISMATCH,
        ids::CODE_NOT_LISTENING,
        ids::CODE_GROUP_MISSING,
        ids::CODE_USER_MISSING,
        ids::CODE_USER_NOT_IN_GROUP,
        ids::CODE_TRANSPORT_FAILURE,
    ]
}

// --- Check-level explanations ---

fn explain_package_installed() -> Explanation {
    Explanation {
        title: "Package Installed",
        description: "\
Asserts that the host's package manager reports a package as installed.

The first package manager found on the host answers the query:
- dpkg (`dpkg-query -W -f '${Status}'`, status must be `install ok installed`)
- rpm (`rpm -q`)
- apk (`apk info -e`)",
        remediation: "\
Make sure the role installs the package under exactly this name. Distribution
package names differ (`docker-ce` from the Docker repository vs. `docker.io`
from Debian).",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "docker_installed"
kind = "package_installed"
package = "docker-ce""#,
    }
}

fn explain_service_state() -> Explanation {
    Explanation {
        title: "Service State",
        description: "\
Asserts that a service is running and/or enabled at boot. Only the flags set in
the check are compared.

On systemd hosts the check uses `systemctl is-active` and `systemctl is-enabled`.
Other hosts fall back to `service <name> status` and `/etc/rc?.d` links.

When the service has no unit file and the effective fallback is `degrade`, an
`enabled = true` expectation is answered by \"the systemctl binary exists\"
instead. The result is marked degraded and a warning is logged.",
        remediation: "\
Start and enable the service in the role (`state: started`, `enabled: true`).
In containers without an init system, either run the suite with the
`container` profile or set `fallback = \"degrade\"` on the check.",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "docker_service"
kind = "service_state"
service = "docker"
enabled = true
fallback = "degrade""#,
    }
}

fn explain_file_exists() -> Explanation {
    Explanation {
        title: "File Exists",
        description: "\
Asserts that a path exists on the host (following symlinks), optionally
requiring it to be a regular file or a directory.",
        remediation: "\
Create the path in the role, or fix the path in the check. Paths must be
absolute.",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "venv_dir"
kind = "file_exists"
path = "/opt/ansible-venv"
file_type = "directory""#,
    }
}

fn explain_file_contains() -> Explanation {
    Explanation {
        title: "File Contains",
        description: "\
Asserts that a file exists and that its content contains a literal substring.
A missing file and a missing substring are reported with different codes.",
        remediation: "\
Template or line-edit the file in the role so the expected text is present.",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "ntp_configured"
kind = "file_contains"
path = "/etc/systemd/timesyncd.conf"
substring = "NTP=0.pool.ntp.org""#,
    }
}

fn explain_file_mode() -> Explanation {
    Explanation {
        title: "File Mode",
        description: "\
Asserts the permission bits of a path. Without a mask all bits must equal the
expected mode. With a mask only the masked bits are compared, so `mode = 0o044`
with `mask = 0o044` means \"readable by group and others\".",
        remediation: "\
Set `mode` explicitly in the role's file/copy task.",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "keyrings_dir"
kind = "file_mode"
path = "/etc/apt/keyrings"
mode = 0o755"#,
    }
}

fn explain_command_result() -> Explanation {
    Explanation {
        title: "Command Result",
        description: "\
Runs a non-interactive shell command on the host and asserts its exit status
and, optionally, properties of its stdout.

A wrong exit status always fails the check, whatever stdout contains. Stdout
matchers are only evaluated once the exit status matches.",
        remediation: "\
Run the command on the host by hand and compare with the expectation. Captured
stdout and stderr are included in the result data.",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "swarm_active"
kind = "command_result"
command = "docker info --format '{{.Swarm.LocalNodeState}}'"
stdout = [{ equals = "active" }]"#,
    }
}

fn explain_socket_listening() -> Explanation {
    Explanation {
        title: "Socket Listening",
        description: "\
Asserts that a TCP/UDP port or a unix socket is in the listening state,
according to `ss`. A listener bound to a wildcard address (`0.0.0.0`, `*`,
`[::]`) satisfies a check for any host address on the same port.",
        remediation: "\
Make sure the service that owns the socket is running on this host. For Docker
Swarm, port 2377 only listens on manager nodes.",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "swarm_port"
kind = "socket_listening"
address = "tcp://0.0.0.0:2377""#,
    }
}

fn explain_group_exists() -> Explanation {
    Explanation {
        title: "Group Exists",
        description: "\
Asserts that a group is known to the host's name service (`getent group`).",
        remediation: "\
Create the group in the role, or install the package that creates it.",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "docker_group"
kind = "group_exists"
group = "docker""#,
    }
}

fn explain_user_in_group() -> Explanation {
    Explanation {
        title: "User In Group",
        description: "\
Asserts that a user exists and that the group is among its groups (`id -Gn`).",
        remediation: "\
Add the user to the group in the role (`groups: docker`, `append: true`).",
        raised_by: &[],
        suite_example: r#"[[check]]
name = "root_in_docker"
kind = "user_in_group"
user = "root"
group = "docker""#,
    }
}

// --- Code-level explanations ---

const FILE_CHECKS: &[&str] = &[
    ids::CHECK_FILE_EXISTS,
    ids::CHECK_FILE_CONTAINS,
    ids::CHECK_FILE_MODE,
];

fn explain_not_installed() -> Explanation {
    Explanation {
        title: "Package Not Installed",
        description: "The package manager does not report the package as installed.",
        remediation: "\
Install the package in the role (`apt: name=docker-ce state=present`), or check
the package name.",
        raised_by: &[ids::CHECK_PACKAGE_INSTALLED],
        suite_example: r#"[[check]]
name = "docker_installed"
kind = "package_installed"
package = "docker-ce""#,
    }
}

fn explain_running_mismatch() -> Explanation {
    Explanation {
        title: "Service Running Mismatch",
        description: "The service's running state differs from the expected value.",
        remediation: "\
Start (or stop) the service in the role. In containers without an init system,
services cannot run; drop the `running` expectation for container runs.",
        raised_by: &[ids::CHECK_SERVICE_STATE],
        suite_example: r#"[[check]]
name = "docker_running"
kind = "service_state"
service = "docker"
running = true"#,
    }
}

fn explain_enabled_mismatch() -> Explanation {
    Explanation {
        title: "Service Enabled Mismatch",
        description: "\
The service's boot enablement differs from the expected value. Under the
`strict` fallback, a service without a unit file is never enabled.",
        remediation: "\
Enable the service in the role, or use `fallback = \"degrade\"` for container
runs where no unit file exists.",
        raised_by: &[ids::CHECK_SERVICE_STATE],
        suite_example: r#"[[check]]
name = "containerd_enabled"
kind = "service_state"
service = "containerd"
enabled = true
fallback = "degrade""#,
    }
}

fn explain_file_missing() -> Explanation {
    Explanation {
        title: "File Missing",
        description: "The path does not exist on the host.",
        remediation: "\
Create the file or directory in the role
(`file: path=/etc/apt/keyrings state=directory mode=0755`).",
        raised_by: FILE_CHECKS,
        suite_example: r#"[[check]]
name = "keyrings_dir"
kind = "file_exists"
path = "/etc/apt/keyrings""#,
    }
}

fn explain_file_type_mismatch() -> Explanation {
    Explanation {
        title: "File Type Mismatch",
        description: "The path exists but is not of the requested type (file or directory).",
        remediation: "Fix the path in the check, or the task that creates it.",
        raised_by: &[ids::CHECK_FILE_EXISTS],
        suite_example: r#"[[check]]
name = "venv_dir"
kind = "file_exists"
path = "/opt/ansible-venv"
file_type = "directory""#,
    }
}

fn explain_substring_missing() -> Explanation {
    Explanation {
        title: "Substring Missing",
        description: "The file exists but does not contain the expected text.",
        remediation: "Update the template or lineinfile task that writes the file.",
        raised_by: &[ids::CHECK_FILE_CONTAINS],
        suite_example: r#"[[check]]
name = "ntp_configured"
kind = "file_contains"
path = "/etc/systemd/timesyncd.conf"
substring = "NTP=0.pool.ntp.org""#,
    }
}

fn explain_mode_mismatch() -> Explanation {
    Explanation {
        title: "Mode Mismatch",
        description: "The path's permission bits do not match the expected mode.",
        remediation: "Set `mode` explicitly in the task that creates the path.",
        raised_by: &[ids::CHECK_FILE_MODE],
        suite_example: r#"[[check]]
name = "gpg_key_readable"
kind = "file_mode"
path = "/etc/apt/keyrings/docker.asc"
mode = 0o044
mask = 0o044"#,
    }
}

fn explain_exit_code_mismatch() -> Explanation {
    Explanation {
        title: "Exit Code Mismatch",
        description: "\
The command exited with a different status than expected. Exit status 127
usually means the command is not installed on the host.",
        remediation: "\
Inspect the captured stderr in the result data. Commands that must fail take
`exit_code = \"nonzero\"`.",
        raised_by: &[ids::CHECK_COMMAND_RESULT],
        suite_example: r#"[[check]]
name = "worker_cannot_list_nodes"
kind = "command_result"
command = "docker node ls"
exit_code = "nonzero""#,
    }
}

fn explain_stdout_mismatch() -> Explanation {
    Explanation {
        title: "Stdout Mismatch",
        description: "The command exited as expected but its stdout did not satisfy a matcher.",
        remediation: "Compare the captured stdout in the result data with the matcher.",
        raised_by: &[ids::CHECK_COMMAND_RESULT],
        suite_example: r#"[[check]]
name = "manager_status"
kind = "command_result"
command = "docker node ls --format '{{.ManagerStatus}}'"
stdout = [{ contains_any = ["Leader", "Reachable"] }]"#,
    }
}

fn explain_not_listening() -> Explanation {
    Explanation {
        title: "Not Listening",
        description: "No listener matches the requested address.",
        remediation: "\
Start the owning service, or move the check to a suite whose `hosts` group only
holds the hosts that run it.",
        raised_by: &[ids::CHECK_SOCKET_LISTENING],
        suite_example: r#"[[check]]
name = "swarm_port"
kind = "socket_listening"
address = "tcp://0.0.0.0:2377"
only_hosts = ["manager"]"#,
    }
}

fn explain_group_missing() -> Explanation {
    Explanation {
        title: "Group Missing",
        description: "The group is unknown to the host.",
        remediation: "Create the group in the role (`group: name=docker state=present`).",
        raised_by: &[ids::CHECK_GROUP_EXISTS],
        suite_example: r#"[[check]]
name = "docker_group"
kind = "group_exists"
group = "docker""#,
    }
}

fn explain_user_missing() -> Explanation {
    Explanation {
        title: "User Missing",
        description: "The user is unknown to the host.",
        remediation: "Create the user in the role, or fix the user name.",
        raised_by: &[ids::CHECK_USER_IN_GROUP],
        suite_example: r#"[[check]]
name = "deploy_in_docker"
kind = "user_in_group"
user = "deploy"
group = "docker""#,
    }
}

fn explain_user_not_in_group() -> Explanation {
    Explanation {
        title: "User Not In Group",
        description: "The user exists but the group is not among its groups.",
        remediation: "Add the group to the user with `groups: docker` and `append: true`.",
        raised_by: &[ids::CHECK_USER_IN_GROUP],
        suite_example: r#"[[check]]
name = "root_in_docker"
kind = "user_in_group"
user = "root"
group = "docker""#,
    }
}

fn explain_transport_failure() -> Explanation {
    Explanation {
        title: "Transport Failure",
        description: "\
The host could not be queried: the connection failed, the query tool is
missing on the host, or its output could not be understood. The check's
expectation was never evaluated.",
        remediation: "\
Check connectivity (`hostguard hosts`, then ssh/docker exec by hand) and that
the host has the query tooling (`ss`, `stat`, `getent`, a package manager).",
        raised_by: ids::ALL_CHECK_IDS,
        suite_example: r#"[[check]]
name = "docker_socket"
kind = "socket_listening"
address = "unix:///var/run/docker.sock""#,
    }
}
