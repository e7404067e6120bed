//! Pure parsers for the output of host query scripts.

use hostguard_domain::target::{FileStat, ServiceStatus};

/// Output of the package probe: the manager name on the first line, then its answer.
pub fn parse_package_status(stdout: &str) -> Result<bool, String> {
    let mut lines = stdout.lines();
    let manager = lines.next().map(str::trim).unwrap_or_default();
    let rest: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
    match manager {
        // `${Status}` is `want flag status`; removed packages end in `config-files`.
        "dpkg" => Ok(rest
            .iter()
            .any(|l| l.split_whitespace().last() == Some("installed"))),
        "rpm" | "apk" => Ok(rest.contains(&"installed")),
        other => Err(format!("unknown package manager marker `{other}`")),
    }
}

/// `key=value` lines from the service probe.
pub fn parse_service_status(stdout: &str) -> Result<ServiceStatus, String> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let init = lines.next().unwrap_or_default();
    if init != "systemd" && init != "sysv" {
        return Err(format!("unknown init system marker `{init}`"));
    }

    let mut active = "";
    let mut enabled = "";
    let mut unit_file = false;
    for line in lines {
        match line.split_once('=') {
            Some(("active", v)) => active = v,
            Some(("enabled", v)) => enabled = v,
            Some(("unit", "present")) => unit_file = true,
            _ => {}
        }
    }

    let running = matches!(active, "active" | "reloading");
    let enabled_state = matches!(
        enabled,
        "enabled" | "enabled-runtime" | "static" | "alias" | "indirect" | "generated"
    );
    // systemd knows generated and transient units that have no file on disk.
    let known_to_init = init == "systemd" && !matches!(enabled, "" | "not-found");

    Ok(ServiceStatus {
        running,
        enabled: enabled_state,
        unit_present: unit_file || known_to_init,
    })
}

/// `stat -L -c '%F|%a'`, or the literal `missing`.
pub fn parse_stat(stdout: &str) -> Result<FileStat, String> {
    let line = stdout.trim();
    if line == "missing" {
        return Ok(FileStat::missing());
    }
    let (kind, mode) = line
        .rsplit_once('|')
        .ok_or_else(|| format!("expected `type|mode`, got `{line}`"))?;
    let mode =
        u32::from_str_radix(mode, 8).map_err(|_| format!("invalid octal mode `{mode}`"))?;

    Ok(FileStat {
        exists: true,
        is_directory: kind == "directory",
        is_file: kind.starts_with("regular"),
        mode: Some(mode),
    })
}

/// Local `host:port` endpoints from `ss -H -l{t,u}n`.
///
/// The state (and, on some versions, netid) columns are skipped by locating the
/// two numeric queue columns; the local address follows them.
pub fn parse_inet_listeners(stdout: &str) -> Vec<(String, u16)> {
    stdout
        .lines()
        .filter_map(local_column)
        .filter_map(|local| {
            let (host, port) = local.rsplit_once(':')?;
            let port = port.parse::<u16>().ok()?;
            Some((host.to_string(), port))
        })
        .collect()
}

/// Socket paths from `ss -H -lxn`.
pub fn parse_unix_listeners(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(local_column)
        .filter(|local| local.starts_with('/'))
        .map(str::to_string)
        .collect()
}

fn local_column(line: &str) -> Option<&str> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let queues = tokens.windows(2).position(|w| {
        w[0].parse::<u64>().is_ok() && w[1].parse::<u64>().is_ok()
    })?;
    tokens.get(queues + 2).copied()
}

/// Group names from `id -Gn`.
pub fn parse_id_groups(stdout: &str) -> Vec<String> {
    stdout.split_whitespace().map(str::to_string).collect()
}
