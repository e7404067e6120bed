use crate::model::Predicate;
use crate::outcome::Outcome;
use crate::policy::ServiceFallback;
use crate::target::Target;

mod command;
mod file;
mod group;
mod package;
mod service;
mod socket;
mod utils;


/// Per-evaluation settings resolved by the engine.
#[derive(Clone, Copy, Debug)]
pub struct EvalContext<'a> {
    /// Check name, for logging.
    pub check: &'a str,
    pub fallback: ServiceFallback,
    pub max_output_bytes: usize,
}

/// Evaluate one predicate against one host.
///
/// Transport errors never escape: they become a failed outcome of kind `transport`.
pub fn evaluate(predicate: &Predicate, target: &dyn Target, ctx: &EvalContext<'_>) -> Outcome {
    let result = match predicate {
        Predicate::PackageInstalled { package } => package::run(target, package),
        Predicate::ServiceState {
            service,
            running,
            enabled,
        } => service::run(target, ctx, service, *running, *enabled),
        Predicate::FileExists { path, file_type } => file::run_exists(target, path, *file_type),
        Predicate::FileContains { path, substring } => {
            file::run_contains(target, path, substring)
        }
        Predicate::FileMode { path, mode, mask } => file::run_mode(target, path, *mode, *mask),
        Predicate::CommandResult {
            command,
            exit_code,
            stdout,
        } => command::run(target, ctx, command, *exit_code, stdout),
        Predicate::SocketListening { address } => socket::run(target, address),
        Predicate::GroupExists { group } => group::run_exists(target, group),
        Predicate::UserInGroup { user, group } => group::run_membership(target, user, group),
    };

    result.unwrap_or_else(|err| {
        tracing::warn!(
            host = target.name(),
            check = ctx.check,
            error = %err,
            "transport failure"
        );
        Outcome::transport(&err)
    })
}
