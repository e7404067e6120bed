use crate::outcome::Outcome;
use crate::target::{Target, TransportError};
use hostguard_types::ids;
use serde_json::json;

pub fn run(target: &dyn Target, package: &str) -> Result<Outcome, TransportError> {
    let installed = target.package_installed(package)?;
    let outcome = if installed {
        Outcome::pass(format!("package '{package}' is installed"))
    } else {
        Outcome::fail(
            ids::CODE_NOT_INSTALLED,
            format!("package '{package}' is not installed"),
        )
    };
    Ok(outcome.with_data(json!({ "package": package, "installed": installed })))
}
