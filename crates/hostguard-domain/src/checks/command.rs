use super::EvalContext;
use super::utils::truncate_output;
use crate::model::{ExitExpectation, OutputMatcher};
use crate::outcome::Outcome;
use crate::target::{Target, TransportError};
use hostguard_types::ids;
use serde_json::json;

pub fn run(
    target: &dyn Target,
    ctx: &EvalContext<'_>,
    command: &str,
    exit_code: ExitExpectation,
    stdout: &[OutputMatcher],
) -> Result<Outcome, TransportError> {
    let output = target.run(command)?;
    let out = truncate_output(&output.stdout, ctx.max_output_bytes);
    let err = truncate_output(&output.stderr, ctx.max_output_bytes);
    let data = json!({
        "command": command,
        "exit_code": output.exit_code,
        "stdout": out,
        "stderr": err,
    });

    if !exit_code.matches(output.exit_code) {
        return Ok(Outcome::fail(
            ids::CODE_EXIT_CODE_MISMATCH,
            format!(
                "`{command}` exited {} (expected {exit_code}); stdout: {:?}; stderr: {:?}",
                output.exit_code,
                out.trim_end(),
                err.trim_end()
            ),
        )
        .with_data(data));
    }

    if let Some(failed) = stdout.iter().find(|m| !m.matches(&output.stdout)) {
        return Ok(Outcome::fail(
            ids::CODE_STDOUT_MISMATCH,
            format!(
                "`{command}` stdout does not satisfy {failed}; stdout: {:?}",
                out.trim_end()
            ),
        )
        .with_data(data));
    }

    Ok(Outcome::pass(format!("`{command}` exited {}", output.exit_code)).with_data(data))
}
