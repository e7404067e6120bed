use crate::outcome::Outcome;
use crate::target::{Target, TransportError};
use hostguard_types::ids;
use serde_json::json;

pub fn run_exists(target: &dyn Target, group: &str) -> Result<Outcome, TransportError> {
    let outcome = if target.group_exists(group)? {
        Outcome::pass(format!("group '{group}' exists"))
    } else {
        Outcome::fail(ids::CODE_GROUP_MISSING, format!("group '{group}' is absent"))
    };
    Ok(outcome.with_data(json!({ "group": group })))
}

pub fn run_membership(
    target: &dyn Target,
    user: &str,
    group: &str,
) -> Result<Outcome, TransportError> {
    let Some(groups) = target.user_groups(user)? else {
        return Ok(
            Outcome::fail(ids::CODE_USER_MISSING, format!("user '{user}' is absent"))
                .with_data(json!({ "user": user, "group": group })),
        );
    };

    let outcome = if groups.iter().any(|g| g == group) {
        Outcome::pass(format!("user '{user}' is in group '{group}'"))
    } else {
        Outcome::fail(
            ids::CODE_USER_NOT_IN_GROUP,
            format!(
                "user '{user}' is not in group '{group}' (groups: {})",
                groups.join(", ")
            ),
        )
    };
    Ok(outcome.with_data(json!({ "user": user, "group": group, "groups": groups })))
}
