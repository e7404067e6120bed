//! Stable identifiers for check kinds and failure codes.
//!
//! `check_id` is a dotted namespace naming the predicate kind. `code` is a short
//! snake_case discriminator naming why a check did not pass.

// Checks
pub const CHECK_PACKAGE_INSTALLED: &str = "host.package_installed";
pub const CHECK_SERVICE_STATE: &str = "host.service_state";
pub const CHECK_FILE_EXISTS: &str = "host.file_exists";
pub const CHECK_FILE_CONTAINS: &str = "host.file_contains";
pub const CHECK_FILE_MODE: &str = "host.file_mode";
pub const CHECK_COMMAND_RESULT: &str = "host.command_result";
pub const CHECK_SOCKET_LISTENING: &str = "host.socket_listening";
pub const CHECK_GROUP_EXISTS: &str = "host.group_exists";
pub const CHECK_USER_IN_GROUP: &str = "host.user_in_group";

// Codes: host.package_installed
pub const CODE_NOT_INSTALLED: &str = "not_installed";

// Codes: host.service_state
pub const CODE_RUNNING_MISMATCH: &str = "running_mismatch";
pub const CODE_ENABLED_MISMATCH: &str = "enabled_mismatch";

// Codes: host.file_*
pub const CODE_FILE_MISSING: &str = "file_missing";
pub const CODE_FILE_TYPE_MISMATCH: &str = "file_type_mismatch";
pub const CODE_SUBSTRING_MISSING: &str = "substring_missing";
pub const CODE_MODE_MISMATCH: &str = "mode_mismatch";

// Codes: host.command_result
pub const CODE_EXIT_CODE_MISMATCH: &str = "exit_code_mismatch";
pub const CODE_STDOUT_MISMATCH: &str = "stdout_mismatch";

// Codes: host.socket_listening
pub const CODE_NOT_LISTENING: &str = "not_listening";

// Codes: host.group_exists / host.user_in_group
pub const CODE_GROUP_MISSING: &str = "group_missing";
pub const CODE_USER_MISSING: &str = "user_missing";
pub const CODE_USER_NOT_IN_GROUP: &str = "user_not_in_group";

// Codes: any check
pub const CODE_TRANSPORT_FAILURE: &str = "transport_failure";

// Skip reasons
pub const REASON_CHECK_DISABLED: &str = "check_disabled";
pub const REASON_HOST_FILTERED: &str = "host_filtered";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";

/// Every predicate kind id, in evaluator order.
pub const ALL_CHECK_IDS: &[&str] = &[
    CHECK_PACKAGE_INSTALLED,
    CHECK_SERVICE_STATE,
    CHECK_FILE_EXISTS,
    CHECK_FILE_CONTAINS,
    CHECK_FILE_MODE,
    CHECK_COMMAND_RESULT,
    CHECK_SOCKET_LISTENING,
    CHECK_GROUP_EXISTS,
    CHECK_USER_IN_GROUP,
];
