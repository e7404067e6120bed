use super::utils::format_mode;
use crate::model::FileType;
use crate::outcome::Outcome;
use crate::target::{FileStat, Target, TransportError};
use hostguard_types::{HostPath, ids};
use serde_json::json;

const DEFAULT_MASK: u32 = 0o7777;

pub fn run_exists(
    target: &dyn Target,
    path: &HostPath,
    file_type: Option<FileType>,
) -> Result<Outcome, TransportError> {
    let stat = target.file(path)?;
    if !stat.exists {
        return Ok(missing(path));
    }

    let outcome = match file_type {
        Some(FileType::File) if !stat.is_file => type_mismatch(path, FileType::File, &stat),
        Some(FileType::Directory) if !stat.is_directory => {
            type_mismatch(path, FileType::Directory, &stat)
        }
        _ => Outcome::pass(format!("{path} exists")),
    };
    Ok(outcome.with_data(json!({
        "path": path.as_str(),
        "is_file": stat.is_file,
        "is_directory": stat.is_directory,
    })))
}

pub fn run_contains(
    target: &dyn Target,
    path: &HostPath,
    substring: &str,
) -> Result<Outcome, TransportError> {
    let stat = target.file(path)?;
    if !stat.exists {
        return Ok(missing(path));
    }

    let content = target.read_file(path)?;
    let outcome = if content.contains(substring) {
        Outcome::pass(format!("{path} contains '{substring}'"))
    } else {
        Outcome::fail(
            ids::CODE_SUBSTRING_MISSING,
            format!("{path} does not contain '{substring}'"),
        )
    };
    Ok(outcome.with_data(json!({ "path": path.as_str(), "substring": substring })))
}

pub fn run_mode(
    target: &dyn Target,
    path: &HostPath,
    mode: u32,
    mask: Option<u32>,
) -> Result<Outcome, TransportError> {
    let stat = target.file(path)?;
    if !stat.exists {
        return Ok(missing(path));
    }
    let Some(actual) = stat.mode else {
        return Err(TransportError::Parse {
            query: format!("stat {path}"),
            detail: "no permission bits reported for an existing path".to_string(),
        });
    };

    let mask = mask.unwrap_or(DEFAULT_MASK);
    let data = json!({
        "path": path.as_str(),
        "expected": format_mode(mode),
        "actual": format_mode(actual),
        "mask": format_mode(mask),
    });

    let outcome = if actual & mask == mode & mask {
        Outcome::pass(format!("{path} has mode {}", format_mode(actual)))
    } else if mask == DEFAULT_MASK {
        Outcome::fail(
            ids::CODE_MODE_MISMATCH,
            format!(
                "{path} has mode {}, expected {}",
                format_mode(actual),
                format_mode(mode)
            ),
        )
    } else {
        Outcome::fail(
            ids::CODE_MODE_MISMATCH,
            format!(
                "{path} has mode {}, expected {} under mask {}",
                format_mode(actual),
                format_mode(mode & mask),
                format_mode(mask)
            ),
        )
    };
    Ok(outcome.with_data(data))
}

fn missing(path: &HostPath) -> Outcome {
    Outcome::fail(ids::CODE_FILE_MISSING, format!("{path} does not exist"))
        .with_data(json!({ "path": path.as_str() }))
}

fn type_mismatch(path: &HostPath, expected: FileType, stat: &FileStat) -> Outcome {
    let actual = if stat.is_directory {
        "directory"
    } else if stat.is_file {
        "file"
    } else {
        "other"
    };
    Outcome::fail(
        ids::CODE_FILE_TYPE_MISMATCH,
        format!("{path} is a {actual}, expected a {expected}"),
    )
}
