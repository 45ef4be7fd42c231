// Display name heuristic for compose-style container names

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("no container names given")]
    NoNames,

    #[error("cannot find service part in container name '{0}'")]
    NoServicePart(String),
}

/// Turns `/project_service_1` into `service`. Only the first name is considered.
pub fn derive_display_name(names: &[String]) -> Result<String, NameError> {
    let first = names.first().ok_or(NameError::NoNames)?;
    let trimmed = first.trim_start_matches('/');
    let mut parts = trimmed.split('_');
    match (parts.next(), parts.next()) {
        (Some(_), Some(service)) => Ok(service.to_string()),
        _ => Err(NameError::NoServicePart(first.clone())),
    }
}
