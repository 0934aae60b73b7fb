use std::str::FromStr;

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// An environment variable is set but its value could not be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for environment variable {name}: {value:?} ({message})")]
pub struct InvalidEnvVarError {
    /// Name of the variable.
    pub name: String,
    /// Raw value found in the environment.
    pub value: String,
    /// Parser message.
    pub message: String,
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Reads an optional environment variable.
///
/// Unset and blank (whitespace only) values both yield `None`, so an exported
/// but empty variable never overrides a configured value.
pub fn get_optional_env_var(name: &str) -> Option<String> {
    get_env_var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads an optional environment variable and parses it with [`FromStr`].
pub fn get_optional_env_parsed<T>(name: &str) -> Result<Option<T>, InvalidEnvVarError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env_var(name) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|e| InvalidEnvVarError {
            name: name.to_string(),
            message: e.to_string(),
            value,
        }),
    }
}
