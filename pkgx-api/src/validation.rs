//! Path parameter validation for package names and versions.

use crate::error::{ApiError, ApiResult};
use once_cell::sync::Lazy;
use regex::Regex;

pub const PACKAGE_NAME_MAX_LENGTH: usize = 214;

// Characters that survive URL path-segment escaping unchanged.
static URL_SAFE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9\-_.~$&+:=@]+$").expect("URL-safe regex should compile - static pattern")
});

static SPECIAL_CHAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[@.~\\/!'()*\s]"#).expect("Special character regex should compile - static pattern")
});

static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*))?$")
        .expect("Version regex should compile - static pattern")
});

pub fn validate_package_name(name: &str) -> ApiResult<()> {
    let len = name.chars().count();
    if len == 0 || len >= PACKAGE_NAME_MAX_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Package name must be non-empty and shorter than {} characters",
            PACKAGE_NAME_MAX_LENGTH
        )));
    }

    if name.to_lowercase() != name {
        return Err(ApiError::BadRequest(
            "Package name must contain only lowercase characters".to_string(),
        ));
    }

    if SPECIAL_CHAR_REGEX.is_match(name) {
        return Err(ApiError::BadRequest(
            r#"Package name must not contain any of these special characters: @, ., ~, \, /, !, ', (, ), *"#
                .to_string(),
        ));
    }

    if !URL_SAFE_REGEX.is_match(name) {
        return Err(ApiError::BadRequest(
            "Package name must not contain any non-url-safe character".to_string(),
        ));
    }

    Ok(())
}

/// Normalize a `MAJOR.MINOR.PATCH[-pre]` version, dropping a leading `v`
/// and leading zeros.
pub fn sanitize_version(version: &str) -> ApiResult<String> {
    let invalid = || ApiError::BadRequest("The package version should be in semver format".to_string());

    let caps = VERSION_REGEX.captures(version.trim()).ok_or_else(invalid)?;

    let mut parts = Vec::with_capacity(3);
    for idx in 1..=3 {
        let number: u64 = caps[idx].parse().map_err(|_| invalid())?;
        parts.push(number.to_string());
    }

    let mut sanitized = parts.join(".");
    if let Some(pre) = caps.get(4) {
        sanitized.push('-');
        sanitized.push_str(pre.as_str());
    }

    Ok(sanitized)
}
