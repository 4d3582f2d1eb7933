//! Shared query-string handling for catalog and lock endpoints.

use std::time::Duration;

use cda_core::error::CoreError;
use cda_core::mask::Mask;
use cda_core::pagination::PageRequest;
use serde::Deserialize;

use crate::config::ServerConfig;

/// `?page=&page-size=` on catalog endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<i64>,
}

/// `?fail-if-exists=` on store endpoints. Defaults to `true`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreParams {
    pub fail_if_exists: Option<bool>,
}

impl StoreParams {
    pub fn fail_if_exists(&self) -> bool {
        self.fail_if_exists.unwrap_or(true)
    }
}

/// `?office=` on single-entity endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct OfficeParams {
    pub office: Option<String>,
}

impl OfficeParams {
    /// The office, or a missing-parameter error.
    pub fn require(&self) -> Result<&str, CoreError> {
        cda_core::validation::require_params(&[("office", self.office.as_deref())])?;
        Ok(param(&self.office))
    }
}

/// Resolve `page` / `page-size` against the configured limits.
pub fn page_request(config: &ServerConfig, params: &PageParams) -> Result<PageRequest, CoreError> {
    PageRequest::resolve(
        params.page.as_deref(),
        params.page_size,
        config.default_page_size,
        config.max_page_size,
    )
}

/// Like [`page_request`], for the time-series profile catalogs, which default
/// to larger pages.
pub fn profile_page_request(
    config: &ServerConfig,
    params: &PageParams,
) -> Result<PageRequest, CoreError> {
    PageRequest::resolve(
        params.page.as_deref(),
        params.page_size,
        config.profile_page_size,
        config.max_page_size,
    )
}

/// Resolve `revoke-timeout` (seconds), rejecting values above the configured
/// maximum.
pub fn revoke_timeout(config: &ServerConfig, secs: Option<u64>) -> Result<Duration, CoreError> {
    let secs = secs.unwrap_or(config.default_revoke_timeout_secs);
    if secs > config.max_revoke_timeout_secs {
        return Err(CoreError::Validation(format!(
            "revoke-timeout must be between 0 and {} seconds",
            config.max_revoke_timeout_secs
        )));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse an optional mask parameter.
pub fn mask(value: &Option<String>) -> Result<Mask, CoreError> {
    Mask::parse(value.as_deref())
}

/// The value of a parameter already checked by `require_params`.
pub fn param(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
