//! Error taxonomy for PokeAPI requests.

use thiserror::Error;

use crate::cache::CacheError;
use crate::query::Cancelled;

pub type ApiResult<T> = Result<T, ApiError>;

/// A failed PokeAPI request.
///
/// Cloneable so a single outcome can be handed to every caller that joined
/// the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// Transport failure or a non-2xx status (other than 404 on a lookup)
  #[error("Network error for {resource}: {message}")]
  Network {
    resource: String,
    status: Option<u16>,
    message: String,
  },
  /// 404 on a by-identifier lookup
  #[error("Not found: {resource}")]
  NotFound { resource: String },
  /// Response body did not match the expected shape
  #[error("Failed to parse response from {resource}: {message}")]
  Parse { resource: String, message: String },
}

impl ApiError {
  pub(crate) fn transport(resource: &str, err: &reqwest::Error) -> Self {
    ApiError::Network {
      resource: resource.to_string(),
      status: err.status().map(|s| s.as_u16()),
      message: err.to_string(),
    }
  }

  pub(crate) fn status(resource: &str, status: reqwest::StatusCode) -> Self {
    ApiError::Network {
      resource: resource.to_string(),
      status: Some(status.as_u16()),
      message: format!("HTTP {}", status),
    }
  }

  pub(crate) fn parse(resource: &str, message: impl Into<String>) -> Self {
    ApiError::Parse {
      resource: resource.to_string(),
      message: message.into(),
    }
  }

  /// True when upstream reported that the requested entity does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(self, ApiError::NotFound { .. })
  }

  pub fn resource(&self) -> &str {
    match self {
      ApiError::Network { resource, .. }
      | ApiError::NotFound { resource }
      | ApiError::Parse { resource, .. } => resource,
    }
  }
}

impl CacheError for ApiError {
  fn cache_failure(resource: &str, message: String) -> Self {
    ApiError::Network {
      resource: resource.to_string(),
      status: None,
      message,
    }
  }
}

impl From<Cancelled> for ApiError {
  fn from(cancelled: Cancelled) -> Self {
    ApiError::Network {
      resource: "query".to_string(),
      status: None,
      message: cancelled.to_string(),
    }
  }
}
