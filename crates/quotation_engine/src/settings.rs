use std::time::Duration;

use url::Url;

use crate::ApiError;

pub const BASE_URL_ENV: &str = "QUOTATION_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// `None` lets a slow extraction run as long as the server needs.
    pub process_timeout: Option<Duration>,
    pub credentials_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            process_timeout: None,
            credentials_timeout: Duration::from_secs(15),
        }
    }
}

impl ApiSettings {
    /// Defaults, with the base URL taken from `QUOTATION_API_BASE_URL` when set.
    pub fn from_env() -> Result<Self, ApiError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::default().with_base_url(&value),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_base_url(self, base_url: &str) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            ..self
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_server_without_process_timeout() {
        let settings = ApiSettings::default();
        assert_eq!(
            settings.endpoint("/api/process-files"),
            "http://localhost:8000/api/process-files"
        );
        assert_eq!(settings.process_timeout, None);
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let settings = ApiSettings::default()
            .with_base_url(" https://quotes.example.com/// ")
            .unwrap();
        assert_eq!(
            settings.endpoint("api/credentials"),
            "https://quotes.example.com/api/credentials"
        );
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = ApiSettings::default()
            .with_base_url("ftp://files.example.com")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));

        let err = ApiSettings::default().with_base_url("not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }
}
