use app_logging::{app_debug, app_info};
use quotation_core::{Credentials, ProcessRequest, SelectedFile};
use reqwest::multipart::{Form, Part};

use crate::{ApiError, ApiSettings, ProcessResponse, RemoteCredentials};

const CREDENTIALS_PATH: &str = "/api/credentials";
const PROCESS_FILES_PATH: &str = "/api/process-files";
const FALLBACK_MIME: &str = "application/octet-stream";

/// The remote processing service, as far as this client is concerned.
#[async_trait::async_trait]
pub trait ProcessingApi: Send + Sync {
    /// `Ok(None)` when the server has nothing stored.
    async fn fetch_credentials(&self) -> Result<Option<RemoteCredentials>, ApiError>;

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), ApiError>;

    async fn process_files(&self, request: &ProcessRequest) -> Result<ProcessResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ApiSettings,
    http: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        // No client-wide timeout: processing requests may legitimately take minutes.
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { settings, http })
    }

    async fn build_process_form(&self, request: &ProcessRequest) -> Result<Form, ApiError> {
        let mut form = Form::new()
            .text("sheet_url", request.sheet_url.clone())
            .text("output_format", request.output_format.as_str())
            .text("google_api_key", request.credentials.google_api_key.clone())
            .text(
                "gcp_service_account_json",
                request.credentials.service_account_json.clone(),
            );
        for file in &request.files {
            form = form.part("files", file_part(file).await?);
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl ProcessingApi for ReqwestApiClient {
    async fn fetch_credentials(&self) -> Result<Option<RemoteCredentials>, ApiError> {
        let response = self
            .http
            .get(self.settings.endpoint(CREDENTIALS_PATH))
            .timeout(self.settings.credentials_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<RemoteCredentials>>(&body)
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let form = Form::new()
            .text("google_api_key", credentials.google_api_key.clone())
            .text(
                "gcp_service_account_json",
                credentials.service_account_json.clone(),
            );
        let response = self
            .http
            .post(self.settings.endpoint(CREDENTIALS_PATH))
            .timeout(self.settings.credentials_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::HttpStatus {
            status: status.as_u16(),
            message: non_blank(&body),
        })
    }

    async fn process_files(&self, request: &ProcessRequest) -> Result<ProcessResponse, ApiError> {
        let form = self.build_process_form(request).await?;
        app_info!(
            "Submitting {} file(s) format={} sheet_url_len={}",
            request.files.len(),
            request.output_format,
            request.sheet_url.len()
        );

        let mut builder = self
            .http
            .post(self.settings.endpoint(PROCESS_FILES_PATH))
            .multipart(form);
        if let Some(timeout) = self.settings.process_timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            app_debug!("process-files answered {} body_len={}", status, body.len());
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }
        serde_json::from_str::<ProcessResponse>(&body)
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

async fn file_part(file: &SelectedFile) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|err| ApiError::InvalidFile {
            name: file.name.clone(),
            message: err.to_string(),
        })?;
    let mime = if file.mime_type.trim().is_empty() {
        FALLBACK_MIME
    } else {
        file.mime_type.as_str()
    };
    Part::bytes(bytes)
        .file_name(file.name.clone())
        .mime_str(mime)
        .map_err(|err| ApiError::InvalidFile {
            name: file.name.clone(),
            message: err.to_string(),
        })
}

/// Prefers a JSON `detail` string, then the raw body text.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        if let Some(serde_json::Value::String(detail)) = map.get("detail") {
            if !detail.trim().is_empty() {
                return Some(detail.clone());
            }
        }
    }
    Some(trimmed.to_string())
}

fn non_blank(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(err.to_string());
    }
    ApiError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::server_message;

    #[test]
    fn plain_body_is_used_verbatim() {
        assert_eq!(server_message("Internal error"), Some("Internal error".to_string()));
    }

    #[test]
    fn json_detail_is_preferred() {
        assert_eq!(
            server_message(r#"{"detail":"No files uploaded"}"#),
            Some("No files uploaded".to_string())
        );
    }

    #[test]
    fn structured_detail_falls_back_to_body() {
        let body = r#"{"detail":[{"loc":["body","files"],"msg":"field required"}]}"#;
        assert_eq!(server_message(body), Some(body.to_string()));
    }

    #[test]
    fn blank_body_has_no_message() {
        assert_eq!(server_message("  \n"), None);
    }
}
