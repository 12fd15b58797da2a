use std::sync::Arc;
use std::time::Duration;

use app_logging::{app_error, app_info, app_warn};
use chrono::Utc;
use quotation_core::{Effect, Msg};
use quotation_engine::{ApiSettings, EngineConfig, EngineError, EngineEvent, EngineHandle};

use super::persistence::CredentialStore;

/// Shown when a save fails without any text from the server.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save credentials";

/// Shown when the engine turns a submission away.
pub const SUBMIT_REFUSED_MESSAGE: &str = "A processing request is already running";

pub struct EffectRunner {
    engine: EngineHandle,
    store: CredentialStore,
}

impl EffectRunner {
    pub fn new(settings: ApiSettings, store: CredentialStore) -> Result<Self, EngineError> {
        let mut config = EngineConfig::new(settings);
        config.completed_utc = Arc::new(|| Utc::now().to_rfc3339());

        let engine = EngineHandle::new(config)?;
        Ok(Self { engine, store })
    }

    /// Runs `effects` and returns the messages for outcomes known right away.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::FetchRemoteCredentials => self.engine.fetch_credentials(),
                Effect::SaveCredentials(credentials) => {
                    app_info!("Saving credentials on the server");
                    self.engine.save_credentials(credentials);
                }
                Effect::PersistCredentials(credentials) => {
                    if let Err(err) = self.store.save(&credentials) {
                        follow_ups.push(Msg::CredentialsPersistFailed(err.to_string()));
                    }
                }
                Effect::SubmitFiles(request) => {
                    app_info!(
                        "SubmitFiles files={} format={} sheet_len={}",
                        request.files.len(),
                        request.output_format,
                        request.sheet_url.len()
                    );
                    if !self.engine.submit(request) {
                        app_error!("Engine refused submission; one is already running");
                        follow_ups.push(Msg::ProcessFailed {
                            message: SUBMIT_REFUSED_MESSAGE.to_string(),
                        });
                    }
                }
            }
        }
        follow_ups
    }

    pub fn next_event(&self, timeout: Duration) -> Option<EngineEvent> {
        self.engine.recv_timeout(timeout)
    }
}

/// Translates an engine completion into the message the state machine expects.
pub fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RemoteCredentials(remote) => Msg::RemoteCredentialsLoaded {
            google_api_key: remote.google_api_key,
            service_account_json: remote.gcp_service_account_json,
        },
        EngineEvent::RemoteCredentialsUnavailable => Msg::NoOp,
        EngineEvent::CredentialsSaved {
            credentials,
            result: Ok(()),
        } => Msg::CredentialsSaved(credentials),
        EngineEvent::CredentialsSaved {
            result: Err(err), ..
        } => {
            app_warn!("Saving credentials failed: {}", err);
            let message = err
                .server_text()
                .map(str::to_string)
                .unwrap_or_else(|| SAVE_FAILED_MESSAGE.to_string());
            Msg::CredentialsSaveFailed(message)
        }
        EngineEvent::ProcessCompleted(Ok(outcome)) => Msg::ProcessSucceeded {
            sheet_id: outcome.response.sheet_id,
            result_count: outcome.response.results.len(),
            errors: outcome.response.errors,
            completed_at: Some(outcome.completed_utc).filter(|stamp| !stamp.is_empty()),
        },
        EngineEvent::ProcessCompleted(Err(err)) => {
            app_warn!("Processing failed: {}", err);
            Msg::ProcessFailed {
                message: err.user_message(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quotation_core::{Credentials, OutputFormat, ProcessRequest, SelectedFile};
    use quotation_engine::{
        ApiError, FileResult, ProcessOutcome, ProcessResponse, RemoteCredentials,
        UNREACHABLE_MESSAGE,
    };
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn outcome(stamp: &str) -> ProcessOutcome {
        ProcessOutcome {
            response: ProcessResponse {
                sheet_id: "abc123".to_string(),
                results: vec![
                    FileResult {
                        file_name: "a.pdf".to_string(),
                        data: None,
                    },
                    FileResult {
                        file_name: "b.png".to_string(),
                        data: None,
                    },
                ],
                errors: Vec::new(),
            },
            completed_utc: stamp.to_string(),
        }
    }

    #[test]
    fn success_maps_result_count_and_timestamp() {
        let msg = to_msg(EngineEvent::ProcessCompleted(Ok(outcome(
            "2026-10-16T09:00:00+00:00",
        ))));

        assert_eq!(
            msg,
            Msg::ProcessSucceeded {
                sheet_id: "abc123".to_string(),
                result_count: 2,
                errors: Vec::new(),
                completed_at: Some("2026-10-16T09:00:00+00:00".to_string()),
            }
        );
    }

    #[test]
    fn blank_timestamp_is_dropped() {
        match to_msg(EngineEvent::ProcessCompleted(Ok(outcome("")))) {
            Msg::ProcessSucceeded { completed_at, .. } => assert_eq!(completed_at, None),
            other => panic!("unexpected msg {other:?}"),
        }
    }

    #[test]
    fn failures_use_user_facing_text() {
        let server = to_msg(EngineEvent::ProcessCompleted(Err(ApiError::HttpStatus {
            status: 500,
            message: Some("Internal error".to_string()),
        })));
        assert_eq!(
            server,
            Msg::ProcessFailed {
                message: "Internal error".to_string()
            }
        );

        let transport = to_msg(EngineEvent::ProcessCompleted(Err(ApiError::Transport(
            "connection refused".to_string(),
        ))));
        assert_eq!(
            transport,
            Msg::ProcessFailed {
                message: UNREACHABLE_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn save_failure_prefers_server_text() {
        let credentials = Credentials::new("key", "json");
        let with_text = to_msg(EngineEvent::CredentialsSaved {
            credentials: credentials.clone(),
            result: Err(ApiError::HttpStatus {
                status: 400,
                message: Some("Missing Google API key".to_string()),
            }),
        });
        assert_eq!(
            with_text,
            Msg::CredentialsSaveFailed("Missing Google API key".to_string())
        );

        let without_text = to_msg(EngineEvent::CredentialsSaved {
            credentials,
            result: Err(ApiError::Transport("reset".to_string())),
        });
        assert_eq!(
            without_text,
            Msg::CredentialsSaveFailed(SAVE_FAILED_MESSAGE.to_string())
        );
    }

    #[test]
    fn failed_local_write_comes_back_as_a_message() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("occupied");
        std::fs::write(&blocker, "file").unwrap();
        let runner =
            EffectRunner::new(ApiSettings::default(), CredentialStore::new(blocker)).unwrap();

        let follow_ups = runner.enqueue(vec![Effect::PersistCredentials(Credentials::new(
            "key", "json",
        ))]);

        assert_eq!(follow_ups.len(), 1);
        assert!(matches!(&follow_ups[0], Msg::CredentialsPersistFailed(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn refused_submission_fails_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/process-files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"sheet_id": "s", "results": [], "errors": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        let uri = server.uri();

        let (first, second) = tokio::task::spawn_blocking(move || {
            let temp = TempDir::new().unwrap();
            let upload = temp.path().join("a.pdf");
            std::fs::write(&upload, b"%PDF-1.7").unwrap();
            let settings = ApiSettings::default().with_base_url(&uri).unwrap();
            let runner =
                EffectRunner::new(settings, CredentialStore::new(temp.path().to_path_buf()))
                    .unwrap();
            let request = ProcessRequest {
                files: vec![SelectedFile::new("a.pdf", 8, "application/pdf", upload)],
                output_format: OutputFormat::default(),
                sheet_url: String::new(),
                credentials: Credentials::new("key", "{}"),
            };

            let first = runner.enqueue(vec![Effect::SubmitFiles(request.clone())]);
            let second = runner.enqueue(vec![Effect::SubmitFiles(request)]);
            (first, second)
        })
        .await
        .unwrap();

        assert_eq!(first, Vec::new());
        assert_eq!(
            second,
            vec![Msg::ProcessFailed {
                message: SUBMIT_REFUSED_MESSAGE.to_string()
            }]
        );
    }

    #[test]
    fn remote_fields_are_renamed() {
        let msg = to_msg(EngineEvent::RemoteCredentials(RemoteCredentials {
            google_api_key: None,
            gcp_service_account_json: Some("{}".to_string()),
        }));
        assert_eq!(
            msg,
            Msg::RemoteCredentialsLoaded {
                google_api_key: None,
                service_account_json: Some("{}".to_string()),
            }
        );
        assert_eq!(to_msg(EngineEvent::RemoteCredentialsUnavailable), Msg::NoOp);
    }
}
