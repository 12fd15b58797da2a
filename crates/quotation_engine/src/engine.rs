use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use app_logging::{app_debug, app_error, app_info, app_warn};
use quotation_core::{Credentials, ProcessRequest};

use crate::client::{ProcessingApi, ReqwestApiClient};
use crate::{ApiError, ApiSettings, EngineError, EngineEvent, ProcessOutcome};

/// Clock used to stamp finished requests.
pub type UtcClock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub settings: ApiSettings,
    pub completed_utc: UtcClock,
}

impl EngineConfig {
    pub fn new(settings: ApiSettings) -> Self {
        Self {
            settings,
            completed_utc: Arc::new(String::new),
        }
    }
}

enum EngineCommand {
    FetchCredentials,
    SaveCredentials(Credentials),
    Process(ProcessRequest),
}

/// Runs API calls on a background tokio runtime and reports back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    in_flight: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestApiClient::new(config.settings.clone())?);
        Self::with_api(api, config.completed_utc)
    }

    /// Engine over any [`ProcessingApi`] implementation.
    pub fn with_api(
        api: Arc<dyn ProcessingApi>,
        completed_utc: UtcClock,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let in_flight = Arc::new(AtomicBool::new(false));
        let task_in_flight = in_flight.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                let in_flight = task_in_flight.clone();
                let completed_utc = completed_utc.clone();
                let is_process = matches!(command, EngineCommand::Process(_));
                let watch_tx = event_tx.clone();
                let watch_in_flight = in_flight.clone();
                let task = runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx, &in_flight, &completed_utc)
                        .await;
                });
                if is_process {
                    // A dead task never reports back; fail the request in its place.
                    runtime.spawn(async move {
                        if let Err(err) = task.await {
                            app_error!("Processing task stopped: {}", err);
                            watch_in_flight.store(false, Ordering::Release);
                            let _ = watch_tx.send(EngineEvent::ProcessCompleted(Err(
                                ApiError::Interrupted(err.to_string()),
                            )));
                        }
                    });
                }
            }
            app_debug!("Engine command channel closed");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            in_flight,
        })
    }

    pub fn fetch_credentials(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchCredentials);
    }

    pub fn save_credentials(&self, credentials: Credentials) {
        let _ = self.cmd_tx.send(EngineCommand::SaveCredentials(credentials));
    }

    /// Starts a processing request. Returns `false` if one is already running.
    pub fn submit(&self, request: ProcessRequest) -> bool {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            app_warn!(
                "Dropping submission of {} file(s): a request is already in flight",
                request.files.len()
            );
            return false;
        }
        if self.cmd_tx.send(EngineCommand::Process(request)).is_err() {
            self.in_flight.store(false, Ordering::Release);
            return false;
        }
        true
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn ProcessingApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    in_flight: &AtomicBool,
    completed_utc: &UtcClock,
) {
    match command {
        EngineCommand::FetchCredentials => match api.fetch_credentials().await {
            Ok(Some(remote)) => {
                let _ = event_tx.send(EngineEvent::RemoteCredentials(remote));
            }
            Ok(None) => {
                app_debug!("No remote credentials stored");
                let _ = event_tx.send(EngineEvent::RemoteCredentialsUnavailable);
            }
            Err(err) => {
                app_debug!("Remote credential fetch failed: {}", err);
                let _ = event_tx.send(EngineEvent::RemoteCredentialsUnavailable);
            }
        },
        EngineCommand::SaveCredentials(credentials) => {
            let result = api.save_credentials(&credentials).await;
            match &result {
                Ok(()) => app_info!("Credentials saved on server"),
                Err(err) => app_warn!("Saving credentials failed: {}", err),
            }
            let _ = event_tx.send(EngineEvent::CredentialsSaved {
                credentials,
                result,
            });
        }
        EngineCommand::Process(request) => {
            let result = api.process_files(&request).await.map(|response| ProcessOutcome {
                response,
                completed_utc: completed_utc(),
            });
            match &result {
                Ok(outcome) => app_info!(
                    "Processing finished sheet_id={} results={} errors={}",
                    outcome.response.sheet_id,
                    outcome.response.results.len(),
                    outcome.response.errors.len()
                ),
                Err(err) => app_warn!("Processing failed: {}", err),
            }
            in_flight.store(false, Ordering::Release);
            let _ = event_tx.send(EngineEvent::ProcessCompleted(result));
        }
    }
}
