use std::path::PathBuf;

use app_logging::{app_error, app_info, app_warn};
use quotation_core::Credentials;
use quotation_engine::{read_if_exists, AtomicFileWriter, PersistError};
use serde::{Deserialize, Serialize};

const STORE_FILENAME: &str = "credentials.ron";
const STORE_DIRNAME: &str = "quotation_processor";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedCredentials {
    #[serde(rename = "googleApiKey", default)]
    google_api_key: String,
    #[serde(rename = "serviceAccountJson", default)]
    service_account_json: String,
}

/// Local key/value store for the credentials entered in settings.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Per-user config directory, or `./.quotation` when the platform has none.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(STORE_DIRNAME))
            .unwrap_or_else(|| PathBuf::from("./.quotation"))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILENAME)
    }

    /// Missing, unreadable or corrupt stores all load as blank credentials.
    pub fn load(&self) -> Credentials {
        let path = self.path();
        let content = match read_if_exists(&path) {
            Ok(Some(text)) => text,
            Ok(None) => return Credentials::default(),
            Err(err) => {
                app_warn!("Failed to read credential store {:?}: {}", path, err);
                return Credentials::default();
            }
        };

        match ron::from_str::<PersistedCredentials>(&content) {
            Ok(stored) => {
                app_info!("Loaded local credentials from {:?}", path);
                Credentials::new(stored.google_api_key, stored.service_account_json)
            }
            Err(err) => {
                app_warn!("Failed to parse credential store {:?}: {}", path, err);
                Credentials::default()
            }
        }
    }

    pub fn save(&self, credentials: &Credentials) -> Result<PathBuf, PersistError> {
        let stored = PersistedCredentials {
            google_api_key: credentials.google_api_key.clone(),
            service_account_json: credentials.service_account_json.clone(),
        };

        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&stored, pretty)
            .map_err(|err| PersistError::Encode(err.to_string()))?;

        match AtomicFileWriter::new(self.dir.clone()).write(STORE_FILENAME, &content) {
            Ok(path) => {
                app_info!("Stored credentials at {:?}", path);
                Ok(path)
            }
            Err(err) => {
                app_error!("Failed to write credential store in {:?}: {}", self.dir, err);
                Err(err)
            }
        }
    }
}
