use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DEFAULT_EDAMAM_URL: &str = "https://api.edamam.com/api/food-database/v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdamamCredentials {
    pub app_id: String,
    pub app_key: String,
}

impl EdamamCredentials {
    /// Both values must be present and non-blank.
    pub fn from_vars(app_id: Option<String>, app_key: Option<String>) -> Option<Self> {
        let app_id = app_id.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        let app_key = app_key.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        Some(Self { app_id, app_key })
    }
}

pub struct Config {
    pub db_path: PathBuf,
    pub edamam_url: String,
    pub edamam: Option<EdamamCredentials>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let db_path = match std::env::var_os("MEALBOOK_DB") {
            Some(path) => PathBuf::from(path),
            None => {
                let proj_dirs = ProjectDirs::from("", "", "mealbook")
                    .context("Could not determine home directory")?;
                let data_dir = proj_dirs.data_dir().to_path_buf();
                std::fs::create_dir_all(&data_dir).with_context(|| {
                    format!("Failed to create data directory: {}", data_dir.display())
                })?;
                data_dir.join("nutrition.db")
            }
        };

        let edamam_url = std::env::var("EDAMAM_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_EDAMAM_URL.to_string());
        let edamam = EdamamCredentials::from_vars(
            std::env::var("EDAMAM_APP_ID").ok(),
            std::env::var("EDAMAM_APP_KEY").ok(),
        );
        if edamam.is_none() {
            tracing::debug!("Edamam credentials not configured");
        }

        Ok(Config {
            db_path,
            edamam_url,
            edamam,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_from_vars() {
        let creds =
            EdamamCredentials::from_vars(Some(" abc ".to_string()), Some("key".to_string()))
                .unwrap();
        assert_eq!(creds.app_id, "abc");
        assert_eq!(creds.app_key, "key");
    }

    #[test]
    fn test_credentials_missing_or_blank() {
        assert!(EdamamCredentials::from_vars(None, Some("key".to_string())).is_none());
        assert!(EdamamCredentials::from_vars(Some("abc".to_string()), None).is_none());
        assert!(
            EdamamCredentials::from_vars(Some("  ".to_string()), Some("key".to_string()))
                .is_none()
        );
    }
}
