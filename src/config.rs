use chrono::NaiveDate;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub portal: PortalConfig,
    pub user_agent: String,
    pub request_timeout_seconds: u64,
    pub max_retries: u32,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    /// Where receipt PDFs are written; no PDFs are saved when unset.
    pub pdf_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub login_url: String,
    pub cumulus_login_url: String,
    pub receipts_url: String,
    pub export_url: String,
    pub referrer: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: "https://login.migros.ch/login".to_string(),
            cumulus_login_url: "https://www.migros.ch/de/cumulus/konto~checkImmediate=true~.html"
                .to_string(),
            receipts_url: "https://www.migros.ch/de/cumulus/konto/kassenbons.html".to_string(),
            export_url: "https://www.migros.ch/service/avantaReceiptExport/".to_string(),
            referrer: "https://www.migros.ch/de/cumulus/konto/kassenbons.html".to_string(),
        }
    }
}

impl Config {
    /// Load defaults, then `cumulus.toml` if present, then `MIGROS_*` variables.
    pub fn load() -> Result<Self> {
        let portal = PortalConfig::default();

        let settings = config::Config::builder()
            .set_default("username", "")?
            .set_default("password", "")?
            .set_default("portal.login_url", portal.login_url)?
            .set_default("portal.cumulus_login_url", portal.cumulus_login_url)?
            .set_default("portal.receipts_url", portal.receipts_url)?
            .set_default("portal.export_url", portal.export_url)?
            .set_default("portal.referrer", portal.referrer)?
            .set_default(
                "user_agent",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
            )?
            .set_default("request_timeout_seconds", 25_i64)?
            .set_default("max_retries", 3_i64)?
            .add_source(File::with_name("cumulus").required(false))
            .add_source(Environment::with_prefix("MIGROS"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Configuration pointing every portal URL at `base`, used against local mock servers.
    pub fn for_base_url(base: &str, username: &str, password: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            username: username.to_string(),
            password: password.to_string(),
            portal: PortalConfig {
                login_url: format!("{}/login", base),
                cumulus_login_url: format!("{}/de/cumulus/konto~checkImmediate=true~.html", base),
                receipts_url: format!("{}/de/cumulus/konto/kassenbons.html", base),
                export_url: format!("{}/service/avantaReceiptExport/", base),
                referrer: format!("{}/de/cumulus/konto/kassenbons.html", base),
            },
            user_agent: "cumulus-receipts-test".to_string(),
            request_timeout_seconds: 5,
            max_retries: 1,
            period_from: None,
            period_to: None,
            pdf_dir: None,
        }
    }
}
