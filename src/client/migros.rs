use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};

use super::auth::{extract_csrf_token, verify_account_menu};
use super::ReceiptSource;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Period;
use crate::utils::http::{create_client, fetch_with_retry};

const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Session against the Migros login and Cumulus receipt pages.
pub struct MigrosClient {
    client: Client,
    config: Arc<Config>,
    user_name: Option<String>,
}

impl MigrosClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        Ok(Self {
            client: create_client(&config)?,
            config,
            user_name: None,
        })
    }

    /// Build a client and log it in.
    pub async fn connect(config: Arc<Config>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.login().await?;
        Ok(client)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn user_email(&self) -> &str {
        &self.config.username
    }

    /// Log into migros.ch, then land on the Cumulus account page so the
    /// session cookies cover the receipt pages.
    pub async fn login(&mut self) -> Result<()> {
        let portal = &self.config.portal;

        debug!("Getting CSRF token");
        let login_page = fetch_with_retry(
            || self.client.get(&portal.login_url).header(ACCEPT, HTML_ACCEPT),
            &portal.login_url,
            self.config.max_retries,
        )
        .await?
        .text()
        .await?;
        let csrf = extract_csrf_token(&login_page)?;
        debug!("Found CSRF token: {}....", csrf.chars().take(5).collect::<String>());

        let form = serde_urlencoded::to_string([
            ("_csrf", csrf.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ])
        .map_err(|e| Error::Authentication(format!("could not encode login form: {}", e)))?;

        let response = self
            .client
            .post(&portal.login_url)
            .header(ACCEPT, HTML_ACCEPT)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Authentication(format!(
                "login answered with HTTP {}",
                response.status()
            )));
        }
        let landing = response.text().await?;
        let user_name = verify_account_menu(&landing, &self.config.username)?;

        info!("Login into cumulus account");
        let response = self
            .client
            .get(&portal.cumulus_login_url)
            .header(ACCEPT, HTML_ACCEPT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Authentication(format!(
                "could not authenticate to cumulus (HTTP {})",
                response.status()
            )));
        }

        info!("Logged in as {}", user_name);
        self.user_name = Some(user_name);
        Ok(())
    }

    fn export_url(&self, format: &str) -> String {
        format!("{}/{}", self.config.portal.export_url.trim_end_matches('/'), format)
    }
}

#[async_trait]
impl ReceiptSource for MigrosClient {
    async fn listing_page(&self, period: &Period, page: u32) -> Result<String> {
        let portal = &self.config.portal;
        let (date_from, date_to) = period.query_dates();
        let page = page.to_string();
        let query = [
            ("sort", "dateDsc"),
            ("dateFrom", date_from.as_str()),
            ("dateTo", date_to.as_str()),
            ("p", page.as_str()),
        ];

        let response = fetch_with_retry(
            || {
                self.client
                    .get(&portal.receipts_url)
                    .query(&query)
                    .header(ACCEPT, "text/html, */*; q=0.01")
                    .header(ACCEPT_LANGUAGE, "de")
                    .header("x-requested-with", "XMLHttpRequest")
            },
            &portal.receipts_url,
            self.config.max_retries,
        )
        .await?;

        Ok(response.text().await?)
    }

    async fn receipt_html(&self, receipt_id: &str) -> Result<String> {
        let url = self.export_url("html");
        debug!("Export url: {}?receiptId={}", url, receipt_id);

        let response = fetch_with_retry(
            || {
                self.client
                    .get(&url)
                    .query(&[("receiptId", receipt_id)])
                    .header(ACCEPT, HTML_ACCEPT)
                    .header("referer", self.config.portal.referrer.as_str())
            },
            &url,
            self.config.max_retries,
        )
        .await?;

        Ok(response.text().await?)
    }

    async fn receipt_pdf(&self, receipt_id: &str) -> Result<Option<Vec<u8>>> {
        let url = self.export_url("pdf");

        let response = fetch_with_retry(
            || {
                self.client
                    .get(&url)
                    .query(&[("receiptId", receipt_id)])
                    .header("referer", self.config.portal.referrer.as_str())
            },
            &url,
            self.config.max_retries,
        )
        .await?;

        let bytes = response.bytes().await?;
        Ok(if bytes.is_empty() { None } else { Some(bytes.to_vec()) })
    }

    fn listing_base_url(&self) -> &str {
        &self.config.portal.receipts_url
    }
}
