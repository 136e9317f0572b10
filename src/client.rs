//! Typed HTTP client for the InfraScan daemon REST API.

use anyhow::{bail, Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::rest::Health;
use crate::domain::types::{JumpServerConfig, ServerRecord};

pub struct InfrascanClient {
    base_url: String,
    http: Client,
}

/// CSV export as served by the daemon.
pub struct Export {
    pub filename: String,
    pub csv: String,
}

impl InfrascanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn health(&self) -> Result<Health> {
        self.get("/health").await
    }

    /// Filtered server list; `record` also stores the query in search history.
    pub async fn servers(&self, query: &str, record: bool) -> Result<Vec<ServerRecord>> {
        let req = self
            .request(Method::GET, "/api/v1/servers")
            .query(&[("q", query), ("record", if record { "true" } else { "false" })]);
        self.send(req).await
    }

    pub async fn server(&self, id: &str) -> Result<ServerRecord> {
        self.get(&format!("/api/v1/servers/{}", id)).await
    }

    pub async fn add_server(&self, record: &ServerRecord) -> Result<ServerRecord> {
        self.post_json("/api/v1/servers", record).await
    }

    pub async fn remove_server(&self, id: &str) -> Result<ServerRecord> {
        let req = self
            .request(Method::DELETE, &format!("/api/v1/servers/{}", id))
            .query(&[("confirm", "true")]);
        self.send(req).await
    }

    pub async fn history(&self) -> Result<Vec<String>> {
        self.get("/api/v1/history").await
    }

    pub async fn clear_history(&self) -> Result<()> {
        let url = self.url("/api/v1/history");
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("DELETE {}", url))?;
        if !resp.status().is_success() {
            bail!("{} returned {}", url, resp.status());
        }
        Ok(())
    }

    pub async fn jump_host(&self) -> Result<JumpServerConfig> {
        self.get("/api/v1/jump-host").await
    }

    pub async fn save_jump_host(&self, config: &JumpServerConfig) -> Result<JumpServerConfig> {
        let req = self.request(Method::PUT, "/api/v1/jump-host").json(config);
        self.send(req).await
    }

    pub async fn export(&self) -> Result<Export> {
        let url = self.url("/api/v1/export");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        if !resp.status().is_success() {
            bail!("{} returned {}", url, resp.status());
        }

        let filename = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| "inventory_export.csv".to_string());
        let csv = resp
            .text()
            .await
            .with_context(|| format!("reading response from {}", url))?;
        Ok(Export { filename, csv })
    }

    // ── Internal helpers ───────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let req = req.build().context("building request")?;
        let label = format!("{} {}", req.method(), req.url());
        let resp = self
            .http
            .execute(req)
            .await
            .with_context(|| label.clone())?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            if detail.is_empty() {
                bail!("{} returned {}", label, status);
            }
            bail!("{} returned {}: {}", label, status, detail);
        }

        resp.json()
            .await
            .with_context(|| format!("parsing response from {}", label))
    }
}

fn filename_from_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    Some(rest.trim_matches('"').to_string()).filter(|f| !f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"inventory_export_2026-10-19.csv\"")
                .as_deref(),
            Some("inventory_export_2026-10-19.csv")
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = InfrascanClient::new("http://127.0.0.1:9200/").unwrap();
        assert_eq!(client.url("/health"), "http://127.0.0.1:9200/health");
    }
}
