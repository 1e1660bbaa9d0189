//! Remote triage caller with a local fallback.
//!
//! Any failure talking to the remote service (transport error, non-2xx
//! status, undecodable body) is logged and answered by the in-process engine,
//! so callers always get a response.

use std::time::Duration;

use carepath_common::config::ClientConfig;
use carepath_common::{TriageRequest, TriageResponse};
use carepath_triage::TriageEngine;

#[derive(Debug, Clone)]
struct Remote {
    http: reqwest::Client,
    url: String,
}

#[derive(Debug, Clone)]
pub struct TriageClient {
    remote: Option<Remote>,
    engine: TriageEngine,
}

impl TriageClient {
    pub fn new(cfg: &ClientConfig, engine: TriageEngine) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        let url = format!("{}/triage/recommendations", cfg.base_url.trim_end_matches('/'));
        Ok(Self { remote: Some(Remote { http, url }), engine })
    }

    /// A client that never leaves the process.
    pub fn local(engine: TriageEngine) -> Self {
        Self { remote: None, engine }
    }

    pub async fn triage(&self, req: &TriageRequest) -> TriageResponse {
        let Some(remote) = &self.remote else {
            return self.engine.triage(req);
        };
        match Self::call(remote, req).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(url = %remote.url, error = %e, "Remote triage failed; using local engine");
                self.engine.triage(req)
            }
        }
    }

    async fn call(remote: &Remote, req: &TriageRequest) -> anyhow::Result<TriageResponse> {
        let resp = remote
            .http
            .post(&remote.url)
            .json(req)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<TriageResponse>().await?)
    }
}
