use sonarpipe_core::{
    CompletionBackend, Config, Error, PayloadError, Result, UpstreamRequest, UpstreamResponse,
};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PerplexityClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    api_key: String,
}

impl PerplexityClient {
    pub fn new(client: reqwest::Client, cfg: &Config) -> Self {
        Self {
            client,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(crate::http_client(cfg)?, cfg))
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Single POST; no retries.
    pub async fn chat_completions(&self, req: &UpstreamRequest) -> Result<UpstreamResponse> {
        let t0 = Instant::now();
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to parse error response".to_string());
            tracing::debug!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "perplexity chat.completions non-success"
            );
            return Err(Error::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
        let parsed = UpstreamResponse::from_slice(&bytes)?;
        tracing::debug!(
            model = %req.model,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            citations = parsed.citations.len(),
            related_questions = parsed.related_questions.len(),
            images = parsed.images.len(),
            "perplexity chat.completions ok"
        );
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl CompletionBackend for PerplexityClient {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    async fn complete(&self, req: &UpstreamRequest) -> Result<UpstreamResponse> {
        self.chat_completions(req).await
    }
}
