//! HTTP OCR / text-understanding collaborator.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine as _;
use bankscan_core::Entity;
use bankscan_ingest::{EntityRecognizer, OcrEngine};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::OcrSection;

pub struct HttpOcr {
    client: reqwest::Client,
    table_endpoint: String,
    entity_endpoint: Option<String>,
    token: String,
}

// The CLI runs under #[tokio::main]: reuse the running runtime through
// block_in_place, a nested runtime would panic.
fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
    } else {
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        Ok(rt.block_on(fut))
    }
}

impl HttpOcr {
    pub fn from_config(cfg: &OcrSection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build HTTP client")?;
        let token = block_on(resolve_token(&client, cfg))??;
        Ok(Self {
            client,
            table_endpoint: cfg.table_endpoint.clone(),
            entity_endpoint: cfg.entity_endpoint.clone(),
            token,
        })
    }

    pub fn has_entity_endpoint(&self) -> bool {
        self.entity_endpoint.is_some()
    }

    async fn recognize_table_async(&self, image: &[u8]) -> Result<Value> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let resp = self
            .client
            .post(&self.table_endpoint)
            .query(&[("access_token", self.token.as_str())])
            .form(&[("image", encoded)])
            .send()
            .await
            .context("table recognition request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("table recognition error: {status} {txt}");
        }
        resp.json().await.context("parse table recognition response")
    }

    async fn recognize_entities_async(&self, endpoint: &str, text: &str) -> Result<Vec<Entity>> {
        let resp = self
            .client
            .post(endpoint)
            .query(&[("access_token", self.token.as_str())])
            .json(&json!({ "text": text }))
            .send()
            .await
            .context("entity recognition request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("entity recognition error: {status} {txt}");
        }
        let body: Value = resp.json().await.context("parse entity recognition response")?;
        entities_from(&body)
    }
}

impl OcrEngine for HttpOcr {
    fn recognize_table(&self, image: &[u8]) -> bankscan_core::Result<Value> {
        block_on(self.recognize_table_async(image))
            .and_then(|r| r)
            .map_err(|e| bankscan_core::Error::Ocr(format!("{e:#}")))
    }
}

impl EntityRecognizer for HttpOcr {
    fn recognize(&self, text: &str) -> bankscan_core::Result<Vec<Entity>> {
        let Some(endpoint) = self.entity_endpoint.as_deref() else {
            return Ok(Vec::new());
        };
        block_on(self.recognize_entities_async(endpoint, text))
            .and_then(|r| r)
            .map_err(|e| bankscan_core::Error::Ocr(format!("{e:#}")))
    }
}

/// A ready token from the environment, or a client-credentials exchange.
async fn resolve_token(client: &reqwest::Client, cfg: &OcrSection) -> Result<String> {
    if let Some(token) = env_value(&cfg.token_env) {
        return Ok(token);
    }

    let (Some(key), Some(secret)) = (env_value(&cfg.api_key_env), env_value(&cfg.secret_key_env)) else {
        bail!(
            "no OCR credentials: set {} or both {} and {}",
            cfg.token_env,
            cfg.api_key_env,
            cfg.secret_key_env
        );
    };

    #[derive(Deserialize)]
    struct TokenResp {
        access_token: Option<String>,
        error_description: Option<String>,
    }

    tracing::debug!(endpoint = %cfg.token_endpoint, "exchanging API key for access token");
    let resp: TokenResp = client
        .post(&cfg.token_endpoint)
        .query(&[
            ("grant_type", "client_credentials"),
            ("client_id", key.as_str()),
            ("client_secret", secret.as_str()),
        ])
        .send()
        .await
        .context("token request")?
        .json()
        .await
        .context("parse token response")?;

    resp.access_token.ok_or_else(|| {
        anyhow!(
            "token exchange refused: {}",
            resp.error_description.unwrap_or_else(|| "no reason given".into())
        )
    })
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Entities from a lexer-style response: `{"items": [{"item": .., "ne": ..}]}`.
fn entities_from(body: &Value) -> Result<Vec<Entity>> {
    if let Some(code) = body.get("error_code") {
        let msg = body.get("error_msg").and_then(Value::as_str).unwrap_or("unknown error");
        bail!("entity recognition error: {msg} (code {code})");
    }

    let items = body.get("items").and_then(Value::as_array);
    Ok(items
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let kind = item
                .get("type")
                .or_else(|| item.get("ne"))
                .and_then(Value::as_str)?;
            let text = item.get("item").and_then(Value::as_str)?;
            (!kind.is_empty()).then(|| Entity {
                kind: kind.to_string(),
                text: text.to_string(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_from_lexer_items() {
        let body = json!({
            "items": [
                {"item": "工商银行", "ne": "ORG"},
                {"item": "6222020200112230", "type": "BANK_CARD"},
                {"item": "的", "ne": ""}
            ]
        });
        let found = entities_from(&body).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[1].is_bank_card());
        assert_eq!(found[1].text, "6222020200112230");
    }

    #[test]
    fn test_entities_error_code() {
        let body = json!({"error_code": 110, "error_msg": "Access token invalid"});
        assert!(entities_from(&body).is_err());
        assert!(entities_from(&json!({})).unwrap().is_empty());
    }
}
