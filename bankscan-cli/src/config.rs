use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_bankscan_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ocr: OcrSection,
    #[serde(default)]
    pub parse: ParseSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    /// Table recognition endpoint (form POST, base64 `image`)
    pub table_endpoint: String,
    /// Text-understanding endpoint used to tag bank-card entities in header
    /// text. Unset disables the entity strategy.
    pub entity_endpoint: Option<String>,
    /// Environment variable holding a ready access token
    pub token_env: String,
    /// Environment variables holding an API key / secret pair, exchanged at
    /// `token_endpoint` when no ready token is set
    pub api_key_env: String,
    pub secret_key_env: String,
    pub token_endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSection {
    /// Layout used when `parse` is run without `--layout`
    pub default_layout: Option<String>,
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            table_endpoint: "https://aip.baidubce.com/rest/2.0/ocr/v1/table".to_string(),
            entity_endpoint: Some("https://aip.baidubce.com/rpc/2.0/nlp/v1/lexer".to_string()),
            token_env: "BANKSCAN_OCR_TOKEN".to_string(),
            api_key_env: "BAIDU_API_KEY".to_string(),
            secret_key_env: "BAIDU_SECRET_KEY".to_string(),
            token_endpoint: "https://aip.baidubce.com/oauth/2.0/token".to_string(),
            timeout_secs: 30,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_bankscan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config()?;
    let source = if p.exists() { "file" } else { "defaults" };
    println!("# {} ({source})", p.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
