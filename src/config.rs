use crate::error::{LookupError, Result};
use crate::matcher::{default_workers, EngineConfig, FieldSpecs, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ワーカー数を上書きする環境変数
pub const WORKERS_ENV: &str = "STOCK_LOOKUP_WORKERS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 並列ワーカー数（未設定なら CPU数-1）
    pub workers: Option<usize>,
    /// 1チャンクあたりの行数
    pub chunk_size: usize,
    /// マスタ表の出力列位置
    pub fields: FieldSpecs,
    /// 読み込むシート（番号または名前、未設定なら先頭）
    pub sheet: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LookupError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("stock-lookup").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            workers: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            fields: FieldSpecs::default(),
            sheet: None,
        }
    }

    /// 実際に使うワーカー数
    pub fn resolved_workers(&self) -> Result<usize> {
        // 環境変数を優先
        if let Ok(value) = std::env::var(WORKERS_ENV) {
            return parse_workers(&value);
        }

        Ok(self.workers.unwrap_or_else(default_workers).max(1))
    }

    pub fn set_workers(&mut self, workers: usize) -> Result<()> {
        if workers == 0 {
            return Err(LookupError::Config("ワーカー数は1以上を指定してください".into()));
        }
        self.workers = Some(workers);
        self.save()
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) -> Result<()> {
        if chunk_size == 0 {
            return Err(LookupError::Config("チャンクサイズは1以上を指定してください".into()));
        }
        self.chunk_size = chunk_size;
        self.save()
    }

    /// 照合エンジン設定に変換
    pub fn engine(&self) -> Result<EngineConfig> {
        if self.chunk_size == 0 {
            return Err(LookupError::Config("チャンクサイズは1以上を指定してください".into()));
        }
        Ok(EngineConfig {
            workers: self.resolved_workers()?,
            chunk_size: self.chunk_size,
            fields: self.fields.clone(),
        })
    }
}

fn parse_workers(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LookupError::Config(format!(
            "{} の値が不正です: {}",
            WORKERS_ENV, value
        ))),
    }
}
