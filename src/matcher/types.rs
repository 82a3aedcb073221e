use serde::{Deserialize, Serialize};

/// マスタ表のキー列（B列）
pub const MASTER_KEY_COLUMN: usize = 1;

/// 1チャンクあたりの既定行数
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// 出力フィールド → マスタ表の列位置（0始まり）
///
/// 既定値はマスタ表の固定レイアウト（D, E, G, H, M列）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSpecs {
    pub item: usize,
    pub model: usize,
    pub location: usize,
    pub status: usize,
    pub internal_id: usize,
}

impl Default for FieldSpecs {
    fn default() -> Self {
        Self {
            item: 3,
            model: 4,
            location: 6,
            status: 7,
            internal_id: 12,
        }
    }
}

impl FieldSpecs {
    /// 照合で取り出す列位置（item, model, location, status, internal_id の順）
    pub fn columns(&self) -> [usize; 5] {
        [self.item, self.model, self.location, self.status, self.internal_id]
    }
}

/// 照合エンジン設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// 並列ワーカー数（1なら逐次処理）
    pub workers: usize,
    pub chunk_size: usize,
    pub fields: FieldSpecs,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: super::pool::default_workers(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            fields: FieldSpecs::default(),
        }
    }
}
