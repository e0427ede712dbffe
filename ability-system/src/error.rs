use thiserror::Error;

/// 配置載入錯誤
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("讀取配置檔失敗: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析失敗: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML 解析失敗: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("不支援的檔案格式: {0}")]
    UnsupportedFormat(String),

    #[error("未註冊的配置表: {0}")]
    UnknownTable(String),

    #[error("{table} 重複的 id: {id}")]
    Duplicate { table: &'static str, id: u32 },

    #[error("{table} id {id} 配置不合法: {reason}")]
    Invalid {
        table: &'static str,
        id: u32,
        reason: String,
    },
}
