//! 结果保存 - 业务能力层

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::fs;
use tracing::info;

/// 以缩进 JSON 写入文件，必要时创建父目录
pub async fn save_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, data: &T) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("无法创建目录: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(data)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("无法写入文件: {}", path.display()))?;

    let full_path = fs::canonicalize(path).await.unwrap_or_else(|_| path.to_path_buf());
    println!("\nFile saved @ {}", full_path.display());
    info!("💾 已保存: {}", full_path.display());
    Ok(full_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_json_creates_dirs() {
        let dir = std::env::temp_dir().join(format!("ocis_output_{}", std::process::id()));
        let path = dir.join("nested").join("2024_01_16.json");

        save_json(&path, &json!([{ "name": "DOE, JOHN" }])).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  {\n    \"name\": \"DOE, JOHN\""));
        std::fs::remove_dir_all(dir).ok();
    }
}
