use crate::models::court::{CourtDetail, CourtLookup, CourtPick};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 法院选择器列表文件名
pub const COURT_PICKER_FILE: &str = "courtPicker.json";
/// 法院查找表文件名
pub const LOOKUP_CODE_DETAILS_FILE: &str = "getLookupCodeDetails.json";

/// 从 JSON 文件加载一个数组
pub async fn load_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取JSON文件: {}", path.display()))?;

    let items: Vec<T> = serde_json::from_str(&content)
        .with_context(|| format!("无法解析JSON文件: {}", path.display()))?;

    Ok(items)
}

/// 加载法院选择器列表（列表模式的工作目录）
pub async fn load_court_picker(static_dir: &str) -> Result<Vec<CourtPick>> {
    let path = Path::new(static_dir).join(COURT_PICKER_FILE);
    let courts: Vec<CourtPick> = load_json_list(&path).await?;
    tracing::info!("成功加载 {} 个法院", courts.len());
    Ok(courts)
}

/// 加载 FIPS → 法院名称查找表
pub async fn load_court_lookup(static_dir: &str) -> Result<CourtLookup> {
    let path = Path::new(static_dir).join(LOOKUP_CODE_DETAILS_FILE);
    let details: Vec<CourtDetail> = load_json_list(&path).await?;
    let lookup = CourtLookup::new(details);
    tracing::info!("成功加载 {} 条法院查找记录", lookup.len());
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ocis_loader_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_static_lists() {
        let dir = temp_dir("ok");
        std::fs::write(
            dir.join(COURT_PICKER_FILE),
            r#"[{"court": "Accomack General District Court"}, {"court": "Albemarle General District Court"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join(LOOKUP_CODE_DETAILS_FILE),
            r#"[{"fipsCode4": "0011", "courtName": "Accomack General District Court"}]"#,
        )
        .unwrap();

        let static_dir = dir.to_string_lossy().to_string();
        let courts = load_court_picker(&static_dir).await.unwrap();
        assert_eq!(courts.len(), 2);
        assert_eq!(courts[1].court, "Albemarle General District Court");

        let lookup = load_court_lookup(&static_dir).await.unwrap();
        assert_eq!(lookup.court_name("0011"), Some("Accomack General District Court"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_list_is_error() {
        let dir = temp_dir("missing");
        let result = load_court_picker(&dir.to_string_lossy()).await;
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains(COURT_PICKER_FILE));
        std::fs::remove_dir_all(dir).ok();
    }
}
