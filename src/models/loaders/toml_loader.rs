use crate::error::{AppError, AppResult, FileError};
use crate::models::sheet::GradingSheet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载答题卡
pub async fn load_toml_to_grading_sheet(toml_file_path: &Path) -> AppResult<GradingSheet> {
    let path = toml_file_path.to_string_lossy().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path, e))?;

    let sheet: GradingSheet = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
        path: path.clone(),
        source: Box::new(e),
    })?;

    Ok(sheet.with_file_path(path))
}

/// 从文件夹中加载所有答题卡
///
/// 单个文件解析失败只记录警告，不影响其他文件；返回结果按文件名排序
pub async fn load_all_toml_files(folder_path: &str) -> AppResult<Vec<GradingSheet>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut sheets = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_toml_to_grading_sheet(&path).await {
            Ok(sheet) => {
                tracing::info!("成功加载 {} 道题", sheet.items.len());
                sheets.push(sheet);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerKind, CanonicalAnswer, SubmittedAnswer};

    const SHEET: &str = r#"
name = "第三单元测验"

[[items]]
id = "q1"
canonical = { kind = "numeric", value = 9.81, units = "m/s^2" }
submission = { kind = "numeric", value = "9.8", units = "m/s^2" }

[[items]]
id = "q2"
canonical = "B"
submission = "B"

[[items]]
id = "q3"
canonical = { kind = "algebraic", expression = "x^2 + 4x + 4", synonyms = ["(x+2)^2"] }
image_url = "https://example.com/q3.png"
"#;

    #[test]
    fn test_parse_sheet() {
        let sheet: GradingSheet = toml::from_str(SHEET).unwrap();
        assert_eq!(sheet.name, "第三单元测验");
        assert_eq!(sheet.items.len(), 3);

        let q1 = &sheet.items[0];
        assert_eq!(
            q1.canonical,
            CanonicalAnswer::Numeric {
                value: "9.81".to_string(),
                units: Some("m/s^2".to_string()),
                tolerance: None
            }
        );
        assert_eq!(
            q1.submission.as_ref().map(|s| s.answer.clone()),
            Some(SubmittedAnswer::Numeric {
                value: "9.8".to_string(),
                units: Some("m/s^2".to_string())
            })
        );

        assert_eq!(sheet.items[1].canonical.kind(), AnswerKind::MultipleChoice);
        assert!(sheet.items[2].submission.is_none());
        assert_eq!(
            sheet.items[2].image_url.as_deref(),
            Some("https://example.com/q3.png")
        );
    }

    #[tokio::test]
    async fn test_load_all_skips_broken_files() {
        let dir = std::env::temp_dir().join(format!("answer_grader_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join("a.toml"), SHEET).await.unwrap();
        fs::write(dir.join("b.toml"), "name = ").await.unwrap();
        fs::write(dir.join("notes.txt"), "ignored").await.unwrap();

        let sheets = load_all_toml_files(dir.to_str().unwrap()).await.unwrap();
        assert_eq!(sheets.len(), 1);
        assert!(sheets[0].file_path.as_deref().unwrap().ends_with("a.toml"));

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let err = load_all_toml_files("/definitely/not/here").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::DirectoryNotFound { .. })
        ));
    }
}
