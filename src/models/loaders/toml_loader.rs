use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::design::DesignRequest;
use crate::models::question::BankFile;

/// 从 TOML 文件加载一个题库导入文件
pub async fn load_bank_file(toml_file_path: &Path) -> Result<BankFile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let bank: BankFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(bank)
}

/// 从 TOML 文件加载一个设计请求
pub async fn load_design_request(toml_file_path: &Path) -> Result<DesignRequest> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let request: DesignRequest = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(request)
}

/// 从文件夹中加载所有题库 TOML 文件
pub async fn load_all_bank_files(folder_path: &str) -> Result<Vec<BankFile>> {
    let mut banks = Vec::new();
    for path in list_toml_files(folder_path).await? {
        tracing::info!(
            "正在加载题库文件: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        match load_bank_file(&path).await {
            Ok(bank) => {
                tracing::info!("成功加载 {} 道题目", bank.questions.len());
                banks.push(bank);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }
    Ok(banks)
}

/// 从文件夹中加载所有设计请求 TOML 文件
pub async fn load_all_design_requests(folder_path: &str) -> Result<Vec<DesignRequest>> {
    let mut requests = Vec::new();
    for path in list_toml_files(folder_path).await? {
        tracing::info!(
            "正在加载设计请求: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        match load_design_request(&path).await {
            Ok(request) => requests.push(request),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }
    Ok(requests)
}

/// 列出文件夹下所有 .toml 文件
async fn list_toml_files(folder_path: &str) -> Result<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }

    toml_files.sort();
    Ok(toml_files)
}
