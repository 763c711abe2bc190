//! Git 仓库交互模块
//!
//! 提供按版本读取文件内容、列出文件的功能。文件或版本不存在时返回空值而不是错误。

use crate::error::{ApiDriftError, Result};
use crate::snapshot::SOURCE_EXTENSION;
use gix::ThreadSafeRepository;
use std::path::PathBuf;
use tracing::{debug, warn};

/// 按版本访问源码的能力
pub trait RevisionSource {
    /// 获取文件在指定版本的内容，文件在该版本不存在时返回 `None`
    fn file_at(&self, revision: &str, path: &str) -> Option<String>;

    /// 列出指定版本下某个子目录中的所有 Python 源文件，任何失败都返回空列表
    fn list_files(&self, revision: &str, subtree: &str) -> Vec<String>;
}

/// 基于 gix 的 Git 版本源
pub struct GitRevisionSource {
    repo: ThreadSafeRepository,
}

impl GitRevisionSource {
    /// 打开 Git 仓库
    pub fn open(repo_path: impl Into<PathBuf>) -> Result<Self> {
        let repo_path = repo_path.into();
        let repo = ThreadSafeRepository::open(repo_path.clone()).map_err(|e| {
            ApiDriftError::GitError(format!(
                "Failed to open repository at {}: {}",
                repo_path.display(),
                e
            ))
        })?;

        Ok(Self { repo })
    }

    /// 将版本（标签、分支或提交）解析为树对象
    fn tree_at<'repo>(repo: &'repo gix::Repository, revision: &str) -> Result<gix::Tree<'repo>> {
        let id = repo.rev_parse_single(revision).map_err(|e| {
            ApiDriftError::GitError(format!("Failed to resolve revision {revision}: {e}"))
        })?;

        id.object()
            .map_err(|e| {
                ApiDriftError::GitError(format!("Failed to find object for {revision}: {e}"))
            })?
            .peel_to_tree()
            .map_err(|e| {
                ApiDriftError::GitError(format!("Failed to get tree for {revision}: {e}"))
            })
    }
}

impl RevisionSource for GitRevisionSource {
    fn file_at(&self, revision: &str, path: &str) -> Option<String> {
        let repo = self.repo.to_thread_local();

        let tree = match Self::tree_at(&repo, revision) {
            Ok(tree) => tree,
            Err(e) => {
                debug!("{}", e);
                return None;
            }
        };

        let entry = match tree.lookup_entry_by_path(path) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("{} does not exist at {}", path, revision);
                return None;
            }
            Err(e) => {
                debug!("Failed to look up {} at {}: {}", path, revision, e);
                return None;
            }
        };

        if !entry.mode().is_blob() {
            return None;
        }

        let object = entry.object().ok()?;
        Some(decode_source(&object.data))
    }

    fn list_files(&self, revision: &str, subtree: &str) -> Vec<String> {
        let repo = self.repo.to_thread_local();

        let tree = match Self::tree_at(&repo, revision) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Cannot list files at {}: {}", revision, e);
                return Vec::new();
            }
        };

        let entries = match tree.traverse().breadthfirst.files() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to traverse tree at {}: {}", revision, e);
                return Vec::new();
            }
        };

        let prefix = format!("{}/", subtree.trim_end_matches('/'));
        let mut files: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.mode.is_blob())
            .map(|entry| entry.filepath.to_string())
            .filter(|path| path.starts_with(&prefix) && path.ends_with(SOURCE_EXTENSION))
            .collect();
        files.sort();

        debug!("Found {} source files under {} at {}", files.len(), prefix, revision);
        files
    }
}

/// 解码文件内容：优先严格 UTF-8，失败时按 Latin-1 逐字节解码
pub fn decode_source(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
