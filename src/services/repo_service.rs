//! 题目仓库服务 - 业务能力层
//!
//! 负责题目仓库的 git 操作：克隆/拉取、写入题目目录、提交推送、列出和删除。
//! 所有写操作经同一把锁串行执行，保证题号分配和 git 状态不会交错。

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BusinessError, FileError, GitError};
use crate::models::{belt_dir_name, ProblemDraft};
use crate::utils::{redact_token, slugify};

/// 成功提交的题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedProblem {
    pub number: usize,
    pub folder: String,
}

pub struct RepoService {
    repo_url: String,
    token: String,
    repos_dir: PathBuf,
    git_user: Option<(String, String)>,
    lock: Mutex<()>,
}

impl RepoService {
    pub fn new(config: &Config) -> Self {
        let service = Self::with_paths(&config.repo_url, &config.github_token, &config.repos_dir);
        match (&config.git_user_name, &config.git_user_email) {
            (Some(name), Some(email)) => service.with_git_user(name, email),
            _ => service,
        }
    }

    pub fn with_paths(
        repo_url: impl Into<String>,
        token: impl Into<String>,
        repos_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            token: token.into(),
            repos_dir: repos_dir.into(),
            git_user: None,
            lock: Mutex::new(()),
        }
    }

    /// 指定提交使用的作者信息（不设置时使用本机 git 配置）
    pub fn with_git_user(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.git_user = Some((name.into(), email.into()));
        self
    }

    /// 仓库名，取 URL 最后一段并去掉 `.git`
    pub fn repo_name(&self) -> String {
        repo_name_from_url(&self.repo_url)
    }

    /// 本地克隆路径
    pub fn repo_path(&self) -> PathBuf {
        self.repos_dir.join(self.repo_name())
    }

    /// 写入新题目并提交推送
    pub async fn commit_problem(
        &self,
        belt: &str,
        draft: &ProblemDraft,
    ) -> AppResult<CommittedProblem> {
        validate_component("belt", belt)?;
        let _guard = self.lock.lock().await;
        self.sync().await?;

        let repo_path = self.repo_path();
        let base = self.head(&repo_path).await;
        let result = self.write_problem(&repo_path, belt, draft).await;
        if result.is_err() {
            self.rollback(&repo_path, base.as_deref()).await;
        }
        result
    }

    async fn write_problem(
        &self,
        repo_path: &Path,
        belt: &str,
        draft: &ProblemDraft,
    ) -> AppResult<CommittedProblem> {
        let belt_dir = repo_path.join(belt_dir_name(belt));
        tokio::fs::create_dir_all(&belt_dir)
            .await
            .map_err(|e| AppError::file_write_failed(belt_dir.display().to_string(), e))?;

        let number = next_problem_number(&list_subdirs(&belt_dir).await?);
        let folder = format!("{}-{}", number, slugify(&draft.title));
        let problem_dir = belt_dir.join(&folder);
        if tokio::fs::try_exists(&problem_dir).await.unwrap_or(true) {
            return Err(BusinessError::FolderExists(folder).into());
        }
        tokio::fs::create_dir_all(&problem_dir)
            .await
            .map_err(|e| AppError::file_write_failed(problem_dir.display().to_string(), e))?;

        write_file(&problem_dir.join("readme.md"), &draft.readme).await?;
        write_file(&problem_dir.join("solution.md"), &draft.solution).await?;

        let message = format!(
            "feat({}): Add problem #{} - '{}'",
            belt, number, draft.title
        );
        self.publish(repo_path, &message).await?;

        info!("✓ 已提交题目 #{} 到 {}/{}", number, belt, folder);
        Ok(CommittedProblem { number, folder })
    }

    /// 列出段位下已有的题目目录（排序）
    pub async fn list_problems(&self, belt: &str) -> AppResult<Vec<String>> {
        validate_component("belt", belt)?;
        let belt_dir = self.repo_path().join(belt_dir_name(belt));
        if !tokio::fs::try_exists(&belt_dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let mut problems = list_subdirs(&belt_dir).await?;
        problems.sort();
        Ok(problems)
    }

    /// 删除题目目录并提交推送
    pub async fn delete_problem(&self, belt: &str, folder: &str) -> AppResult<()> {
        validate_component("belt", belt)?;
        if validate_component("problem", folder).is_err() {
            return Err(BusinessError::InvalidFolder(folder.to_string()).into());
        }

        let _guard = self.lock.lock().await;
        self.sync().await?;

        let repo_path = self.repo_path();
        let base = self.head(&repo_path).await;
        let problem_dir = repo_path.join(belt_dir_name(belt)).join(folder);
        tokio::fs::remove_dir_all(&problem_dir).await.map_err(|source| {
            AppError::File(FileError::DeleteFailed {
                path: problem_dir.display().to_string(),
                source,
            })
        })?;

        let message = format!("chore({}): Delete problem '{}'", belt, folder);
        if let Err(e) = self.publish(&repo_path, &message).await {
            self.rollback(&repo_path, base.as_deref()).await;
            return Err(e);
        }

        info!("🗑️ 已删除题目 {}/{}", belt, folder);
        Ok(())
    }

    async fn publish(&self, repo_path: &Path, message: &str) -> AppResult<()> {
        self.git(Some(repo_path), &["add", "-A"]).await?;
        self.commit(repo_path, message).await?;
        self.git(Some(repo_path), &["push", "origin", "HEAD"]).await?;
        Ok(())
    }

    /// 当前提交；空仓库返回 `None`
    async fn head(&self, repo_path: &Path) -> Option<String> {
        self.git(Some(repo_path), &["rev-parse", "--verify", "-q", "HEAD"])
            .await
            .ok()
    }

    /// 写入或推送失败后把本地克隆恢复到操作前的提交
    ///
    /// 空仓库没有可回退的提交，直接删掉本地克隆，下次同步时重新克隆。
    async fn rollback(&self, repo_path: &Path, base: Option<&str>) {
        let restored = match base {
            Some(rev) => match self.git(Some(repo_path), &["reset", "--hard", rev]).await {
                Ok(_) => self.git(Some(repo_path), &["clean", "-fd"]).await.map(|_| ()),
                Err(e) => Err(e),
            },
            None => tokio::fs::remove_dir_all(repo_path).await.map_err(|source| {
                AppError::File(FileError::DeleteFailed {
                    path: repo_path.display().to_string(),
                    source,
                })
            }),
        };
        match restored {
            Ok(()) => warn!("↩️ 已回滚本地仓库到 {}", base.unwrap_or("初始状态")),
            Err(e) => error!("❌ 回滚本地仓库失败: {}", e),
        }
    }

    /// 本地没有克隆时克隆，否则快进拉取当前分支
    async fn sync(&self) -> AppResult<()> {
        let repo_path = self.repo_path();
        if !tokio::fs::try_exists(repo_path.join(".git")).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&self.repos_dir).await.map_err(|e| {
                AppError::file_write_failed(self.repos_dir.display().to_string(), e)
            })?;
            let remote = self.remote_url();
            let target = repo_path.display().to_string();
            info!("📥 克隆仓库 {}", redact_token(&remote, &self.token));
            return self.git(None, &["clone", &remote, &target]).await.map(|_| ());
        }

        let branch = self
            .git(Some(&repo_path), &["symbolic-ref", "--short", "HEAD"])
            .await?;
        let remote_heads = self
            .git(Some(&repo_path), &["ls-remote", "--heads", "origin", &branch])
            .await?;
        if remote_heads.is_empty() {
            debug!("远端尚无分支 {}，跳过拉取", branch);
            return Ok(());
        }
        self.git(Some(&repo_path), &["pull", "--ff-only", "origin", &branch])
            .await
            .map(|_| ())
    }

    async fn commit(&self, repo_path: &Path, message: &str) -> AppResult<String> {
        let mut args: Vec<String> = Vec::new();
        if let Some((name, email)) = &self.git_user {
            args.push("-c".into());
            args.push(format!("user.name={}", name));
            args.push("-c".into());
            args.push(format!("user.email={}", email));
        }
        args.extend(["commit".to_string(), "-m".to_string(), message.to_string()]);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.git(Some(repo_path), &args).await
    }

    /// 带令牌的远端地址（仅 https 地址且配置了令牌时）
    fn remote_url(&self) -> String {
        match self.repo_url.strip_prefix("https://") {
            Some(rest) if !self.token.is_empty() => {
                format!("https://x-access-token:{}@{}", self.token, rest)
            }
            _ => self.repo_url.clone(),
        }
    }

    /// 执行 git 命令并返回去掉首尾空白的标准输出
    async fn git(&self, cwd: Option<&Path>, args: &[&str]) -> AppResult<String> {
        let command = redact_token(&args.join(" "), &self.token);
        debug!("git {}", command);

        let mut cmd = Command::new("git");
        cmd.args(args).env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| GitError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(GitError::CommandFailed {
                command,
                stderr: redact_token(detail.trim(), &self.token),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

pub fn repo_name_from_url(url: &str) -> String {
    let tail = url.rsplit(':').next().unwrap_or(url);
    let name = tail.rsplit('/').next().unwrap_or(tail);
    name.trim_end_matches(".git").to_string()
}

/// 下一个题号：取目录数量与已有最大题号中较大者加一
///
/// 删除过题目后只按数量计数会与已有目录重名。
fn next_problem_number(folders: &[String]) -> usize {
    let highest = folders
        .iter()
        .filter_map(|name| name.split('-').next()?.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    folders.len().max(highest) + 1
}

/// 段位名、题目目录名不能包含路径分隔符或 `..`
fn validate_component(field: &str, value: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.contains(['/', '\\'])
        || trimmed.contains("..")
        || trimmed == "."
    {
        return Err(BusinessError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into());
    }
    Ok(())
}

async fn list_subdirs(dir: &Path) -> AppResult<Vec<String>> {
    let path = dir.display().to_string();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::file_read_failed(path.clone(), e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(path.clone(), e))?
    {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(names)
}

async fn write_file(path: &Path, content: &str) -> AppResult<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
}
