// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `git` binary adapter for [`GitClient`].
//!
//! Every invocation runs as `git -C <repo> ...` with output captured and a
//! per-operation timeout; a timed-out child is killed when dropped.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::domain::plugin::GitClient;

#[derive(Debug, Clone)]
pub struct GitTimeouts {
    pub fetch: Duration,
    pub reset: Duration,
    pub rev_parse: Duration,
    pub show: Duration,
}

impl Default for GitTimeouts {
    fn default() -> Self {
        Self {
            fetch: Duration::from_secs(30),
            reset: Duration::from_secs(15),
            rev_parse: Duration::from_secs(5),
            show: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GitCli {
    timeouts: GitTimeouts,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(timeouts: GitTimeouts) -> Self {
        Self { timeouts }
    }

    async fn run(&self, repo: &Path, args: &[&str], limit: Duration) -> Result<String> {
        tracing::debug!(repo = %repo.display(), ?args, "Running git");

        let child = Command::new("git")
            .arg("-C")
            .arg(repo)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(limit, child)
            .await
            .map_err(|_| anyhow!("git {} timed out after {:?}", args.join(" "), limit))?
            .with_context(|| format!("Failed to spawn git {}", args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl GitClient for GitCli {
    async fn fetch(&self, repo: &Path) -> Result<()> {
        self.run(repo, &["fetch", "origin"], self.timeouts.fetch).await?;
        Ok(())
    }

    async fn reset_hard(&self, repo: &Path, rev: &str) -> Result<()> {
        self.run(repo, &["reset", "--hard", rev], self.timeouts.reset).await?;
        Ok(())
    }

    async fn head_sha(&self, repo: &Path) -> Result<String> {
        let out = self.run(repo, &["rev-parse", "HEAD"], self.timeouts.rev_parse).await?;
        Ok(out.trim().to_string())
    }

    async fn show_file(&self, repo: &Path, rev: &str, path: &str) -> Result<String> {
        let spec = format!("{rev}:{path}");
        self.run(repo, &["show", &spec], self.timeouts.show).await
    }
}
