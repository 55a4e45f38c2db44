// bodge: A minimal build-description tool for C and C++ projects.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

//! Git dependency fetching.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, bail};
use bodgeutil::common::BodgeOpt;
use bodgeutil::project::ProjectConfig;
use colored::Colorize;
use tracing::{debug, info};

use crate::cmd_builder::{CommandError, is_safe_argument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitAction {
    Clone,
    Pull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStep {
    pub url: String,
    /// Relative to the project directory, as written in the project file.
    pub path: String,
    pub action: GitAction,
}

impl FetchStep {
    pub fn git_args(&self, root: &Path) -> Vec<String> {
        let dir = root.join(&self.path).display().to_string();
        match self.action {
            GitAction::Clone => vec!["clone".into(), self.url.clone(), dir],
            GitAction::Pull => vec!["-C".into(), dir, "pull".into()],
        }
    }
}

pub fn is_git_work_tree(path: &Path) -> bool {
    if !path.join(".git").exists() {
        return false;
    }
    let status = Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .current_dir(path)
        .status();
    match status {
        Ok(out) => out.success(),
        _ => false,
    }
}

/// Decides clone or pull for every dependency, after validating the lists.
pub fn plan_fetch(project: &ProjectConfig, root: &Path) -> anyhow::Result<Vec<FetchStep>> {
    let deps = &project.dependencies;
    deps.validate()?;
    let mut steps = vec![];
    for (url, path) in deps.urls.iter().zip(&deps.paths) {
        if !is_safe_argument(url) {
            return Err(CommandError::UnsafeArgument {
                field: "dependencies_url",
                token: url.clone(),
            }
            .into());
        }
        if !is_safe_argument(path) {
            return Err(CommandError::UnsafeArgument {
                field: "dependencies_path",
                token: path.clone(),
            }
            .into());
        }
        let action = if is_git_work_tree(&root.join(path)) {
            GitAction::Pull
        } else {
            GitAction::Clone
        };
        steps.push(FetchStep {
            url: url.clone(),
            path: path.clone(),
            action,
        });
    }
    Ok(steps)
}

/// Clones or updates every dependency. Returns how many were processed.
pub fn fetch_dependencies(project: &ProjectConfig, opt: &BodgeOpt) -> anyhow::Result<usize> {
    let root = &opt.project_dir;
    let steps = plan_fetch(project, root)?;
    if steps.is_empty() {
        return Ok(0);
    }
    if opt.dry_run {
        for step in &steps {
            println!("git {}", step.git_args(root).join(" "));
        }
        return Ok(steps.len());
    }

    let git = which::which("git").context("`git` is required to fetch dependencies but was not found in PATH")?;
    for step in &steps {
        if !opt.quiet {
            eprintln!("{} {}", "Fetching".cyan().bold(), step.url);
        }
        run_git(&git, &step.git_args(root))?;
        if project.dependencies.run_bodge_after_clone {
            run_bodge_in(&root.join(&step.path))?;
        }
    }
    info!("fetched {} dependencies", steps.len());
    Ok(steps.len())
}

fn run_git(git: &Path, args: &[String]) -> anyhow::Result<()> {
    debug!("git {}", args.join(" "));
    let status = Command::new(git)
        .args(args)
        .status()
        .context("failed to run git")?;
    if !status.success() {
        bail!("`git {}` failed with {}", args.join(" "), status);
    }
    Ok(())
}

fn run_bodge_in(dir: &Path) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("failed to locate the bodge executable")?;
    debug!("running {} in {}", exe.display(), dir.display());
    let status = Command::new(&exe)
        .current_dir(dir)
        .status()
        .with_context(|| format!("failed to run bodge in `{}`", dir.display()))?;
    if !status.success() {
        bail!("bodge in `{}` exited with {}", dir.display(), status);
    }
    Ok(())
}
