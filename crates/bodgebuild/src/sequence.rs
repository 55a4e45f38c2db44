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

//! Runs named sequences of build and file operations.

use std::path::Path;

use anyhow::{Context, bail};
use bodgeutil::common::BodgeOpt;
use bodgeutil::platform::Platform;
use bodgeutil::project::{Operation, OperationKind, ProjectConfig};
use colored::Colorize;
use tracing::debug;
use walkdir::WalkDir;

use crate::entry::build_target;

/// Runs the operations of sequence `name` in order, stopping at the first
/// failure. `build` steps build for `platform`.
pub fn run_sequence(
    project: &ProjectConfig,
    opt: &BodgeOpt,
    name: &str,
    platform: &Platform,
) -> anyhow::Result<()> {
    let Some(sequence) = project.sequences.get(name) else {
        bail!("sequence `{}` not found", name);
    };
    if !opt.quiet {
        eprintln!(
            "{} sequence `{}` ({} operation(s))",
            "Running".cyan().bold(),
            name,
            sequence.operations.len()
        );
    }
    for (i, op) in sequence.operations.iter().enumerate() {
        run_operation(project, opt, op, platform)
            .with_context(|| format!("sequence `{}` failed at step {} ({})", name, i + 1, describe(op)))?;
    }
    Ok(())
}

pub fn describe(op: &Operation) -> String {
    match (op.kind, &op.destination) {
        (OperationKind::Build, _) => format!("build {}", op.target),
        (OperationKind::Copy, Some(dst)) => format!("copy {} -> {}", op.target, dst),
        (OperationKind::Copy, None) => format!("copy {}", op.target),
        (OperationKind::Remove, _) => format!("remove {}", op.target),
        (OperationKind::Mkdir, _) => format!("mkdir {}", op.target),
    }
}

fn run_operation(
    project: &ProjectConfig,
    opt: &BodgeOpt,
    op: &Operation,
    platform: &Platform,
) -> anyhow::Result<()> {
    let root = &opt.project_dir;
    if op.kind != OperationKind::Build && opt.dry_run {
        println!("{}", describe(op));
        return Ok(());
    }
    debug!("sequence step: {}", describe(op));
    match op.kind {
        OperationKind::Build => {
            let stats = build_target(project, opt, &op.target, std::slice::from_ref(platform))?;
            if !stats.successful() {
                bail!("build of `{}` failed", op.target);
            }
        }
        OperationKind::Copy => {
            let Some(dst) = &op.destination else {
                bail!("copy of `{}` has no destination", op.target);
            };
            copy_path(&root.join(&op.target), &root.join(dst))?;
        }
        OperationKind::Remove => remove_path(&root.join(&op.target))?,
        OperationKind::Mkdir => {
            let dir = root.join(&op.target);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create `{}`", dir.display()))?;
        }
    }
    Ok(())
}

/// Copies a file, or a directory recursively, overwriting existing files.
pub fn copy_path(src: &Path, dst: &Path) -> anyhow::Result<()> {
    if src.is_file() {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        std::fs::copy(src, dst).with_context(|| {
            format!("failed to copy `{}` to `{}`", src.display(), dst.display())
        })?;
        return Ok(());
    }
    if !src.is_dir() {
        bail!("`{}` does not exist", src.display());
    }
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src)?;
        let to = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&to)
                .with_context(|| format!("failed to create `{}`", to.display()))?;
        } else {
            std::fs::copy(entry.path(), &to).with_context(|| {
                format!("failed to copy `{}` to `{}`", entry.path().display(), to.display())
            })?;
        }
    }
    Ok(())
}

/// Removes a file or directory tree. A missing path is not an error.
pub fn remove_path(path: &Path) -> anyhow::Result<()> {
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        debug!("`{}` does not exist, nothing to remove", path.display());
        return Ok(());
    };
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.with_context(|| format!("failed to remove `{}`", path.display()))
}
