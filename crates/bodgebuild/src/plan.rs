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

//! Ties resolution, expansion, ordering and synthesis together for one
//! `(target, platform)` pair.

use std::path::{Path, PathBuf};

use bodgeutil::platform::Platform;
use bodgeutil::project::{BuildTarget, PlatformConfig, ProjectConfig};
use serde::Serialize;
use tracing::debug;

use crate::cmd_builder::{CommandError, CommandLine, checked, make_compile_command};
use crate::deps::{OrderWarning, order_sources};
use crate::expand::expand_patterns;
use crate::resolve::resolve_effective;

#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub target: String,
    pub platform: Platform,
    /// Sources in build order.
    pub sources: Vec<PathBuf>,
    pub order_warnings: Vec<OrderWarning>,
    /// The resolved configuration the command was built from.
    pub config: PlatformConfig,
    pub output: String,
    pub command: CommandLine,
}

/// A serializable view of a plan, used by `list --json`.
#[derive(Debug, Serialize)]
pub struct BuildPlanSummary<'a> {
    pub target: &'a str,
    pub platform: Platform,
    pub output: &'a str,
    pub sources: Vec<String>,
    pub cxx_flags: &'a [String],
    pub include_dirs: &'a [String],
    pub library_dirs: &'a [String],
    pub libraries: &'a [String],
    pub command: String,
}

impl BuildPlan {
    pub fn summary(&self) -> BuildPlanSummary<'_> {
        BuildPlanSummary {
            target: &self.target,
            platform: self.platform,
            output: &self.output,
            sources: self
                .sources
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            cxx_flags: &self.config.cxx_flags,
            include_dirs: &self.config.include_dirs,
            library_dirs: &self.config.library_dirs,
            libraries: &self.config.libraries,
            command: self.command.to_string(),
        }
    }
}

/// Plans `target` for `platform`, with source patterns relative to `root`.
pub fn plan_target(
    project: &ProjectConfig,
    root: &Path,
    target: &BuildTarget,
    platform: &Platform,
) -> Result<BuildPlan, CommandError> {
    let config = resolve_effective(project, target, platform);
    // patterns are checked as written, before anything is dropped by expansion
    for pattern in &config.sources {
        checked("sources", pattern)?;
    }
    let files = expand_patterns(root, &config.sources);
    let order = order_sources(root, &files);
    debug!(
        "{} ({}): {} source(s), {} ordering warning(s)",
        target.name,
        platform,
        order.files.len(),
        order.warning_count()
    );
    let command = make_compile_command(&project.compiler, target, &config, &order.files, platform)?;
    Ok(BuildPlan {
        target: target.name.clone(),
        platform: *platform,
        output: target.output_file_name(&config.output_suffix, platform),
        sources: order.files,
        order_warnings: order.warnings,
        config,
        command,
    })
}

/// Platforms to build for: the one asked for on the command line, else the
/// project defaults, else the host.
pub fn platforms_for(project: &ProjectConfig, requested: Option<Platform>) -> Vec<Platform> {
    if let Some(platform) = requested {
        return vec![platform];
    }
    if !project.default_platforms.is_empty() {
        return project.default_platforms.clone();
    }
    vec![Platform::current()]
}

/// Every `(target, platform)` pair to build, in target declaration order.
pub fn build_pairs<'a>(
    project: &'a ProjectConfig,
    platforms: &[Platform],
) -> Vec<(&'a BuildTarget, Platform)> {
    let mut pairs = vec![];
    for target in project.targets.values() {
        for platform in platforms {
            if target.builds_for(platform) {
                pairs.push((target, *platform));
            } else {
                debug!("skipping {} for {}", target.name, platform);
            }
        }
    }
    pairs
}
