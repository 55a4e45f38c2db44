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

use std::time::{Duration, Instant};

use anyhow::Context;
use bodgeutil::common::BodgeOpt;
use bodgeutil::platform::Platform;
use bodgeutil::project::{BuildTarget, ProjectConfig};
use colored::Colorize;
use tracing::{debug, info};

use crate::exec::run_command_line;
use crate::plan::{build_pairs, plan_target};

#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub built: usize,
    /// `target (platform)` of every pair that failed.
    pub failed: Vec<String>,
    pub elapsed: Duration,
}

impl BuildStats {
    pub fn successful(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn return_code(&self) -> i32 {
        if self.successful() { 0 } else { 1 }
    }

    pub fn print_summary(&self, quiet: bool) {
        if quiet {
            return;
        }
        let ms = self.elapsed.as_millis();
        if self.successful() {
            let plural = if self.built == 1 { "" } else { "s" };
            eprintln!(
                "{} bodge: built {} target{} in {}ms",
                "Finished.".green().bold(),
                self.built,
                plural,
                ms
            );
        } else {
            eprintln!(
                "{} bodge: {} of {} build(s) failed in {}ms: {}",
                "Failed.".red().bold(),
                self.failed.len(),
                self.built + self.failed.len(),
                ms,
                self.failed.join(", ")
            );
        }
    }
}

/// Builds one target for every platform it is configured for.
pub fn build_target(
    project: &ProjectConfig,
    opt: &BodgeOpt,
    name: &str,
    platforms: &[Platform],
) -> anyhow::Result<BuildStats> {
    let target = project.validate_target(name)?;
    let start = Instant::now();
    let mut stats = BuildStats::default();
    for platform in platforms {
        if !target.builds_for(platform) {
            info!("skipping target `{}` on {}", name, platform);
            if !opt.quiet {
                eprintln!(
                    "Skipping target '{}': not configured for platform {}",
                    name, platform
                );
            }
            continue;
        }
        record(&mut stats, target, platform, build_pair(project, opt, target, platform));
    }
    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// Builds every target for every platform, continuing past failures.
pub fn build_all(
    project: &ProjectConfig,
    opt: &BodgeOpt,
    platforms: &[Platform],
) -> anyhow::Result<BuildStats> {
    project.validate()?;
    let start = Instant::now();
    let mut stats = BuildStats::default();
    for (target, platform) in build_pairs(project, platforms) {
        record(&mut stats, target, &platform, build_pair(project, opt, target, &platform));
    }
    stats.elapsed = start.elapsed();
    Ok(stats)
}

fn record(
    stats: &mut BuildStats,
    target: &BuildTarget,
    platform: &Platform,
    result: anyhow::Result<()>,
) {
    match result {
        Ok(()) => stats.built += 1,
        Err(e) => {
            eprintln!("{}: {:?}", "error".red().bold(), e);
            stats.failed.push(format!("{} ({})", target.name, platform));
        }
    }
}

fn build_pair(
    project: &ProjectConfig,
    opt: &BodgeOpt,
    target: &BuildTarget,
    platform: &Platform,
) -> anyhow::Result<()> {
    if !opt.quiet {
        eprintln!("{} {} ({})", "Building:".cyan().bold(), target.name, platform);
    }
    let plan = plan_target(project, &opt.project_dir, target, platform)
        .with_context(|| format!("failed to plan `{}` for {}", target.name, platform))?;
    if !opt.quiet {
        for warning in &plan.order_warnings {
            eprintln!("{}: {}", "Warning".yellow().bold(), warning);
        }
    }

    let line = plan.command.to_string();
    if opt.dry_run {
        println!("{}", line);
        return Ok(());
    }

    let start = Instant::now();
    let status = run_command_line(&line, &opt.project_dir)?;
    if !status.success() {
        anyhow::bail!("compiler exited with {} while building `{}`", status, target.name);
    }
    debug!("{} built in {:?}", plan.output, start.elapsed());
    if !opt.quiet {
        eprintln!(
            "{} {} in {}ms",
            "Built".green().bold(),
            plan.output,
            start.elapsed().as_millis()
        );
    }
    Ok(())
}
