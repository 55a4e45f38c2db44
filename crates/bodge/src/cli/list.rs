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

use anyhow::Context;
use bodgebuild::plan::{BuildPlanSummary, plan_target, platforms_for};
use bodgeutil::cli::UniversalFlags;
use bodgeutil::platform::Platform;
use bodgeutil::project::{BuildTarget, ProjectConfig, Sequence};
use serde::Serialize;

use super::load_project;

/// Show targets, sequences and the resolved build of each target
#[derive(Debug, clap::Parser)]
pub struct ListSubcommand {
    /// Print the listing as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    name: &'a str,
    compiler: &'a str,
    default_platforms: &'a [Platform],
    platform: Platform,
    targets: Vec<&'a BuildTarget>,
    sequences: Vec<&'a Sequence>,
    builds: Vec<BuildPlanSummary<'a>>,
    errors: Vec<String>,
}

pub fn run_list(flags: &UniversalFlags, cmd: &ListSubcommand) -> anyhow::Result<i32> {
    let (project, opt) = load_project(flags)?;
    project.validate()?;
    let platform = flags
        .requested_platform()
        .unwrap_or_else(|| platforms_for(&project, None)[0]);

    let mut plans = vec![];
    let mut errors = vec![];
    for target in project.targets.values() {
        if !target.builds_for(&platform) {
            continue;
        }
        match plan_target(&project, &opt.project_dir, target, &platform) {
            Ok(plan) => plans.push(plan),
            Err(e) => errors.push(format!("{}: {}", target.name, e)),
        }
    }

    if cmd.json {
        let output = ListOutput {
            name: &project.name,
            compiler: &project.compiler,
            default_platforms: &project.default_platforms,
            platform,
            targets: project.targets.values().collect(),
            sequences: project.sequences.values().collect(),
            builds: plans.iter().map(|p| p.summary()).collect(),
            errors,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("failed to serialize listing")?
        );
        return Ok(0);
    }

    print_overview(&project);
    println!();
    println!("resolved for {}:", platform);
    for plan in &plans {
        let summary = plan.summary();
        println!("  {} -> {}", summary.target, summary.output);
        print_field("sources", &summary.sources);
        print_field("cxx_flags", summary.cxx_flags);
        print_field("include_dirs", summary.include_dirs);
        print_field("library_dirs", summary.library_dirs);
        print_field("libraries", summary.libraries);
    }
    for error in &errors {
        println!("  error: {}", error);
    }
    Ok(0)
}

fn print_field(name: &str, items: &[String]) {
    if items.is_empty() {
        println!("    {}:", name);
    } else {
        println!("    {}: {}", name, items.join(" "));
    }
}

fn print_overview(project: &ProjectConfig) {
    if !project.name.is_empty() {
        println!("project: {}", project.name);
    }
    println!("compiler: {}", project.compiler);
    if project.default_platforms.is_empty() {
        println!("default platforms: (host)");
    } else {
        let names: Vec<String> = project
            .default_platforms
            .iter()
            .map(|p| p.to_string())
            .collect();
        println!("default platforms: {}", names.join(", "));
    }
    println!("targets:");
    for target in project.targets.values() {
        let platforms = if target.target_platforms.is_empty() {
            "all".to_string()
        } else {
            target
                .target_platforms
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "  {} ({}) platforms: {}",
            target.name,
            target.build_type.short_name(),
            platforms
        );
    }
    if !project.sequences.is_empty() {
        println!("sequences:");
        for sequence in project.sequences.values() {
            println!("  {} ({} operations)", sequence.name, sequence.operations.len());
        }
    }
}
