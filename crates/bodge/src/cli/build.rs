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
use bodgebuild::entry::{build_all, build_target};
use bodgebuild::fetch::fetch_dependencies;
use bodgebuild::plan::platforms_for;
use bodgeutil::cli::UniversalFlags;

use super::load_project;

/// Build one target, or every target when none is given
#[derive(Debug, Default, clap::Parser)]
pub struct BuildSubcommand {
    /// The target to build
    pub target: Option<String>,
}

pub fn run_build(flags: &UniversalFlags, cmd: &BuildSubcommand) -> anyhow::Result<i32> {
    let (project, opt) = load_project(flags)?;
    let platforms = platforms_for(&project, flags.requested_platform());
    let stats = match &cmd.target {
        Some(name) => build_target(&project, &opt, name, &platforms)?,
        None => {
            project.validate()?;
            fetch_dependencies(&project, &opt).context("failed to fetch dependencies")?;
            build_all(&project, &opt, &platforms)?
        }
    };
    stats.print_summary(opt.quiet);
    Ok(stats.return_code())
}
