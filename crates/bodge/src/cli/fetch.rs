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

use bodgebuild::fetch::fetch_dependencies;
use bodgeutil::cli::UniversalFlags;

use super::load_project;

/// Clone or update the git dependencies
#[derive(Debug, clap::Parser)]
pub struct FetchSubcommand {}

pub fn run_fetch(flags: &UniversalFlags) -> anyhow::Result<i32> {
    let (project, opt) = load_project(flags)?;
    let n = fetch_dependencies(&project, &opt)?;
    if n == 0 && !opt.quiet {
        eprintln!("No dependencies to fetch");
    }
    Ok(0)
}
