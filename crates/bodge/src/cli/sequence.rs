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

use bodgeutil::cli::UniversalFlags;
use bodgeutil::platform::Platform;

use super::load_project;

/// Run a named sequence from the project file
#[derive(Debug, clap::Parser)]
pub struct SequenceSubcommand {
    /// The sequence name, as in `sequence.<name>`
    pub name: String,
}

pub fn run_sequence(flags: &UniversalFlags, cmd: &SequenceSubcommand) -> anyhow::Result<i32> {
    let (project, opt) = load_project(flags)?;
    let platform = flags.requested_platform().unwrap_or_else(Platform::current);
    bodgebuild::sequence::run_sequence(&project, &opt, &cmd.name, &platform)?;
    Ok(0)
}
