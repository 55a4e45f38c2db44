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

pub mod build;
pub mod fetch;
pub mod list;
pub mod platform;
pub mod sequence;
pub mod version;
pub mod watch;

pub use build::*;
pub use fetch::*;
pub use list::*;
pub use platform::*;
pub use sequence::*;
pub use version::*;
pub use watch::*;

use anyhow::Context;
use bodgeutil::{
    cli::UniversalFlags, common::BodgeOpt, config::read_project_config, project::ProjectConfig,
};

#[derive(Debug, clap::Parser)]
#[clap(
    name = "bodge",
    about = "A minimal build-description tool for C and C++ projects.",
    version
)]
pub struct BodgeCli {
    #[clap(subcommand)]
    pub subcommand: Option<BodgeSubcommands>,

    #[clap(flatten)]
    pub flags: UniversalFlags,
}

#[derive(Debug, clap::Parser)]
pub enum BodgeSubcommands {
    Build(BuildSubcommand),
    List(ListSubcommand),
    Platform(PlatformSubcommand),
    Fetch(FetchSubcommand),
    Sequence(SequenceSubcommand),
    #[clap(alias = "daemon")]
    Watch(WatchSubcommand),
    Version(VersionSubcommand),
}

/// Reads the project file named by `flags`.
pub fn load_project(flags: &UniversalFlags) -> anyhow::Result<(ProjectConfig, BodgeOpt)> {
    let opt = flags.to_opt()?;
    let path = flags.config_path()?;
    let project = read_project_config(&path)
        .with_context(|| format!("no usable project file in `{}`", opt.project_dir.display()))?;
    Ok((project, opt))
}
