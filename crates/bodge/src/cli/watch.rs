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

use std::time::Duration;

use bodgebuild::entry::build_all;
use bodgebuild::plan::platforms_for;
use bodgebuild::watch::{
    BuildLog, DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS, MIN_INTERVAL_MS, check_log_name, watching,
};
use bodgeutil::cli::UniversalFlags;
use bodgeutil::common::DEFAULT_LOG_FILE;

use super::load_project;

/// Rebuild every target whenever a source or header changes
#[derive(Debug, clap::Parser)]
pub struct WatchSubcommand {
    /// Upper bound, in milliseconds, for collecting changes before a rebuild
    #[clap(
        long,
        default_value_t = DEFAULT_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(MIN_INTERVAL_MS..=MAX_INTERVAL_MS)
    )]
    pub interval: u64,

    /// Build log file, relative to the project directory
    #[clap(long, default_value = DEFAULT_LOG_FILE)]
    pub log: String,
}

pub fn run_watch(flags: &UniversalFlags, cmd: &WatchSubcommand) -> anyhow::Result<i32> {
    check_log_name(&cmd.log)?;
    let (_, opt) = load_project(flags)?;
    let log = BuildLog::open(&opt.project_dir.join(&cmd.log))?;
    let requested = flags.requested_platform();

    let run = || {
        // The project file is re-read so edits apply on the next rebuild.
        let (project, opt) = load_project(flags)?;
        let platforms = platforms_for(&project, requested);
        let stats = build_all(&project, &opt, &platforms)?;
        stats.print_summary(opt.quiet);
        Ok(stats.successful())
    };
    watching(
        run,
        &opt.project_dir,
        Some(log),
        Duration::from_millis(cmd.interval),
    )
}
