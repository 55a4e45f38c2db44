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

use std::io::IsTerminal;

use clap::Parser;
use cli::BodgeSubcommands;
use colored::*;

mod cli;

/// Installs the stderr logger. `RUST_LOG` takes precedence over the default
/// level, which is `WARN`, or `DEBUG` with `--verbose`.
fn init_tracing(verbose: bool) {
    let log_env_set = std::env::var("RUST_LOG").is_ok();
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_line_number(log_env_set)
        .with_level(true)
        .with_writer(std::io::stderr);
    let res = if log_env_set {
        builder.compact().try_init()
    } else {
        builder.with_target(false).without_time().try_init()
    };
    if let Err(e) = res {
        eprintln!("Warning: failed to set up logging: {}", e);
    }
}

pub fn main() {
    let cli = cli::BodgeCli::parse();
    let flags = cli.flags;

    init_tracing(flags.verbose);

    use BodgeSubcommands::*;
    let res = match cli.subcommand {
        None => cli::run_build(&flags, &cli::BuildSubcommand::default()),
        Some(Build(b)) => cli::run_build(&flags, &b),
        Some(List(l)) => cli::run_list(&flags, &l),
        Some(Platform(_)) => cli::run_platform(&flags),
        Some(Fetch(_)) => cli::run_fetch(&flags),
        Some(Sequence(s)) => cli::run_sequence(&flags, &s),
        Some(Watch(w)) => cli::run_watch(&flags, &w),
        Some(Version(_)) => cli::run_version(),
    };

    match res {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:?}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}
