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

/// Show the host platform and every supported platform
#[derive(Debug, clap::Parser)]
pub struct PlatformSubcommand {}

pub fn run_platform(flags: &UniversalFlags) -> anyhow::Result<i32> {
    let host = Platform::current();
    println!("host os: {}", host.os.as_str());
    println!("host arch: {}", host.arch.as_str());
    println!("host platform: {}", host);
    if let Some(requested) = flags.requested_platform() {
        println!("selected platform: {}", requested);
    }
    println!("supported platforms:");
    for p in Platform::all() {
        println!("  {}", p);
    }
    Ok(0)
}
