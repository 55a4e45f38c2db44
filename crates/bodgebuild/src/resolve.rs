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

//! Layered configuration resolution.
//!
//! The effective configuration of a target on a platform is built from four
//! layers, each one appended to the previous:
//!
//! 1. global base fields
//! 2. the first global platform override matching the platform
//! 3. the target's base fields, followed by the platform default flags
//! 4. the first target platform override matching the platform
//!
//! Lists only ever grow. The output suffix is last-write-wins, and an empty
//! suffix never overwrites.

use bodgeutil::platform::Platform;
use bodgeutil::project::{BuildTarget, PlatformConfig, PlatformOverrides, ProjectConfig, first_match};
use tracing::debug;

fn apply_override(acc: &mut PlatformConfig, overrides: &PlatformOverrides, platform: &Platform, owner: &str) {
    if let Some((key, layer)) = first_match(overrides, platform) {
        debug!("{}: applying `{}` override for {}", owner, key, platform);
        acc.append(layer);
    }
}

/// Target-level layers only (3 and 4).
pub fn resolve_target(target: &BuildTarget, platform: &Platform) -> PlatformConfig {
    let mut acc = target.base_config();
    acc.cxx_flags
        .extend(platform.default_cxx_flags().into_iter().map(str::to_string));
    apply_override(&mut acc, &target.platform_overrides, platform, &target.name);
    acc
}

/// Global layers only (1 and 2).
pub fn resolve_global(project: &ProjectConfig, platform: &Platform) -> PlatformConfig {
    let mut acc = project.global.clone();
    apply_override(&mut acc, &project.global_overrides, platform, "global");
    acc
}

/// All four layers, global settings first.
pub fn resolve_effective(
    project: &ProjectConfig,
    target: &BuildTarget,
    platform: &Platform,
) -> PlatformConfig {
    let mut acc = resolve_global(project, platform);
    acc.append(&resolve_target(target, platform));
    acc
}
