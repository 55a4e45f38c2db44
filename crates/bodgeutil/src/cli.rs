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

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{BODGE_FILE, BodgeOpt};
use crate::platform::{Arch, Platform};

#[derive(Debug, Clone, clap::Parser, Serialize, Deserialize)]
#[clap(next_display_order(2000), next_help_heading("Common options"))]
pub struct UniversalFlags {
    /// The project directory. Defaults to the current directory.
    #[arg(long = "directory", short = 'C', global = true)]
    pub directory: Option<PathBuf>,

    /// Name of the project file inside the project directory
    #[clap(long, global = true, default_value = BODGE_FILE)]
    pub config: String,

    /// Build for this platform, e.g. `linux_x64` or `windows_x86`
    #[clap(long, global = true)]
    pub platform: Option<String>,

    /// Override the architecture, keeping the operating system
    #[clap(long, global = true)]
    pub arch: Option<String>,

    /// Suppress output
    #[clap(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase verbosity
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Print commands instead of running them
    #[clap(long, global = true)]
    pub dry_run: bool,
}

impl UniversalFlags {
    pub fn project_dir(&self) -> anyhow::Result<PathBuf> {
        let dir = match self.directory.clone() {
            Some(v) => v,
            None => std::env::current_dir().context("failed to get current directory")?,
        };
        dunce::canonicalize(&dir)
            .with_context(|| format!("failed to open project directory `{}`", dir.display()))
    }

    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.project_dir()?.join(&self.config))
    }

    pub fn to_opt(&self) -> anyhow::Result<BodgeOpt> {
        Ok(BodgeOpt {
            project_dir: self.project_dir()?,
            dry_run: self.dry_run,
            quiet: self.quiet,
        })
    }

    /// The platform asked for on the command line, if any.
    ///
    /// `--arch` replaces the architecture of `--platform`, or of the host
    /// when no platform is given. An unrecognized arch is ignored.
    pub fn requested_platform(&self) -> Option<Platform> {
        let base = self.platform.as_deref().map(Platform::parse);
        let Some(name) = self.arch.as_deref() else {
            return base;
        };
        let arch = Arch::from_name(name);
        if arch == Arch::Unknown {
            warn!("unknown architecture `{}`, ignoring --arch", name);
            return base;
        }
        let mut platform = base.unwrap_or_else(Platform::current);
        platform.arch = arch;
        Some(platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Os;
    use clap::Parser;

    #[test]
    fn arch_overrides_platform_arch() {
        let flags = UniversalFlags::parse_from(["bodge", "--platform", "windows_x64", "--arch", "x86"]);
        assert_eq!(
            flags.requested_platform(),
            Some(Platform::new(Os::Windows, Arch::X86))
        );
    }

    #[test]
    fn arch_alone_keeps_host_os() {
        let flags = UniversalFlags::parse_from(["bodge", "--arch", "arm64"]);
        let platform = flags.requested_platform().unwrap();
        assert_eq!(platform.os, Os::current());
        assert_eq!(platform.arch, Arch::Arm64);
    }

    #[test]
    fn unknown_arch_is_ignored() {
        let flags = UniversalFlags::parse_from(["bodge", "--arch", "sparc"]);
        assert_eq!(flags.requested_platform(), None);
        let flags = UniversalFlags::parse_from(["bodge"]);
        assert_eq!(flags.requested_platform(), None);
        assert_eq!(flags.config, ".bodge");
    }

    #[test]
    fn project_dir_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let flags = UniversalFlags::parse_from(["bodge", "-C", dir.path().to_str().unwrap()]);
        let expected = dunce::canonicalize(dir.path()).unwrap();
        assert_eq!(flags.project_dir().unwrap(), expected);
        assert_eq!(flags.config_path().unwrap(), expected.join(".bodge"));
    }
}
