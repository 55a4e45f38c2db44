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

use std::path::Path;
use std::process::{Command, ExitStatus};

use bodgeutil::common::MAX_COMMAND_LEN;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("refusing to run an empty command")]
    Empty,
    #[error("command is {len} bytes long, the limit is {}", MAX_COMMAND_LEN)]
    TooLong { len: usize },
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Wraps `line` in the platform shell.
pub fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(line);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }
}

pub fn check_command_line(line: &str) -> Result<(), ExecError> {
    if line.trim().is_empty() {
        return Err(ExecError::Empty);
    }
    if line.len() > MAX_COMMAND_LEN {
        return Err(ExecError::TooLong { len: line.len() });
    }
    Ok(())
}

/// Runs `line` through the shell in `cwd` and waits for it.
pub fn run_command_line(line: &str, cwd: &Path) -> Result<ExitStatus, ExecError> {
    check_command_line(line)?;
    debug!("running in {}: {}", cwd.display(), line);
    shell_command(line)
        .current_dir(cwd)
        .status()
        .map_err(|source| ExecError::Spawn {
            command: line.to_string(),
            source,
        })
}
