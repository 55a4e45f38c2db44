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

//! Compiler command synthesis.

use std::path::PathBuf;

use bodgeutil::platform::{Os, Platform};
use bodgeutil::project::{BuildTarget, BuildType, PlatformConfig, ValidationError};

/// Fragments that would let a token escape into the shell.
pub const UNSAFE_FRAGMENTS: &[&str] = &[";", "&&", "||", "|", "`", "$(", "${", "\n", "\r"];

pub fn is_safe_argument(token: &str) -> bool {
    !UNSAFE_FRAGMENTS.iter().any(|frag| token.contains(frag))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unsafe characters in {field}: `{token}`")]
    UnsafeArgument { field: &'static str, token: String },
    #[error(transparent)]
    Config(#[from] ValidationError),
}

impl CommandError {
    pub fn is_security_violation(&self) -> bool {
        matches!(self, CommandError::UnsafeArgument { .. })
    }
}

/// A synthesized command. Every token has passed [`is_safe_argument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn len(&self) -> usize {
        self.to_string().len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

pub(crate) fn checked(field: &'static str, token: &str) -> Result<String, CommandError> {
    if is_safe_argument(token) {
        Ok(token.to_string())
    } else {
        Err(CommandError::UnsafeArgument {
            field,
            token: token.to_string(),
        })
    }
}

fn build_type_flags(build_type: BuildType, platform: &Platform) -> &'static [&'static str] {
    match build_type {
        BuildType::SharedLibrary if platform.os == Os::Windows => &["-shared"],
        BuildType::SharedLibrary => &["-shared", "-fPIC"],
        // archiving is left to an external step
        BuildType::Executable | BuildType::StaticLibrary => &[],
    }
}

/// Builds the single compiler invocation for a target.
///
/// Argument order: compiler, flags, build type flags, `-I` dirs, sources,
/// `-o` output, `-L` dirs, `-l` libraries. `config` is the fully resolved
/// configuration, so global entries already precede target entries.
pub fn make_compile_command(
    compiler: &str,
    target: &BuildTarget,
    config: &PlatformConfig,
    sources: &[PathBuf],
    platform: &Platform,
) -> Result<CommandLine, CommandError> {
    let compiler = compiler.trim();
    if compiler.is_empty() {
        return Err(ValidationError::MissingCompiler.into());
    }
    if target.output_name.is_empty() {
        return Err(ValidationError::MissingOutputName(target.name.clone()).into());
    }
    if sources.is_empty() {
        return Err(ValidationError::NoSources {
            target: target.name.clone(),
            platform: *platform,
        }
        .into());
    }

    let program = checked("compiler", compiler)?;
    let mut buf: Vec<String> = vec![];

    for flag in &config.cxx_flags {
        buf.push(checked("cxx_flags", flag)?);
    }
    buf.extend(
        build_type_flags(target.build_type, platform)
            .iter()
            .map(|s| s.to_string()),
    );
    for dir in &config.include_dirs {
        buf.push(format!("-I{}", checked("include_dirs", dir)?));
    }
    for source in sources {
        buf.push(checked("sources", &source.display().to_string())?);
    }
    buf.push("-o".to_string());
    buf.push(checked(
        "output_name",
        &target.output_file_name(&config.output_suffix, platform),
    )?);
    for dir in &config.library_dirs {
        buf.push(format!("-L{}", checked("library_dirs", dir)?));
    }
    for lib in &config.libraries {
        buf.push(format!("-l{}", checked("libraries", lib)?));
    }

    Ok(CommandLine { program, args: buf })
}
