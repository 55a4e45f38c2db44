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

//! Line-oriented `.bodge` parser.
//!
//! ```text
//! # comment
//! compiler: clang++
//! global_cxx_flags: -O2
//! @linux_x64.cxx_flags: -march=native
//! app.type: exe
//! app.sources: src/*.cpp
//! app@windows.libraries: ws2_32
//! sequence.release: build:app copy:app->dist/app
//! ```

use std::path::Path;

use tracing::{debug, warn};

use crate::common::{DEFAULT_COMPILER, split_list, split_whitespace_list};
use crate::platform::Platform;
use crate::project::{
    BuildTarget, BuildType, Operation, OperationKind, PlatformConfig, ProjectConfig, Sequence,
};

#[derive(Debug, thiserror::Error)]
#[error("failed to load `{}`", path.display())]
pub struct ConfigFileError {
    path: Box<Path>,
    #[source]
    kind: ConfigFileErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileErrorKind {
    #[error("I/O error")]
    IO(#[from] std::io::Error),
}

pub fn read_project_config(path: &Path) -> Result<ProjectConfig, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError {
        path: path.into(),
        kind: ConfigFileErrorKind::IO(e),
    })?;
    Ok(parse_project_config(&content))
}

/// Parses the text of a `.bodge` file. Malformed lines are skipped and
/// logged, so this never fails; use [`ProjectConfig::validate`] afterwards.
pub fn parse_project_config(content: &str) -> ProjectConfig {
    let mut parser = Parser::default();
    for (index, line) in content.lines().enumerate() {
        parser.line(index + 1, line);
    }
    parser.finish()
}

#[derive(Default)]
struct Parser {
    project: ProjectConfig,
    legacy: BuildTarget,
    compiler_set: bool,
}

impl Parser {
    fn line(&mut self, lineno: usize, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        let Some((key, value)) = line.split_once(':') else {
            debug!("line {}: no `:` found, skipping", lineno);
            return;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            debug!("line {}: empty key or value, skipping", lineno);
            return;
        }

        if key.contains('@') {
            self.platform_override(lineno, key, value);
        } else if let Some(name) = key.strip_prefix("sequence.") {
            self.sequence(name, value);
        } else if let Some((target, property)) = key.split_once('.') {
            self.target_property(lineno, target, property, value);
        } else {
            self.global(lineno, key, value);
        }
    }

    fn platform_override(&mut self, lineno: usize, key: &str, value: &str) {
        let (target, rest) = key.split_once('@').unwrap_or(("", key));
        let Some((platform, property)) = rest.split_once('.') else {
            warn!("line {}: `{}` is missing `.property`, skipping", lineno, key);
            return;
        };
        let platform = Platform::parse(platform);
        if platform.is_wildcard() {
            debug!("line {}: `{}` applies to every platform", lineno, key);
        }

        let target = target.trim();
        let overrides = if target.is_empty() {
            &mut self.project.global_overrides
        } else {
            &mut target_entry(&mut self.project, target).platform_overrides
        };
        let config = overrides.entry(platform).or_default();
        if !set_override_property(config, property, value) {
            warn!(
                "line {}: unknown platform property `{}`, ignoring",
                lineno, property
            );
        }
    }

    fn sequence(&mut self, name: &str, value: &str) {
        let name = name.trim();
        if name.is_empty() {
            warn!("sequence without a name, skipping");
            return;
        }
        let operations = split_whitespace_list(value)
            .iter()
            .filter_map(|token| parse_operation(name, token))
            .collect();
        self.project.sequences.insert(
            name.to_string(),
            Sequence {
                name: name.to_string(),
                operations,
            },
        );
    }

    fn target_property(&mut self, lineno: usize, target: &str, property: &str, value: &str) {
        let target = target.trim();
        if target.is_empty() {
            warn!("line {}: empty target name, skipping", lineno);
            return;
        }
        let entry = target_entry(&mut self.project, target);
        match property.trim() {
            "type" => entry.build_type = parse_build_type(target, value),
            "output_name" => entry.output_name = value.to_string(),
            "sources" => entry.sources = split_list(value, ','),
            "cxx_flags" => entry.cxx_flags = split_list(value, ','),
            "include_dirs" => entry.include_dirs = split_list(value, ','),
            "library_dirs" => entry.library_dirs = split_list(value, ','),
            "libraries" => entry.libraries = split_list(value, ','),
            "platforms" => entry.target_platforms = parse_platform_list(value),
            other => warn!(
                "line {}: unknown property `{}` for target `{}`, ignoring",
                lineno, other, target
            ),
        }
    }

    fn global(&mut self, lineno: usize, key: &str, value: &str) {
        let project = &mut self.project;
        match key {
            "name" => project.name = value.to_string(),
            "compiler" => {
                project.compiler = value.to_string();
                self.compiler_set = true;
            }
            "global_cxx_flags" => project.global.cxx_flags = split_list(value, ','),
            "global_include_dirs" => project.global.include_dirs = split_list(value, ','),
            "global_library_dirs" => project.global.library_dirs = split_list(value, ','),
            "global_libraries" => project.global.libraries = split_list(value, ','),
            "dependencies_url" => project.dependencies.urls = split_list(value, ','),
            "dependencies_path" => project.dependencies.paths = split_list(value, ','),
            "run_bodge_after_clone" => project.dependencies.run_bodge_after_clone = value == "true",
            "platforms" => project.default_platforms = parse_platform_list(value),
            "output_name" => self.legacy.output_name = value.to_string(),
            "cxx_flags" => self.legacy.cxx_flags = split_list(value, ','),
            "sources" => self.legacy.sources = split_list(value, ','),
            "include_dirs" => self.legacy.include_dirs = split_list(value, ','),
            "library_dirs" => self.legacy.library_dirs = split_list(value, ','),
            "libraries" => self.legacy.libraries = split_list(value, ','),
            other => warn!("line {}: unknown key `{}`, ignoring", lineno, other),
        }
    }

    fn finish(mut self) -> ProjectConfig {
        if !self.compiler_set {
            self.project.compiler = DEFAULT_COMPILER.to_string();
        }
        self.project.adopt_legacy_target(self.legacy);
        for target in self.project.targets.values_mut() {
            if target.output_name.is_empty() {
                target.output_name = target.name.clone();
            }
        }
        self.project
    }
}

fn target_entry<'a>(project: &'a mut ProjectConfig, name: &str) -> &'a mut BuildTarget {
    project
        .targets
        .entry(name.to_string())
        .or_insert_with(|| BuildTarget::new(name))
}

fn set_override_property(config: &mut PlatformConfig, property: &str, value: &str) -> bool {
    match property.trim() {
        "cxx_flags" => config.cxx_flags = split_list(value, ','),
        "sources" => config.sources = split_list(value, ','),
        "include_dirs" => config.include_dirs = split_list(value, ','),
        "library_dirs" => config.library_dirs = split_list(value, ','),
        "libraries" => config.libraries = split_list(value, ','),
        "output_suffix" => config.output_suffix = value.to_string(),
        _ => return false,
    }
    true
}

fn parse_build_type(target: &str, value: &str) -> BuildType {
    BuildType::parse(value).unwrap_or_else(|| {
        warn!(
            "unknown type `{}` for target `{}`, using executable",
            value, target
        );
        BuildType::Executable
    })
}

fn parse_platform_list(value: &str) -> Vec<Platform> {
    split_list(value, ',')
        .iter()
        .filter_map(|item| {
            let platform = Platform::parse(item);
            if platform.is_wildcard() {
                warn!("`{}` is not a recognized platform, ignoring", item);
                None
            } else {
                Some(platform)
            }
        })
        .collect()
}

fn parse_operation(sequence: &str, token: &str) -> Option<Operation> {
    let Some((kind, params)) = token.split_once(':') else {
        warn!(
            "sequence `{}`: `{}` is not of the form kind:params, skipping",
            sequence, token
        );
        return None;
    };
    let kind = match kind {
        "build" => OperationKind::Build,
        "copy" => OperationKind::Copy,
        "remove" => OperationKind::Remove,
        "mkdir" => OperationKind::Mkdir,
        other => {
            warn!(
                "sequence `{}`: unknown operation `{}`, skipping",
                sequence, other
            );
            return None;
        }
    };
    if params.is_empty() {
        warn!("sequence `{}`: `{}` has no argument, skipping", sequence, token);
        return None;
    }
    if kind == OperationKind::Copy {
        let Some((from, to)) = params.split_once("->") else {
            warn!(
                "sequence `{}`: copy needs `src->dst`, got `{}`, skipping",
                sequence, params
            );
            return None;
        };
        return Some(Operation {
            kind,
            target: from.to_string(),
            destination: Some(to.to_string()),
        });
    }
    Some(Operation {
        kind,
        target: params.to_string(),
        destination: None,
    })
}
