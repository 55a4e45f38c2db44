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

//! The structured form of a `.bodge` project file.

use indexmap::IndexMap;
use serde::Serialize;

use crate::common::DEFAULT_TARGET_NAME;
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildType {
    #[default]
    Executable,
    SharedLibrary,
    StaticLibrary,
}

impl BuildType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "exe" | "executable" => Some(BuildType::Executable),
            "dll" | "so" | "shared" => Some(BuildType::SharedLibrary),
            "lib" | "static" => Some(BuildType::StaticLibrary),
            _ => None,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            BuildType::Executable => "exe",
            BuildType::SharedLibrary => "shared",
            BuildType::StaticLibrary => "static",
        }
    }

    pub fn output_extension(self, platform: &Platform) -> &'static str {
        match self {
            BuildType::Executable => platform.executable_extension(),
            BuildType::SharedLibrary => platform.shared_library_extension(),
            BuildType::StaticLibrary => platform.static_library_extension(),
        }
    }
}

/// Settings that apply to one platform key, and the shape of a fully
/// resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformConfig {
    pub cxx_flags: Vec<String>,
    pub sources: Vec<String>,
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub libraries: Vec<String>,
    pub output_suffix: String,
}

impl PlatformConfig {
    /// Appends every list of `layer` onto `self`. The output suffix is
    /// last-write-wins, and an empty suffix never overwrites.
    pub fn append(&mut self, layer: &PlatformConfig) {
        self.cxx_flags.extend(layer.cxx_flags.iter().cloned());
        self.sources.extend(layer.sources.iter().cloned());
        self.include_dirs.extend(layer.include_dirs.iter().cloned());
        self.library_dirs.extend(layer.library_dirs.iter().cloned());
        self.libraries.extend(layer.libraries.iter().cloned());
        if !layer.output_suffix.is_empty() {
            self.output_suffix = layer.output_suffix.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cxx_flags.is_empty()
            && self.sources.is_empty()
            && self.include_dirs.is_empty()
            && self.library_dirs.is_empty()
            && self.libraries.is_empty()
            && self.output_suffix.is_empty()
    }
}

/// Platform overrides in declaration order, so "first match" is well defined.
pub type PlatformOverrides = IndexMap<Platform, PlatformConfig>;

/// Returns the first declared override whose key matches `platform`.
pub fn first_match<'a>(
    overrides: &'a PlatformOverrides,
    platform: &Platform,
) -> Option<(&'a Platform, &'a PlatformConfig)> {
    overrides.iter().find(|(key, _)| key.matches(platform))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    pub name: String,
    pub build_type: BuildType,
    pub output_name: String,
    pub cxx_flags: Vec<String>,
    /// Source patterns, expanded at planning time.
    pub sources: Vec<String>,
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub libraries: Vec<String>,
    #[serde(skip)]
    pub platform_overrides: PlatformOverrides,
    /// Empty means the target builds for every platform.
    pub target_platforms: Vec<Platform>,
}

impl BuildTarget {
    pub fn new(name: impl Into<String>) -> Self {
        BuildTarget {
            name: name.into(),
            build_type: BuildType::Executable,
            output_name: String::new(),
            cxx_flags: vec![],
            sources: vec![],
            include_dirs: vec![],
            library_dirs: vec![],
            libraries: vec![],
            platform_overrides: IndexMap::new(),
            target_platforms: vec![],
        }
    }

    pub fn builds_for(&self, platform: &Platform) -> bool {
        self.target_platforms.is_empty() || self.target_platforms.iter().any(|p| p.matches(platform))
    }

    /// The target's own fields as a configuration layer.
    pub fn base_config(&self) -> PlatformConfig {
        PlatformConfig {
            cxx_flags: self.cxx_flags.clone(),
            sources: self.sources.clone(),
            include_dirs: self.include_dirs.clone(),
            library_dirs: self.library_dirs.clone(),
            libraries: self.libraries.clone(),
            output_suffix: String::new(),
        }
    }

    /// `<output_name><suffix><extension>` for the given platform.
    pub fn output_file_name(&self, suffix: &str, platform: &Platform) -> String {
        format!(
            "{}{}{}",
            self.output_name,
            suffix,
            self.build_type.output_extension(platform)
        )
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = vec![];
        if self.output_name.is_empty() {
            errors.push(ValidationError::MissingOutputName(self.name.clone()));
        }
        if self.sources.is_empty() {
            errors.push(ValidationError::MissingSources(self.name.clone()));
        }
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Build,
    Copy,
    Remove,
    Mkdir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub kind: OperationKind,
    /// Target name for `build`, the source path for everything else.
    pub target: String,
    /// Only set for `copy`.
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sequence {
    pub name: String,
    pub operations: Vec<Operation>,
}

/// Git repositories to clone or update before building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyFetch {
    pub urls: Vec<String>,
    pub paths: Vec<String>,
    pub run_bodge_after_clone: bool,
}

impl DependencyFetch {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.paths.is_empty()
    }

    /// URL and path lists are parallel and must have the same length.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.urls.len() != self.paths.len() {
            return Err(ValidationError::DependencyCountMismatch {
                urls: self.urls.len(),
                paths: self.paths.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub compiler: String,
    /// Global base layer. `sources` and `output_suffix` stay empty.
    pub global: PlatformConfig,
    pub global_overrides: PlatformOverrides,
    pub targets: IndexMap<String, BuildTarget>,
    pub sequences: IndexMap<String, Sequence>,
    pub default_platforms: Vec<Platform>,
    pub dependencies: DependencyFetch,
}

impl ProjectConfig {
    pub fn target(&self, name: &str) -> Option<&BuildTarget> {
        self.targets.get(name)
    }

    /// Inserts a target, replacing any target of the same name.
    pub fn add_target(&mut self, target: BuildTarget) {
        self.targets.insert(target.name.clone(), target);
    }

    /// Checks global fields only.
    pub fn validate_global(&self) -> Vec<ValidationError> {
        let mut errors = vec![];
        if self.compiler.trim().is_empty() {
            errors.push(ValidationError::MissingCompiler);
        }
        if self.targets.is_empty() {
            errors.push(ValidationError::NoTargets);
        }
        errors
    }

    /// Checks global fields plus every target.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.validate_global();
        for target in self.targets.values() {
            errors.extend(target.validate());
        }
        ValidationErrors::into_result(errors)
    }

    /// Checks global fields plus a single target.
    pub fn validate_target(&self, name: &str) -> Result<&BuildTarget, ValidationErrors> {
        let mut errors = self.validate_global();
        errors.retain(|e| !matches!(e, ValidationError::NoTargets));
        let target = match self.targets.get(name) {
            Some(target) => {
                errors.extend(target.validate());
                Some(target)
            }
            None => {
                errors.push(ValidationError::TargetNotFound(name.to_string()));
                None
            }
        };
        match target {
            Some(target) if errors.is_empty() => Ok(target),
            _ => Err(ValidationErrors(errors)),
        }
    }

    /// Folds the legacy single-target keys into a target named `default`,
    /// but only when no explicit target exists.
    pub(crate) fn adopt_legacy_target(&mut self, legacy: BuildTarget) {
        if !legacy.output_name.is_empty() && !legacy.sources.is_empty() && self.targets.is_empty()
        {
            let mut target = legacy;
            target.name = DEFAULT_TARGET_NAME.to_string();
            self.add_target(target);
        }
    }
}

/// A missing or inconsistent required field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no compiler configured")]
    MissingCompiler,
    #[error("no build targets defined")]
    NoTargets,
    #[error("target `{0}` not found")]
    TargetNotFound(String),
    #[error("target `{0}` has no output_name")]
    MissingOutputName(String),
    #[error("target `{0}` has no sources")]
    MissingSources(String),
    #[error("target `{target}` has no source files for platform {platform}")]
    NoSources { target: String, platform: Platform },
    #[error("{urls} dependency url(s) but {paths} dependency path(s)")]
    DependencyCountMismatch { urls: usize, paths: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn into_result(errors: Vec<ValidationError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for error in &self.0 {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
