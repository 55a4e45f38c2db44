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

use std::path::{Component, Path, PathBuf};

pub const BODGE_FILE: &str = ".bodge";
pub const DEFAULT_COMPILER: &str = "g++";
pub const DEFAULT_TARGET_NAME: &str = "default";
pub const DEFAULT_LOG_FILE: &str = "bodge_daemon.log";

/// Extensions (without the dot, lowercase) that are compiled as sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "cxx", "cc", "c++"];

/// Header extensions probed next to a source file when mapping headers back to
/// the source that implements them. Order matters: the first hit wins.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hxx"];

/// Every header extension that can trigger a rebuild in watch mode.
pub const WATCHED_HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hxx", "h++"];

/// Longest command line handed to the shell.
pub const MAX_COMMAND_LEN: usize = 32768;

/// Options shared by every operation that touches the project directory.
#[derive(Debug, Clone, Default)]
pub struct BodgeOpt {
    pub project_dir: PathBuf,
    /// Print commands and sequence steps instead of running them.
    pub dry_run: bool,
    pub quiet: bool,
}

fn extension_in(path: &Path, table: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| table.iter().any(|it| it.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

pub fn is_source_file(path: &Path) -> bool {
    extension_in(path, SOURCE_EXTENSIONS)
}

pub fn is_header_file(path: &Path) -> bool {
    extension_in(path, WATCHED_HEADER_EXTENSIONS)
}

/// Splits a delimited list into trimmed, non-empty items.
///
/// Empty (or all-blank) input yields an empty vector, never `[""]`.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|it| !it.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits on any run of whitespace. Same contract as [`split_list`].
pub fn split_whitespace_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Lexically normalizes a path: drops `.` components and folds `a/..`.
///
/// The filesystem is never consulted, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = vec![];
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(comp),
            },
            _ => parts.push(comp),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empty_items() {
        assert_eq!(split_list(" -O2 , ,-Wall,", ','), vec!["-O2", "-Wall"]);
        assert!(split_list("", ',').is_empty());
        assert!(split_list("  \t ", ',').is_empty());
        assert_eq!(split_list("single", ','), vec!["single"]);
    }

    #[test]
    fn split_whitespace_list_handles_runs() {
        assert_eq!(
            split_whitespace_list("build:app   copy:a->b\tmkdir:out"),
            vec!["build:app", "copy:a->b", "mkdir:out"]
        );
        assert!(split_whitespace_list("   ").is_empty());
    }

    #[test]
    fn normalize_path_is_lexical() {
        assert_eq!(normalize_path(Path::new("./src/../src/a.cpp")), PathBuf::from("src/a.cpp"));
        assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
        assert_eq!(normalize_path(Path::new("../lib/x.c")), PathBuf::from("../lib/x.c"));
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn source_and_header_extensions_ignore_case() {
        assert!(is_source_file(Path::new("a.CPP")));
        assert!(is_source_file(Path::new("dir/a.c++")));
        assert!(is_source_file(Path::new("a.c")));
        assert!(!is_source_file(Path::new("a.h")));
        assert!(!is_source_file(Path::new("Makefile")));
        assert!(is_header_file(Path::new("a.HPP")));
        assert!(is_header_file(Path::new("a.h++")));
        assert!(!is_header_file(Path::new("a.cc")));
    }
}
