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

//! Source pattern expansion.
//!
//! Three pattern forms are understood:
//!
//! * `src/main.cpp`: a literal file, kept only if it exists.
//! * `src/*.cpp`: the files directly inside `src` whose name matches the
//!   wildcard (case-insensitive).
//! * `src/**` or `src/**/*.cpp`: every source file below `src`, optionally
//!   filtered by the file name wildcard after `**/`.
//!
//! Paths are returned relative to the project root, exactly as the pattern
//! spelled them, after lexical normalization.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use bodgeutil::common::{is_source_file, normalize_path};
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub fn expand_patterns(root: &Path, patterns: &[String]) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    let root_norm = normalize_path(root);
    for pattern in patterns {
        let found = expand_pattern(root, pattern);
        debug!("pattern `{}` matched {} file(s)", pattern, found.len());
        files.extend(found.into_iter().map(|p| relative_to_root(&root_norm, p)));
    }
    files
}

/// Absolute paths inside the project are stored relative to it, so both
/// spellings of one file collapse to a single entry.
fn relative_to_root(root: &Path, path: PathBuf) -> PathBuf {
    if !path.is_absolute() {
        return path;
    }
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path,
    }
}

fn expand_pattern(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return vec![];
    }
    if let Some(idx) = pattern.find("**") {
        let dir = dir_portion(&pattern[..idx]);
        let rest = pattern[idx + 2..].trim_start_matches(['/', '\\']);
        let name_filter = if rest.is_empty() || rest == "*" {
            None
        } else {
            Some(wildcard_regex(rest))
        };
        return walk_recursive(root, &dir, name_filter.as_ref());
    }
    if pattern.contains('*') {
        let (dir, name) = match pattern.rfind(['/', '\\']) {
            Some(idx) => (dir_portion(&pattern[..idx]), &pattern[idx + 1..]),
            None => (PathBuf::from("."), pattern),
        };
        return list_directory(root, &dir, &wildcard_regex(name));
    }

    let path = Path::new(pattern);
    if root.join(path).is_file() {
        vec![normalize_path(path)]
    } else {
        warn!("source file `{}` does not exist, skipping", pattern);
        vec![]
    }
}

fn dir_portion(prefix: &str) -> PathBuf {
    let prefix = prefix.trim_end_matches(['/', '\\']);
    if prefix.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(prefix)
    }
}

/// Translates a `*` wildcard into an anchored, case-insensitive regex.
fn wildcard_regex(pattern: &str) -> Regex {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let re = format!("(?i)^{}$", body);
    Regex::new(&re).expect("escaped wildcard is a valid regex")
}

fn walk_recursive(root: &Path, dir: &Path, name_filter: Option<&Regex>) -> Vec<PathBuf> {
    let base = root.join(dir);
    if !base.is_dir() {
        warn!("directory `{}` does not exist, skipping", dir.display());
        return vec![];
    }
    let mut out = vec![];
    for entry in WalkDir::new(&base) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("failed to read `{}`: {}", base.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        if let Some(re) = name_filter {
            let name = entry.file_name().to_string_lossy();
            if !re.is_match(&name) {
                continue;
            }
        }
        if let Ok(rel) = entry.path().strip_prefix(&base) {
            out.push(normalize_path(&dir.join(rel)));
        }
    }
    out
}

fn list_directory(root: &Path, dir: &Path, name: &Regex) -> Vec<PathBuf> {
    let base = root.join(dir);
    let entries = match std::fs::read_dir(&base) {
        Ok(entries) => entries,
        Err(_) => {
            warn!("directory `{}` does not exist, skipping", dir.display());
            return vec![];
        }
    };
    let mut out = vec![];
    for entry in entries.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let file_name = entry.file_name();
        if !is_file || !name.is_match(&file_name.to_string_lossy()) {
            continue;
        }
        let path = dir.join(file_name);
        if is_source_file(&path) {
            out.push(normalize_path(&path));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for f in [
            "main.cpp",
            "src/a.cpp",
            "src/B.CPP",
            "src/a.h",
            "src/notes.txt",
            "src/sub/c.cc",
            "src/sub/deep/d.c",
            "src/sub/deep/d.h",
        ] {
            touch(dir.path(), f);
        }
        dir
    }

    fn expand(root: &Path, patterns: &[&str]) -> Vec<String> {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        expand_patterns(root, &patterns)
            .into_iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn literal_paths_must_exist() {
        let dir = fixture();
        assert_eq!(expand(dir.path(), &["main.cpp", "gone.cpp"]), vec!["main.cpp"]);
        assert_eq!(expand(dir.path(), &["./src/../main.cpp"]), vec!["main.cpp"]);
    }

    #[test]
    fn single_star_is_flat_and_case_insensitive() {
        let dir = fixture();
        assert_eq!(expand(dir.path(), &["src/*.cpp"]), vec!["src/B.CPP", "src/a.cpp"]);
        assert_eq!(expand(dir.path(), &["*.cpp"]), vec!["main.cpp"]);
        assert_eq!(expand(dir.path(), &["src/a.*"]), vec!["src/a.cpp"]);
    }

    #[test]
    fn single_star_keeps_source_files_only() {
        let dir = fixture();
        assert_eq!(expand(dir.path(), &["src/*"]), vec!["src/B.CPP", "src/a.cpp"]);
        assert!(expand(dir.path(), &["src/*.txt"]).is_empty());
    }

    #[test]
    fn double_star_recurses_into_source_files_only() {
        let dir = fixture();
        assert_eq!(
            expand(dir.path(), &["src/**"]),
            vec!["src/B.CPP", "src/a.cpp", "src/sub/c.cc", "src/sub/deep/d.c"]
        );
        assert_eq!(
            expand(dir.path(), &["src/**/*.c"]),
            vec!["src/sub/deep/d.c"]
        );
        assert_eq!(expand(dir.path(), &["**/*.cc"]), vec!["src/sub/c.cc"]);
    }

    #[test]
    fn overlapping_patterns_are_deduplicated() {
        let dir = fixture();
        let files = expand(dir.path(), &["src/a.cpp", "src/*.cpp", "./src/a.cpp", "src/**"]);
        assert_eq!(
            files,
            vec!["src/B.CPP", "src/a.cpp", "src/sub/c.cc", "src/sub/deep/d.c"]
        );
    }

    #[test]
    fn absolute_and_relative_spellings_are_one_file() {
        let dir = fixture();
        let root = normalize_path(dir.path());
        let abs_file = root.join("src/a.cpp").display().to_string();
        let abs_glob = format!("{}/*.cpp", root.join("src").display());
        let files = expand(&root, &["src/a.cpp", abs_file.as_str(), abs_glob.as_str()]);
        assert_eq!(files, vec!["src/B.CPP", "src/a.cpp"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = fixture();
        assert!(expand(dir.path(), &["missing_dir/*.cpp"]).is_empty());
        assert!(expand(dir.path(), &["missing_dir/**"]).is_empty());
    }

    #[test]
    fn expansion_is_idempotent() {
        let dir = fixture();
        let patterns = ["src/**", "main.cpp"];
        assert_eq!(expand(dir.path(), &patterns), expand(dir.path(), &patterns));
    }

    #[test]
    fn wildcard_regex_escapes_metacharacters() {
        let re = wildcard_regex("a+b.*");
        assert!(re.is_match("a+b.cpp"));
        assert!(re.is_match("A+B.H"));
        assert!(!re.is_match("aab.cpp"));
        assert!(!re.is_match("xa+b.cpp"));
    }
}
