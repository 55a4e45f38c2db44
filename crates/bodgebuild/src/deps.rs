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

//! Local include scanning and dependency ordering of source files.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use bodgeutil::common::HEADER_EXTENSIONS;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use regex::Regex;
use tracing::{debug, warn};

static LOCAL_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*#\s*include\s*"([^"]+)""#).expect("include pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderWarning {
    /// The files form at least one include cycle; input order was kept.
    Cycle { files: Vec<PathBuf> },
    /// Two sources own a header with the same file name; the later one won.
    HeaderCollision {
        header: String,
        kept: PathBuf,
        dropped: PathBuf,
    },
}

impl std::fmt::Display for OrderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderWarning::Cycle { files } => {
                let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
                write!(f, "include cycle between {}, keeping input order", files.join(", "))
            }
            OrderWarning::HeaderCollision {
                header,
                kept,
                dropped,
            } => write!(
                f,
                "header `{}` belongs to both `{}` and `{}`, using `{}`",
                header,
                dropped.display(),
                kept.display(),
                kept.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOrder {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<OrderWarning>,
}

impl BuildOrder {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_cycle(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, OrderWarning::Cycle { .. }))
    }
}

/// Dependency graph over source files. An edge `b -> a` means `a` includes
/// a header owned by `b`, so `b` must come first.
pub struct SourceGraph {
    graph: DiGraph<PathBuf, ()>,
    warnings: Vec<OrderWarning>,
}

impl SourceGraph {
    /// Scans `files` (relative to `root`) and links each one to the sources
    /// owning the headers it includes with `#include "..."`.
    pub fn build(root: &Path, files: &BTreeSet<PathBuf>) -> Self {
        let mut graph = DiGraph::new();
        let mut index: HashMap<&Path, NodeIndex> = HashMap::new();
        for file in files {
            index.insert(file.as_path(), graph.add_node(file.clone()));
        }

        let mut warnings = vec![];
        let owners = header_owners(root, files, &mut warnings);

        for file in files {
            let includes = match std::fs::read_to_string(root.join(file)) {
                Ok(text) => local_includes(&text),
                Err(e) => {
                    warn!("failed to read `{}`: {}", file.display(), e);
                    continue;
                }
            };
            let dependent = index[file.as_path()];
            for include in includes {
                let Some(name) = Path::new(&include).file_name() else {
                    continue;
                };
                let name = name.to_string_lossy();
                let Some(owner) = owners.get(&*name) else {
                    continue;
                };
                if owner == file {
                    continue;
                }
                debug!("{} depends on {}", file.display(), owner.display());
                graph.update_edge(index[owner.as_path()], dependent, ());
            }
        }

        SourceGraph { graph, warnings }
    }

    /// Kahn's algorithm with a FIFO seeded in input order. On a cycle, the
    /// input order is returned unchanged with a [`OrderWarning::Cycle`].
    pub fn order(self) -> BuildOrder {
        let SourceGraph { graph, mut warnings } = self;
        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut queue: VecDeque<NodeIndex> = graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .collect();

        let mut sorted = Vec::with_capacity(graph.node_count());
        while let Some(node) = queue.pop_front() {
            sorted.push(node);
            let mut next: Vec<NodeIndex> = graph.neighbors_directed(node, Direction::Outgoing).collect();
            next.sort();
            for n in next {
                in_degree[n.index()] -= 1;
                if in_degree[n.index()] == 0 {
                    queue.push_back(n);
                }
            }
        }

        let files = if sorted.len() == graph.node_count() {
            sorted.into_iter().map(|n| graph[n].clone()).collect()
        } else {
            let mut cyclic: Vec<PathBuf> = petgraph::algo::tarjan_scc(&graph)
                .into_iter()
                .filter(|scc| scc.len() > 1)
                .flatten()
                .map(|n| graph[n].clone())
                .collect();
            cyclic.sort();
            let warning = OrderWarning::Cycle { files: cyclic };
            warn!("{}", warning);
            warnings.push(warning);
            graph.node_weights().cloned().collect()
        };
        BuildOrder { files, warnings }
    }
}

/// Orders `files` so that every file comes after the files it depends on.
pub fn order_sources(root: &Path, files: &BTreeSet<PathBuf>) -> BuildOrder {
    SourceGraph::build(root, files).order()
}

/// Quoted include targets, in order of appearance.
pub fn local_includes(text: &str) -> Vec<String> {
    LOCAL_INCLUDE
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Maps header file names to the source sitting next to them with the same
/// stem, e.g. `util.h -> src/util.cpp`.
fn header_owners(
    root: &Path,
    files: &BTreeSet<PathBuf>,
    warnings: &mut Vec<OrderWarning>,
) -> HashMap<String, PathBuf> {
    let mut owners: HashMap<String, PathBuf> = HashMap::new();
    for file in files {
        for ext in HEADER_EXTENSIONS {
            let header = file.with_extension(ext);
            if !root.join(&header).is_file() {
                continue;
            }
            let Some(name) = header.file_name() else {
                continue;
            };
            let name = name.to_string_lossy().into_owned();
            if let Some(previous) = owners.insert(name.clone(), file.clone())
                && previous != *file
            {
                let warning = OrderWarning::HeaderCollision {
                    header: name,
                    kept: file.clone(),
                    dropped: previous,
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
            break;
        }
    }
    owners
}
