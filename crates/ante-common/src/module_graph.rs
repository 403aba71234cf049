//! Physical module graph: the dependency graph between source files before
//! they are merged into the single process-wide module tree (spec section
//! 4.8: "multiple physical root directories are merged into it").
//!
//! This is deliberately a flat file-level graph, separate from the nested
//! logical module tree that `ante-typeck::module` builds from declarations —
//! it answers "in what order should these files be declaration-scanned" so
//! that imports are always visited before their importers.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

/// A unique identifier for a physical source file within a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

/// Metadata about one physical source file contributing to the module tree.
#[derive(Debug)]
pub struct FileInfo {
    pub id: FileId,
    /// Dotted module-path name this file contributes to, e.g. `"Math.Vector"`.
    pub name: String,
    pub path: PathBuf,
    pub dependencies: Vec<FileId>,
    /// Whether this file is the compilation's entry point.
    pub is_entry: bool,
}

/// A dependency cycle among physical files.
#[derive(Debug, Clone)]
pub struct CycleError {
    pub cycle_path: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cycle_path.join(" -> "))
    }
}

/// The graph of physical files and their `import` dependencies.
#[derive(Debug, Default)]
pub struct FileGraph {
    pub files: Vec<FileInfo>,
    name_to_id: FxHashMap<String, FileId>,
}

impl FileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, name: String, path: PathBuf, is_entry: bool) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.name_to_id.insert(name.clone(), id);
        self.files.push(FileInfo { id, name, path, dependencies: Vec::new(), is_entry });
        id
    }

    pub fn resolve(&self, name: &str) -> Option<FileId> {
        self.name_to_id.get(name).copied()
    }

    pub fn add_dependency(&mut self, from: FileId, to: FileId) {
        if from == to {
            return;
        }
        let deps = &mut self.files[from.0 as usize].dependencies;
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn get(&self, id: FileId) -> &FileInfo {
        &self.files[id.0 as usize]
    }
}

/// Topologically order the files so every dependency precedes its
/// dependents (Kahn's algorithm, alphabetical tie-breaking for
/// deterministic diagnostics per spec section 5).
pub fn topological_order(graph: &FileGraph) -> Result<Vec<FileId>, CycleError> {
    let n = graph.files.len();
    let mut in_degree: Vec<u32> =
        graph.files.iter().map(|m| m.dependencies.len() as u32).collect();

    let mut ready: Vec<FileId> = (0..n)
        .filter(|&i| in_degree[i] == 0)
        .map(|i| FileId(i as u32))
        .collect();
    ready.sort_by(|a, b| graph.files[a.0 as usize].name.cmp(&graph.files[b.0 as usize].name));

    let mut queue = VecDeque::from(ready);
    let mut order = Vec::with_capacity(n);

    while let Some(id) = queue.pop_front() {
        order.push(id);
        let mut newly_ready = Vec::new();
        for (i, file) in graph.files.iter().enumerate() {
            if in_degree[i] > 0 && file.dependencies.contains(&id) {
                in_degree[i] -= 1;
                if in_degree[i] == 0 {
                    newly_ready.push(FileId(i as u32));
                }
            }
        }
        newly_ready.sort_by(|a, b| graph.files[a.0 as usize].name.cmp(&graph.files[b.0 as usize].name));
        queue.extend(newly_ready);
    }

    if order.len() == n {
        Ok(order)
    } else {
        Err(CycleError { cycle_path: extract_cycle_path(graph, &in_degree) })
    }
}

fn extract_cycle_path(graph: &FileGraph, in_degree: &[u32]) -> Vec<String> {
    let start = match (0..graph.files.len()).find(|&i| in_degree[i] > 0) {
        Some(i) => i,
        None => return Vec::new(),
    };

    let mut path = Vec::new();
    let mut visited = vec![false; graph.files.len()];
    let mut current = start;

    loop {
        if visited[current] {
            let cycle_start_name = &graph.files[current].name;
            let cycle_begin =
                path.iter().position(|name: &String| name == cycle_start_name).unwrap_or(0);
            let mut cycle: Vec<String> = path[cycle_begin..].to_vec();
            cycle.push(cycle_start_name.clone());
            return cycle;
        }

        visited[current] = true;
        path.push(graph.files[current].name.clone());

        let next = graph.files[current]
            .dependencies
            .iter()
            .find(|dep| in_degree[dep.0 as usize] > 0);

        match next {
            Some(dep) => current = dep.0 as usize,
            None => {
                path.push(graph.files[current].name.clone());
                return path;
            }
        }
    }
}
