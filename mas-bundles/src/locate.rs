// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Locating build artifacts.
//!
//! Build outputs land in different directories depending on how the packaging
//! tool was invoked (per-architecture builds, merged universal builds, MAS
//! builds, etc). An [ArtifactLocator] holds an ordered list of
//! [LocateStrategy] and returns the first path any of them resolves.
//! Strategies are consulted in order and the first non-empty result wins.

use {
    anyhow::{anyhow, Context, Result},
    log::debug,
    std::path::{Path, PathBuf},
};

/// The type of filesystem entry an artifact must be.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArtifactKind {
    /// Any directory.
    Directory,
    /// Any regular file.
    File,
    /// A directory whose name has the given extension (e.g. `app`).
    DirectoryWithExtension(String),
    /// A file whose name has the given extension (e.g. `pkg`).
    FileWithExtension(String),
}

impl ArtifactKind {
    /// An application bundle directory (`*.app`).
    pub fn app_bundle() -> Self {
        Self::DirectoryWithExtension("app".into())
    }

    /// A flat installer package (`*.pkg`).
    pub fn installer_package() -> Self {
        Self::FileWithExtension("pkg".into())
    }

    /// A disk image (`*.dmg`).
    pub fn disk_image() -> Self {
        Self::FileWithExtension("dmg".into())
    }

    /// Whether a path exists and satisfies this predicate.
    ///
    /// Symlinks are followed.
    pub fn matches(&self, path: &Path) -> bool {
        let has_extension = |ext: &str| {
            path.extension()
                .map(|e| e.to_string_lossy() == ext)
                .unwrap_or(false)
        };

        match self {
            Self::Directory => path.is_dir(),
            Self::File => path.is_file(),
            Self::DirectoryWithExtension(ext) => path.is_dir() && has_extension(ext),
            Self::FileWithExtension(ext) => path.is_file() && has_extension(ext),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => f.write_str("directory"),
            Self::File => f.write_str("file"),
            Self::DirectoryWithExtension(ext) => write!(f, "*.{} directory", ext),
            Self::FileWithExtension(ext) => write!(f, "*.{} file", ext),
        }
    }
}

/// A way of finding an artifact.
pub trait LocateStrategy {
    /// Human readable description of where this strategy looks.
    fn describe(&self) -> String;

    /// Attempt to find an artifact of the given kind.
    ///
    /// `Ok(None)` means nothing suitable was found. `Err` is reserved for
    /// I/O problems that should not be papered over.
    fn locate(&self, kind: &ArtifactKind) -> Result<Option<PathBuf>>;
}

/// A candidate location: either a literal path or a glob pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Candidate {
    Literal(PathBuf),
    Pattern(String),
}

impl Candidate {
    /// Construct from a path, treating glob metacharacters as a pattern.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let s = path.as_ref().to_string_lossy();

        if s.contains(['*', '?', '[']) {
            Self::Pattern(s.to_string())
        } else {
            Self::Literal(path.as_ref().to_path_buf())
        }
    }
}

/// Check an ordered list of literal paths and glob patterns.
///
/// Patterns resolve to their first match in sorted order.
#[derive(Clone, Debug)]
pub struct CandidatePaths {
    candidates: Vec<Candidate>,
}

impl CandidatePaths {
    pub fn new(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Self {
        Self {
            candidates: paths.into_iter().map(Candidate::new).collect(),
        }
    }
}

impl LocateStrategy for CandidatePaths {
    fn describe(&self) -> String {
        self.candidates
            .iter()
            .map(|c| match c {
                Candidate::Literal(p) => p.display().to_string(),
                Candidate::Pattern(p) => p.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn locate(&self, kind: &ArtifactKind) -> Result<Option<PathBuf>> {
        for candidate in &self.candidates {
            match candidate {
                Candidate::Literal(path) => {
                    debug!("probing {}", path.display());
                    if kind.matches(path) {
                        return Ok(Some(path.clone()));
                    }
                }
                Candidate::Pattern(pattern) => {
                    debug!("expanding pattern {}", pattern);
                    let mut matches = glob::glob(pattern)
                        .with_context(|| format!("parsing glob pattern {}", pattern))?
                        .filter_map(|entry| entry.ok())
                        .filter(|path| kind.matches(path))
                        .collect::<Vec<_>>();
                    matches.sort();

                    if let Some(path) = matches.into_iter().next() {
                        return Ok(Some(path));
                    }
                }
            }
        }

        Ok(None)
    }
}

/// Read an artifact path previously recorded in a marker file.
///
/// Relative paths in the marker resolve against the marker's directory.
#[derive(Clone, Debug)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocateStrategy for MarkerFile {
    fn describe(&self) -> String {
        format!("path recorded in {}", self.path.display())
    }

    fn locate(&self, kind: &ArtifactKind) -> Result<Option<PathBuf>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let recorded = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let recorded = recorded.trim();

        if recorded.is_empty() {
            return Ok(None);
        }

        let mut candidate = PathBuf::from(recorded);
        if candidate.is_relative() {
            if let Some(parent) = self.path.parent() {
                candidate = parent.join(candidate);
            }
        }

        debug!(
            "{} records {}",
            self.path.display(),
            candidate.display()
        );

        Ok(if kind.matches(&candidate) {
            Some(candidate)
        } else {
            None
        })
    }
}

/// Take the first matching entry from an ordered list of directories.
///
/// Directories that don't exist are skipped. Entries within a directory are
/// considered in file name order.
#[derive(Clone, Debug)]
pub struct FirstEntryInDirectories {
    dirs: Vec<PathBuf>,
}

impl FirstEntryInDirectories {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(|d| d.into()).collect(),
        }
    }
}

impl LocateStrategy for FirstEntryInDirectories {
    fn describe(&self) -> String {
        self.dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn locate(&self, kind: &ArtifactKind) -> Result<Option<PathBuf>> {
        for dir in &self.dirs {
            if !dir.is_dir() {
                continue;
            }

            let mut entries = std::fs::read_dir(dir)
                .with_context(|| format!("reading directory {}", dir.display()))?
                .map(|entry| Ok(entry?.path()))
                .collect::<Result<Vec<_>>>()?;
            entries.sort();

            if let Some(path) = entries.into_iter().find(|p| kind.matches(p)) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }
}

/// Recursively search a directory tree for entries with an exact name.
///
/// Matches are ranked by a priority function (lower is better); ties keep
/// walk order, which is sorted by file name.
pub struct RecursiveSearch {
    root: PathBuf,
    name: String,
    max_depth: usize,
    priority: Box<dyn Fn(&Path) -> u32>,
}

impl RecursiveSearch {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            max_depth,
            priority: Box::new(|_| 0),
        }
    }

    /// Rank matches with a priority function. Lower values win.
    pub fn with_priority(mut self, f: impl Fn(&Path) -> u32 + 'static) -> Self {
        self.priority = Box::new(f);
        self
    }
}

impl LocateStrategy for RecursiveSearch {
    fn describe(&self) -> String {
        format!(
            "{} (searching for {}, depth {})",
            self.root.display(),
            self.name,
            self.max_depth
        )
    }

    fn locate(&self, kind: &ArtifactKind) -> Result<Option<PathBuf>> {
        let mut found = find_named_entries(&self.root, &self.name, kind, self.max_depth, false);

        // Stable sort preserves walk order among equal priorities.
        found.sort_by_key(|p| (self.priority)(p));

        Ok(found.into_iter().next())
    }
}

/// Walk `root` to at most `max_depth` levels and collect entries named `name`
/// that satisfy `kind`.
///
/// Unreadable directories are skipped. The root itself is never returned.
pub fn find_named_entries(
    root: &Path,
    name: &str,
    kind: &ArtifactKind,
    max_depth: usize,
    case_insensitive: bool,
) -> Vec<PathBuf> {
    if !root.is_dir() {
        return vec![];
    }

    walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let file_name = entry.file_name().to_string_lossy();
            if case_insensitive {
                file_name.eq_ignore_ascii_case(name)
            } else {
                file_name == name
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| kind.matches(path))
        .collect()
}

/// Finds an artifact by consulting strategies in order.
pub struct ArtifactLocator {
    description: String,
    kind: ArtifactKind,
    strategies: Vec<Box<dyn LocateStrategy>>,
}

impl ArtifactLocator {
    /// Create a locator for an artifact of the given kind.
    ///
    /// `description` names the artifact in error messages.
    pub fn new(description: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            description: description.into(),
            kind,
            strategies: vec![],
        }
    }

    /// Append a strategy. Strategies are consulted in insertion order.
    pub fn with_strategy(mut self, strategy: impl LocateStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Try every strategy in order, returning the first hit.
    pub fn try_locate(&self) -> Result<Option<PathBuf>> {
        for strategy in &self.strategies {
            if let Some(path) = strategy.locate(&self.kind)? {
                debug!("found {} at {}", self.description, path.display());
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Like [Self::try_locate] but treats not finding anything as an error.
    pub fn locate(&self) -> Result<PathBuf> {
        self.try_locate()?.ok_or_else(|| {
            anyhow!(
                "could not locate {} ({}); searched: {}",
                self.description,
                self.kind,
                self.strategies
                    .iter()
                    .map(|s| s.describe())
                    .collect::<Vec<_>>()
                    .join("; ")
            )
        })
    }
}
