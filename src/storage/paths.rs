//! Unit keys and on-disk path construction
//!
//! Keys are validated when they are built, so every path handed out here stays
//! inside its tree.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

const MAX_DEPTH: usize = 3;

/// Depth of an addressable unit in the App → Module → Language hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    App,
    Module,
    Language,
}

impl Level {
    fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(Level::App),
            2 => Some(Level::Module),
            3 => Some(Level::Language),
            _ => None,
        }
    }
}

/// One of the three mutually exclusive document trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tree {
    Latest,
    Archive,
    Trash,
}

impl Tree {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Tree::Latest => "Latest",
            Tree::Archive => "Archive",
            Tree::Trash => "Trash",
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Slash-joined key of an App, Module or Language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitKey {
    key: String,
    level: Level,
}

impl UnitKey {
    pub fn app(app: &str) -> Result<Self, StorageError> {
        Self::from_segments(&[app])
    }

    pub fn module(app: &str, module: &str) -> Result<Self, StorageError> {
        Self::from_segments(&[app, module])
    }

    pub fn language(app: &str, module: &str, language: &str) -> Result<Self, StorageError> {
        Self::from_segments(&[app, module, language])
    }

    /// Parse `app`, `app/module` or `app/module/language`
    pub fn parse(key: &str) -> Result<Self, StorageError> {
        let segments: Vec<&str> = key.split('/').collect();
        Self::from_segments(&segments)
    }

    fn from_segments(segments: &[&str]) -> Result<Self, StorageError> {
        let level = Level::from_depth(segments.len()).ok_or_else(|| {
            StorageError::InvalidKey(format!(
                "expected 1 to {} segments, got {}",
                MAX_DEPTH,
                segments.len()
            ))
        })?;

        for segment in segments {
            validate_segment(segment)?;
        }

        Ok(Self {
            key: segments.join("/"),
            level,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

fn validate_segment(segment: &str) -> Result<(), StorageError> {
    if segment.is_empty() {
        return Err(StorageError::InvalidKey("empty segment".into()));
    }
    if segment == "." || segment == ".." {
        return Err(StorageError::InvalidKey(format!(
            "traversal segment: {}",
            segment
        )));
    }
    // a child directory named like a document would shadow its parent's revision slot
    if parse_relocated_file_name(segment).is_some() || segment.ends_with(".tmp") {
        return Err(StorageError::InvalidKey(format!(
            "segment collides with a document name: {}",
            segment
        )));
    }
    if segment.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidKey(format!(
            "illegal character in segment: {:?}",
            segment
        )));
    }
    Ok(())
}

/// File name of a revision: `v<revision>.json`
pub fn revision_file_name(revision: u64) -> String {
    format!("v{}.json", revision)
}

/// Inverse of `revision_file_name`; rejects signs, leading zeros and other suffixes
pub fn parse_revision_file_name(name: &str) -> Option<u64> {
    parse_decimal(name.strip_prefix('v')?.strip_suffix(".json")?)
}

/// Name of a relocated revision in Archive or Trash. Generation 0 is the plain
/// `v<revision>.json`; later relocations of the same slot are `v<revision>_<generation>.json`.
pub fn relocated_file_name(revision: u64, generation: u64) -> String {
    if generation == 0 {
        revision_file_name(revision)
    } else {
        format!("v{}_{}.json", revision, generation)
    }
}

/// Inverse of `relocated_file_name`, as `(revision, generation)`
pub fn parse_relocated_file_name(name: &str) -> Option<(u64, u64)> {
    if let Some(revision) = parse_revision_file_name(name) {
        return Some((revision, 0));
    }
    let stem = name.strip_prefix('v')?.strip_suffix(".json")?;
    let (revision, generation) = stem.split_once('_')?;
    let generation = parse_decimal(generation)?;
    if generation == 0 {
        return None;
    }
    Some((parse_decimal(revision)?, generation))
}

fn parse_decimal(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// Maps units and revisions to paths under the storage root
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<unit-key>/v<revision>.json`
    pub fn relative(&self, unit: &UnitKey, revision: u64) -> PathBuf {
        let mut path = PathBuf::from(unit.as_str());
        path.push(revision_file_name(revision));
        path
    }

    /// `<Tree>/<unit-key>/v<revision>.json`, relative to the storage root
    pub fn tree_relative(&self, tree: Tree, unit: &UnitKey, revision: u64) -> PathBuf {
        Path::new(tree.dir_name()).join(self.relative(unit, revision))
    }

    pub fn tree_dir(&self, tree: Tree) -> PathBuf {
        self.root.join(tree.dir_name())
    }

    pub fn unit_dir(&self, tree: Tree, unit: &UnitKey) -> PathBuf {
        self.tree_dir(tree).join(unit.as_str())
    }

    /// Absolute location of a revision file in a tree
    pub fn locate(&self, tree: Tree, unit: &UnitKey, revision: u64) -> PathBuf {
        self.root.join(self.tree_relative(tree, unit, revision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_paths_per_level() {
        let resolver = PathResolver::new("/data");
        let app = UnitKey::app("demo").unwrap();
        let lang = UnitKey::language("demo", "home", "en").unwrap();

        assert_eq!(resolver.relative(&app, 0), PathBuf::from("demo/v0.json"));
        assert_eq!(
            resolver.tree_relative(Tree::Archive, &lang, 4),
            PathBuf::from("Archive/demo/home/en/v4.json")
        );
        assert_eq!(
            resolver.locate(Tree::Latest, &app, 1),
            PathBuf::from("/data/Latest/demo/v1.json")
        );
        assert_eq!(lang.level(), Level::Language);
    }

    #[test]
    fn parse_matches_constructors() {
        assert_eq!(
            UnitKey::parse("demo/home").unwrap(),
            UnitKey::module("demo", "home").unwrap()
        );
        assert_eq!(UnitKey::parse("demo").unwrap().level(), Level::App);
    }

    #[test]
    fn rejects_traversal_and_malformed_keys() {
        for bad in ["", "..", "demo/..", "./demo", "a//b", "a/b/c/d", "demo/"] {
            assert!(UnitKey::parse(bad).is_err(), "accepted {:?}", bad);
        }
        assert!(UnitKey::app("a\\b").is_err());
        assert!(UnitKey::module("demo", "x\0").is_err());
        assert!(UnitKey::app("a/b").is_err());
    }

    #[test]
    fn rejects_segments_named_like_documents() {
        for bad in ["v0.json", "v12.json", "v3_1.json", "v0.json.tmp", "draft.tmp"] {
            assert!(
                matches!(UnitKey::module("demo", bad), Err(StorageError::InvalidKey(_))),
                "accepted {:?}",
                bad
            );
        }
        // near misses are ordinary names
        for good in ["v01.json", "v1_0.json", "en.json", "v1"] {
            assert!(UnitKey::module("demo", good).is_ok(), "rejected {:?}", good);
        }
    }

    #[test]
    fn relocated_file_names() {
        assert_eq!(relocated_file_name(4, 0), "v4.json");
        assert_eq!(relocated_file_name(4, 2), "v4_2.json");
        assert_eq!(parse_relocated_file_name("v4.json"), Some((4, 0)));
        assert_eq!(parse_relocated_file_name("v4_2.json"), Some((4, 2)));
        for name in ["v4_0.json", "v4_.json", "v_2.json", "v04_2.json", "v4_2.json.tmp"] {
            assert_eq!(parse_relocated_file_name(name), None, "parsed {}", name);
        }
    }

    #[test]
    fn revision_file_names() {
        assert_eq!(revision_file_name(12), "v12.json");
        assert_eq!(parse_revision_file_name("v0.json"), Some(0));
        assert_eq!(parse_revision_file_name("v12.json"), Some(12));
        for name in ["v.json", "v01.json", "v+1.json", "v1.json.tmp", "v1_1.json", "x1.json"] {
            assert_eq!(parse_revision_file_name(name), None, "parsed {}", name);
        }
    }
}
