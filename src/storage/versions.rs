//! Revision number resolution
//!
//! Revisions are counted from one listing of the unit directory. The next
//! revision is the length of the contiguous run starting at `v0.json`; a gap in
//! that run hides every revision above it.

use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::io;

use crate::error::{Stage, StorageError, StorageResult};
use crate::storage::paths::{
    PathResolver, Tree, UnitKey, parse_relocated_file_name, parse_revision_file_name,
};

#[derive(Debug, Clone)]
pub struct VersionResolver {
    paths: PathResolver,
}

impl VersionResolver {
    pub fn new(paths: PathResolver) -> Self {
        Self { paths }
    }

    /// All revision numbers present for `unit` in `tree`, ascending.
    ///
    /// In Archive and Trash a revision counts once however many relocations of it
    /// are kept; `generations` lists them individually.
    pub fn revisions(&self, tree: Tree, unit: &UnitKey) -> StorageResult<BTreeSet<u64>> {
        let names = self.document_names(tree, unit)?;
        let revisions = match tree {
            Tree::Latest => names
                .iter()
                .filter_map(|name| parse_revision_file_name(name))
                .collect(),
            Tree::Archive | Tree::Trash => names
                .iter()
                .filter_map(|name| parse_relocated_file_name(name))
                .map(|(revision, _)| revision)
                .collect(),
        };
        Ok(revisions)
    }

    /// Every `(revision, generation)` kept for `unit` in `tree`. Generation 0 is
    /// the plain `v<N>.json`.
    pub fn generations(&self, tree: Tree, unit: &UnitKey) -> StorageResult<BTreeSet<(u64, u64)>> {
        Ok(self
            .document_names(tree, unit)?
            .iter()
            .filter_map(|name| parse_relocated_file_name(name))
            .collect())
    }

    /// Names of the regular files directly inside the unit directory
    fn document_names(&self, tree: Tree, unit: &UnitKey) -> StorageResult<Vec<String>> {
        let dir = self.paths.unit_dir(tree, unit);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_io(Stage::ResolveVersion, &dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::from_io(Stage::ResolveVersion, &dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| StorageError::from_io(Stage::ResolveVersion, &entry.path(), e))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        Ok(names)
    }

    /// Next free slot in the active tree
    pub fn next_revision(&self, unit: &UnitKey) -> StorageResult<u64> {
        let revisions = self.revisions(Tree::Latest, unit)?;
        let next = contiguous_count(&revisions);
        if revisions.len() as u64 != next {
            debug!(
                "{} has a revision gap: {} file(s) present, contiguous run ends at v{}",
                unit,
                revisions.len(),
                next
            );
        }
        Ok(next)
    }

    /// Latest committed revision, or `None` when the unit has no active revision
    pub fn latest_revision(&self, unit: &UnitKey) -> StorageResult<Option<u64>> {
        Ok(self.next_revision(unit)?.checked_sub(1))
    }
}

fn contiguous_count(revisions: &BTreeSet<u64>) -> u64 {
    let mut next = 0;
    for revision in revisions {
        if *revision != next {
            break;
        }
        next += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn setup(files: &[&str]) -> (TempDir, VersionResolver, UnitKey) {
        let temp = TempDir::new().unwrap();
        let paths = PathResolver::new(temp.path());
        let unit = UnitKey::app("demo").unwrap();
        let dir = paths.unit_dir(Tree::Latest, &unit);
        fs::create_dir_all(&dir).unwrap();
        for name in files {
            File::create(dir.join(name)).unwrap();
        }
        (temp, VersionResolver::new(paths), unit)
    }

    #[test]
    fn missing_directory_means_no_revisions() {
        let temp = TempDir::new().unwrap();
        let resolver = VersionResolver::new(PathResolver::new(temp.path()));
        let unit = UnitKey::app("fresh").unwrap();
        assert_eq!(resolver.next_revision(&unit).unwrap(), 0);
        assert_eq!(resolver.latest_revision(&unit).unwrap(), None);
    }

    #[test]
    fn counts_contiguous_run() {
        let (_temp, resolver, unit) = setup(&["v0.json", "v1.json", "v2.json"]);
        assert_eq!(resolver.next_revision(&unit).unwrap(), 3);
        assert_eq!(resolver.latest_revision(&unit).unwrap(), Some(2));
    }

    #[test]
    fn gap_stops_the_count() {
        let (_temp, resolver, unit) = setup(&["v0.json", "v2.json", "v3.json"]);
        assert_eq!(resolver.next_revision(&unit).unwrap(), 1);
        assert_eq!(
            resolver.revisions(Tree::Latest, &unit).unwrap(),
            BTreeSet::from([0, 2, 3])
        );
    }

    #[test]
    fn ignores_foreign_entries() {
        let (temp, resolver, unit) = setup(&["v0.json", "v1.json.tmp", "notes.txt", "v01.json"]);
        // a child unit's directory must not count
        fs::create_dir_all(temp.path().join("Latest/demo/v1.json")).unwrap();
        assert_eq!(resolver.next_revision(&unit).unwrap(), 1);
    }

    #[test]
    fn relocated_generations_are_listed() {
        let (temp, resolver, unit) = setup(&["v0.json"]);
        let archive = temp.path().join("Archive/demo");
        fs::create_dir_all(&archive).unwrap();
        for name in ["v0.json", "v0_1.json", "v0_2.json", "v3.json", "v1.json.tmp"] {
            File::create(archive.join(name)).unwrap();
        }

        assert_eq!(
            resolver.generations(Tree::Archive, &unit).unwrap(),
            BTreeSet::from([(0, 0), (0, 1), (0, 2), (3, 0)])
        );
        assert_eq!(
            resolver.revisions(Tree::Archive, &unit).unwrap(),
            BTreeSet::from([0, 3])
        );
        // generation names never count toward active revisions
        File::create(temp.path().join("Latest/demo/v1_1.json")).unwrap();
        assert_eq!(resolver.next_revision(&unit).unwrap(), 1);
    }
}
