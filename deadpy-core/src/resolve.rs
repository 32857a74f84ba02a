//! Symbolic module reference resolution.
//!
//! Maps an [`ImportRef`] plus its originating file to zero or more concrete
//! files by probing the filesystem under the project's source roots: a
//! `src/`-rooted layout is tried first, the project root itself second. A
//! dotted path matches either a module file (`<base>/<segments>.py`) or a
//! package marker (`<base>/<segments>/__init__.py`); both are returned when
//! both exist. Resolution never enumerates a matched package's children.
//!
//! References that land outside the project root, or that only third-party
//! packages could satisfy, resolve to the empty set and are silently
//! dropped by the caller.

use crate::parse::ImportRef;
use crate::scan::{SourceFileIndex, PY_EXTENSION};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Marker file that makes a directory a Python package.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Resolver for one project run.
///
/// Holds the configured source roots and the index universe; every result
/// is a canonical member of that universe, which keeps the graph invariant
/// (no out-of-root or ignored files) in one place.
#[derive(Debug)]
pub struct ModuleResolver<'a> {
    root: &'a Path,
    source_roots: Vec<PathBuf>,
    index: &'a SourceFileIndex,
}

impl<'a> ModuleResolver<'a> {
    /// Creates a resolver rooted at `root`, validating candidates against
    /// `index`.
    pub fn new(root: &'a Path, index: &'a SourceFileIndex) -> Self {
        let mut source_roots = Vec::with_capacity(2);
        let src = root.join("src");
        if src.is_dir() {
            source_roots.push(src);
        }
        source_roots.push(root.to_path_buf());

        Self {
            root,
            source_roots,
            index,
        }
    }

    /// Resolves one reference from its originating file.
    ///
    /// A reference matching in several source roots contributes every
    /// match; the traversal treats them as independent edges.
    pub fn resolve(&self, reference: &ImportRef, origin: &Path) -> BTreeSet<PathBuf> {
        if reference.is_relative() {
            self.resolve_relative(reference, origin)
        } else {
            self.resolve_absolute(&reference.module)
        }
    }

    fn resolve_absolute(&self, dotted: &str) -> BTreeSet<PathBuf> {
        let mut resolved = BTreeSet::new();
        if dotted.is_empty() {
            return resolved;
        }

        for source_root in &self.source_roots {
            let mut candidate = source_root.clone();
            for segment in dotted.split('.') {
                candidate.push(segment);
            }
            self.probe(&candidate, &mut resolved);
        }

        resolved
    }

    /// Relative references climb from the originating file's package:
    /// level 1 is the current package, each further level strips one
    /// component. Climbing past the project root makes the reference
    /// unresolvable and it is dropped without complaint.
    fn resolve_relative(&self, reference: &ImportRef, origin: &Path) -> BTreeSet<PathBuf> {
        let Some(package) = self.package_path(origin) else {
            return BTreeSet::new();
        };

        let climb = reference.level - 1;
        if climb > package.len() {
            return BTreeSet::new();
        }

        let mut segments: Vec<&str> = package[..package.len() - climb].to_vec();
        if !reference.module.is_empty() {
            segments.extend(reference.module.split('.'));
        }
        if segments.is_empty() {
            return BTreeSet::new();
        }

        // With the base package expressed root-relative, the reference
        // resolves exactly like an absolute one.
        self.resolve_absolute(&segments.join("."))
    }

    /// Components of the originating file's directory, relative to the
    /// project root. None when the file lies outside the root.
    fn package_path<'p>(&self, origin: &'p Path) -> Option<Vec<&'p str>> {
        let parent = origin.parent()?;
        let relative = parent.strip_prefix(self.root).ok()?;
        Some(
            relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect(),
        )
    }

    /// Probes one dotted-path candidate for a module file and a package
    /// marker, keeping whichever exist and belong to the universe.
    fn probe(&self, candidate: &Path, resolved: &mut BTreeSet<PathBuf>) {
        let module_file = candidate.with_extension(PY_EXTENSION);
        self.admit(&module_file, resolved);

        let marker_file = candidate.join(PACKAGE_MARKER);
        self.admit(&marker_file, resolved);
    }

    fn admit(&self, path: &Path, resolved: &mut BTreeSet<PathBuf>) {
        if !path.is_file() {
            return;
        }
        // Canonicalization folds symlinks and relative spellings into the
        // identity the index was built with.
        if let Ok(canonical) = fs::canonicalize(path) {
            if self.index.contains(&canonical) {
                resolved.insert(canonical);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_project(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("deadpy_resolve_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn canonical(path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap()
    }

    #[test]
    fn test_absolute_flat_layout() {
        let dir = create_temp_project("flat");
        write_file(&dir.join("utils/helper.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let resolved = resolver.resolve(&ImportRef::absolute("utils.helper"), &root.join("main.py"));
        assert_eq!(resolved.len(), 1);
        assert!(resolved.iter().next().unwrap().ends_with("utils/helper.py"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_absolute_src_layout_takes_priority() {
        let dir = create_temp_project("src_layout");
        write_file(&dir.join("src/core/engine.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let resolved = resolver.resolve(&ImportRef::absolute("core.engine"), &root.join("src/app.py"));
        assert_eq!(resolved.len(), 1);
        assert!(resolved.iter().next().unwrap().ends_with("src/core/engine.py"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_package_marker_resolution() {
        let dir = create_temp_project("marker");
        write_file(&dir.join("pkg/__init__.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let resolved = resolver.resolve(&ImportRef::absolute("pkg"), &root.join("main.py"));
        assert_eq!(resolved.len(), 1);
        assert!(resolved.iter().next().unwrap().ends_with("pkg/__init__.py"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_module_and_package_both_matched() {
        let dir = create_temp_project("both");
        write_file(&dir.join("thing.py"), "");
        write_file(&dir.join("thing/__init__.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let resolved = resolver.resolve(&ImportRef::absolute("thing"), &root.join("main.py"));
        assert_eq!(resolved.len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_relative_two_levels_up() {
        let dir = create_temp_project("relative");
        write_file(&dir.join("src/a/b/c.py"), "");
        write_file(&dir.join("src/a/pkg/mod.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let origin = canonical(&root.join("src/a/b/c.py"));
        let resolved = resolver.resolve(&ImportRef::relative(2, "pkg.mod"), &origin);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.iter().next().unwrap().ends_with("src/a/pkg/mod.py"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_relative_current_package() {
        let dir = create_temp_project("sibling");
        write_file(&dir.join("pkg/main.py"), "");
        write_file(&dir.join("pkg/helper.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let origin = canonical(&root.join("pkg/main.py"));
        let resolved = resolver.resolve(&ImportRef::relative(1, "helper"), &origin);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.iter().next().unwrap().ends_with("pkg/helper.py"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_relative_climbing_above_root_drops() {
        let dir = create_temp_project("too_high");
        write_file(&dir.join("pkg/mod.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let origin = canonical(&root.join("pkg/mod.py"));
        // origin package depth is 1; level 3 climbs two components, one
        // past the project root
        let resolved = resolver.resolve(&ImportRef::relative(3, "anything"), &origin);
        assert!(resolved.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_third_party_reference_unresolved() {
        let dir = create_temp_project("third_party");
        write_file(&dir.join("main.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let resolved = resolver.resolve(&ImportRef::absolute("numpy"), &root.join("main.py"));
        assert!(resolved.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_ignored_file_not_admitted() {
        let dir = create_temp_project("ignored");
        write_file(&dir.join("secret.py"), "");
        write_file(&dir.join("main.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |p| {
            p.file_name().is_some_and(|n| n == "secret.py")
        })
        .unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let resolved = resolver.resolve(&ImportRef::absolute("secret"), &root.join("main.py"));
        assert!(resolved.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let dir = create_temp_project("idempotent");
        write_file(&dir.join("utils/helper.py"), "");
        let root = canonical(&dir);

        let index = SourceFileIndex::build(&root, |_| false).unwrap();
        let resolver = ModuleResolver::new(&root, &index);

        let reference = ImportRef::absolute("utils.helper");
        let origin = root.join("main.py");
        assert_eq!(
            resolver.resolve(&reference, &origin),
            resolver.resolve(&reference, &origin)
        );

        fs::remove_dir_all(&dir).ok();
    }
}
