//! Documentation and example installation.
//!
//! Runs only after a successful build. Documentation is optional and gated
//! on the readme; the examples mirror is required.

use super::request::SourceTree;
use super::InstallError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What the layout step wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutOutcome {
    /// Installed documentation files; empty when the readme was absent.
    pub docs: Vec<PathBuf>,
    /// Number of files mirrored into the examples directory.
    pub example_files: usize,
}

/// Copy documentation and examples into the prefix.
///
/// 1. If the source has a readme, `DEVELOPMENT.md` and `README.md` go into
///    `docs_dir`. Without a readme nothing is written and `docs_dir` is not
///    created.
/// 2. `benchmarks/` is mirrored into `examples_dir`, replacing whatever was
///    there, so repeated runs leave identical contents.
///
/// # Errors
///
/// [`InstallError::Layout`] if the readme is present but the development
/// guide is not, if the benchmarks directory is missing, or on any I/O
/// failure while copying.
pub fn write_layout(
    tree: &SourceTree,
    docs_dir: &Path,
    examples_dir: &Path,
) -> Result<LayoutOutcome, InstallError> {
    let docs = install_docs(tree, docs_dir)?;
    let example_files = install_examples(tree, examples_dir)?;
    Ok(LayoutOutcome {
        docs,
        example_files,
    })
}

fn install_docs(tree: &SourceTree, docs_dir: &Path) -> Result<Vec<PathBuf>, InstallError> {
    let Some(readme) = &tree.readme else {
        warn!(root = %tree.root.display(), "no README.md in source; skipping documentation");
        return Ok(Vec::new());
    };
    let Some(guide) = &tree.development_guide else {
        let path = tree.root.join(SourceTree::DEVELOPMENT_GUIDE);
        return Err(InstallError::Layout {
            message: "development guide is missing next to README.md".to_string(),
            path,
            fix: "Restore DEVELOPMENT.md in the source tree".to_string(),
        });
    };

    fs::create_dir_all(docs_dir).map_err(|e| layout_error(docs_dir, &e))?;
    let mut installed = Vec::new();
    for source in [guide, readme] {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = docs_dir.join(name);
        fs::copy(source, &target).map_err(|e| layout_error(source, &e))?;
        debug!(file = %target.display(), "installed documentation");
        installed.push(target);
    }
    Ok(installed)
}

fn install_examples(tree: &SourceTree, examples_dir: &Path) -> Result<usize, InstallError> {
    let Some(benchmarks) = &tree.benchmarks else {
        return Err(InstallError::Layout {
            message: "benchmarks directory is missing after a successful build".to_string(),
            path: tree.root.join(SourceTree::BENCHMARKS),
            fix: "The source tree is incomplete; extract the sources again".to_string(),
        });
    };

    let copied = mirror_dir(benchmarks, examples_dir)?;
    info!(dir = %examples_dir.display(), files = copied, "installed examples");
    Ok(copied)
}

/// Replace `dst` with a copy of `src`, returning the number of files copied.
fn mirror_dir(src: &Path, dst: &Path) -> Result<usize, InstallError> {
    if !src.is_dir() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "source directory not found");
        return Err(layout_error(src, &missing));
    }
    if dst.symlink_metadata().is_ok() {
        remove_path(dst).map_err(|e| layout_error(dst, &e))?;
    }
    fs::create_dir_all(dst).map_err(|e| layout_error(dst, &e))?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            let io = io::Error::from(e);
            layout_error(&path, &io)
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| layout_error(&target, &e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target).map_err(|e| layout_error(entry.path(), &e))?;
            copied += 1;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| layout_error(entry.path(), &e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() && !path.symlink_metadata()?.file_type().is_symlink() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

fn layout_error(path: &Path, error: &io::Error) -> InstallError {
    InstallError::Layout {
        message: error.to_string(),
        path: path.to_path_buf(),
        fix: "Check permissions on the installation prefix".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureKind;
    use tempfile::TempDir;

    struct Fixture {
        src: TempDir,
        prefix: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let src = TempDir::new().unwrap();
            fs::create_dir_all(src.path().join("benchmarks/nested")).unwrap();
            fs::write(src.path().join("benchmarks/fib.sc"), "(define (fib n) n)").unwrap();
            fs::write(src.path().join("benchmarks/nested/tak.sc"), "(tak)").unwrap();
            Self {
                src,
                prefix: TempDir::new().unwrap(),
            }
        }

        fn with_docs(self) -> Self {
            fs::write(self.src.path().join("README.md"), "# Stalin").unwrap();
            fs::write(self.src.path().join("DEVELOPMENT.md"), "# Dev").unwrap();
            self
        }

        fn docs_dir(&self) -> PathBuf {
            self.prefix.path().join("share/doc/stalin")
        }

        fn examples_dir(&self) -> PathBuf {
            self.prefix.path().join("share/stalin/examples")
        }

        fn run(&self) -> Result<LayoutOutcome, InstallError> {
            let tree = SourceTree::discover(self.src.path());
            write_layout(&tree, &self.docs_dir(), &self.examples_dir())
        }
    }

    #[test]
    fn test_docs_installed_when_readme_present() {
        let fixture = Fixture::new().with_docs();
        let outcome = fixture.run().unwrap();

        assert_eq!(outcome.docs.len(), 2);
        assert!(fixture.docs_dir().join("README.md").is_file());
        assert!(fixture.docs_dir().join("DEVELOPMENT.md").is_file());
    }

    #[test]
    fn test_docs_dir_not_created_without_readme() {
        let fixture = Fixture::new();
        fs::write(fixture.src.path().join("DEVELOPMENT.md"), "# Dev").unwrap();
        let outcome = fixture.run().unwrap();

        assert!(outcome.docs.is_empty());
        assert!(!fixture.docs_dir().exists());
        assert!(fixture.examples_dir().join("fib.sc").is_file());
    }

    #[test]
    fn test_readme_without_guide_is_layout_failure() {
        let fixture = Fixture::new();
        fs::write(fixture.src.path().join("README.md"), "# Stalin").unwrap();
        let err = fixture.run().unwrap_err();

        assert_eq!(err.kind(), FailureKind::Layout);
        assert!(!fixture.docs_dir().exists());
    }

    #[test]
    fn test_examples_mirror_source() {
        let fixture = Fixture::new();
        let outcome = fixture.run().unwrap();

        assert_eq!(outcome.example_files, 2);
        assert_eq!(
            fs::read_to_string(fixture.examples_dir().join("nested/tak.sc")).unwrap(),
            "(tak)"
        );
    }

    #[test]
    fn test_rerun_replaces_stale_examples() {
        let fixture = Fixture::new();
        fixture.run().unwrap();
        fs::write(fixture.examples_dir().join("stale.sc"), "old").unwrap();

        let outcome = fixture.run().unwrap();
        assert_eq!(outcome.example_files, 2);
        assert!(!fixture.examples_dir().join("stale.sc").exists());
        assert!(fixture.examples_dir().join("fib.sc").is_file());
    }

    #[test]
    fn test_missing_benchmarks_is_layout_failure() {
        let fixture = Fixture::new();
        let tree = SourceTree::discover(fixture.src.path());
        fs::remove_dir_all(fixture.src.path().join("benchmarks")).unwrap();
        let stale = SourceTree {
            benchmarks: None,
            ..tree
        };

        let err = write_layout(&stale, &fixture.docs_dir(), &fixture.examples_dir()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Layout);
        assert!(!fixture.examples_dir().exists());
    }

    #[test]
    fn test_benchmarks_vanishing_after_discovery_is_layout_failure() {
        let fixture = Fixture::new();
        let tree = SourceTree::discover(fixture.src.path());
        fs::remove_dir_all(fixture.src.path().join("benchmarks")).unwrap();

        let err = write_layout(&tree, &fixture.docs_dir(), &fixture.examples_dir()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Layout);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_preserved() {
        let fixture = Fixture::new();
        std::os::unix::fs::symlink("fib.sc", fixture.src.path().join("benchmarks/link.sc"))
            .unwrap();
        fixture.run().unwrap();

        let link = fixture.examples_dir().join("link.sc");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(link).unwrap(), PathBuf::from("fib.sc"));
    }
}
