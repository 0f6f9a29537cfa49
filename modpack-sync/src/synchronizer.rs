//! Directory synchronizer: clear owned folders, then mirror the manifest.
//!
//! ## Run order
//!
//! 1. [`Synchronizer::ensure_output_root`]: create at most one directory level.
//! 2. [`Synchronizer::prepare_mod_directory`]: clear relevant folders when the
//!    mod directory exists, otherwise create it.
//! 3. [`Synchronizer::populate_mod_directory`]: copy every resolved manifest
//!    path.
//!
//! Clearing always completes before copying starts. Nothing is retried and
//! nothing is rolled back; the first error aborts the run.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use modpack_core::{ClearMode, FolderName};

use crate::error::{io_err, SyncError};
use crate::manifest::{CopyManifest, ResolvedPath, SourceKind};
use crate::reporter::{Reporter, SyncEvent};

/// Applies (or, in dry-run mode, plans) the filesystem changes of a run.
///
/// Every decision is forwarded to the injected [`Reporter`] and also kept,
/// in order, for the final report.
#[derive(Debug)]
pub struct Synchronizer<R: Reporter> {
    reporter: R,
    dry_run: bool,
    events: Vec<SyncEvent>,
    /// Dry-run only: paths a real run would have deleted by now.
    planned_removals: Vec<PathBuf>,
    /// Dry-run only: directories a real run would have created by now.
    planned_dirs: Vec<PathBuf>,
}

impl<R: Reporter> Synchronizer<R> {
    pub fn new(reporter: R) -> Self {
        Self {
            reporter,
            dry_run: false,
            events: Vec::new(),
            planned_removals: Vec::new(),
            planned_dirs: Vec::new(),
        }
    }

    /// In dry-run mode every check still runs but nothing is mutated.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SyncEvent> {
        self.events
    }

    fn emit(&mut self, event: SyncEvent) {
        self.reporter.report(&event);
        self.events.push(event);
    }

    // -----------------------------------------------------------------------
    // 1. Output root
    // -----------------------------------------------------------------------

    /// Make sure `output_root` exists, creating exactly one directory level.
    ///
    /// Fails with `SyncError::Configuration`, before touching the filesystem,
    /// when the parent is missing or the path is not a directory.
    pub fn ensure_output_root(&mut self, output_root: &Path) -> Result<PathBuf, SyncError> {
        match fs::metadata(output_root) {
            Ok(meta) if meta.is_dir() => return Ok(output_root.to_path_buf()),
            Ok(_) => {
                return Err(SyncError::Configuration {
                    path: output_root.to_path_buf(),
                    reason: "output path exists but is not a directory".into(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(output_root, e)),
        }

        let parent = match output_root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(SyncError::Configuration {
                path: output_root.to_path_buf(),
                reason: format!(
                    "cannot create more than one directory; parent {} does not exist",
                    parent.display()
                ),
            });
        }

        if !self.dry_run {
            fs::create_dir(output_root).map_err(|e| io_err(output_root, e))?;
        }
        self.mark_created(output_root);
        self.emit(SyncEvent::OutputRootCreated {
            path: output_root.to_path_buf(),
        });
        Ok(output_root.to_path_buf())
    }

    // -----------------------------------------------------------------------
    // 2. Mod directory
    // -----------------------------------------------------------------------

    /// Clear relevant folders in an existing mod directory, or create it.
    ///
    /// A freshly created mod directory has nothing to clear.
    pub fn prepare_mod_directory(
        &mut self,
        mod_directory: &Path,
        folders: &[FolderName],
        mode: ClearMode,
    ) -> Result<(), SyncError> {
        match fs::metadata(mod_directory) {
            Ok(meta) if meta.is_dir() => {
                return self.clear_relevant_folders(mod_directory, folders, mode)
            }
            Ok(_) => {
                return Err(SyncError::Configuration {
                    path: mod_directory.to_path_buf(),
                    reason: "mod directory path exists but is not a directory".into(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(mod_directory, e)),
        }

        if !self.dry_run {
            fs::create_dir(mod_directory).map_err(|e| io_err(mod_directory, e))?;
        }
        self.mark_created(mod_directory);
        self.emit(SyncEvent::ModDirectoryCreated {
            path: mod_directory.to_path_buf(),
        });
        Ok(())
    }

    /// Remove every relevant folder that has content, in `folders` order.
    ///
    /// Afterwards each relevant folder is either absent or was already empty
    /// (and, with [`ClearMode::RemoveEmpty`], absent as well). Absent folders
    /// stay absent. Only direct children of `mod_directory` named in
    /// `folders` are ever deleted; symlinks are removed, never followed.
    pub fn clear_relevant_folders(
        &mut self,
        mod_directory: &Path,
        folders: &[FolderName],
        mode: ClearMode,
    ) -> Result<(), SyncError> {
        for folder in folders {
            let path = mod_directory.join(folder);
            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(io_err(&path, e)),
            };
            let name = folder.0.clone();

            if !meta.is_dir() {
                if !self.dry_run {
                    fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
                }
                self.mark_removed(&path);
                self.emit(SyncEvent::StaleEntryRemoved { name, path });
                continue;
            }

            let has_children = fs::read_dir(&path)
                .map_err(|e| io_err(&path, e))?
                .next()
                .is_some();

            if has_children {
                if !self.dry_run {
                    fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
                }
                self.mark_removed(&path);
                self.emit(SyncEvent::FolderCleared { name, path });
                continue;
            }

            match mode {
                ClearMode::KeepEmpty => self.emit(SyncEvent::EmptyFolderKept { name, path }),
                ClearMode::RemoveEmpty => {
                    if !self.dry_run {
                        fs::remove_dir(&path).map_err(|e| io_err(&path, e))?;
                    }
                    self.mark_removed(&path);
                    self.emit(SyncEvent::EmptyFolderRemoved { name, path });
                }
            }
        }
        Ok(())
    }

    fn mark_removed(&mut self, path: &Path) {
        if self.dry_run {
            self.planned_removals.push(path.to_path_buf());
        }
    }

    fn mark_created(&mut self, path: &Path) {
        if self.dry_run {
            self.planned_dirs.push(path.to_path_buf());
        }
    }

    /// Whether `path` is a directory, taking planned removals and creations
    /// into account.
    fn destination_dir_exists(&self, path: &Path) -> bool {
        if self.planned_dirs.iter().any(|created| created == path) {
            return true;
        }
        path.is_dir()
            && !self
                .planned_removals
                .iter()
                .any(|removed| path.starts_with(removed))
    }

    /// Dry-run stand-in for the `NotFound` a real `create_dir` or `copy`
    /// returns when the destination's parent is missing.
    fn check_planned_parent(&self, destination: &Path) -> Result<(), SyncError> {
        match destination.parent() {
            Some(parent) if !self.destination_dir_exists(parent) => Err(io_err(
                destination,
                io::Error::new(
                    ErrorKind::NotFound,
                    format!("parent directory {} does not exist", parent.display()),
                ),
            )),
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // 3. Copy
    // -----------------------------------------------------------------------

    /// Resolve `manifest` against `project_root` and mirror it into
    /// `mod_directory`.
    ///
    /// Directories are created one level at a time (the manifest lists their
    /// contents separately); files are copied byte for byte, overwriting.
    /// Returns the resolved paths so callers can verify the result.
    pub fn populate_mod_directory(
        &mut self,
        project_root: &Path,
        mod_directory: &Path,
        manifest: &CopyManifest,
    ) -> Result<Vec<ResolvedPath>, SyncError> {
        let resolved = manifest.resolve(project_root, self)?;

        for item in &resolved {
            let source = project_root.join(&item.relative);
            let destination = mod_directory.join(&item.relative);

            match item.kind {
                SourceKind::Directory => {
                    if self.destination_dir_exists(&destination) {
                        continue;
                    }
                    if self.dry_run {
                        self.check_planned_parent(&destination)?;
                        self.mark_created(&destination);
                    } else {
                        match fs::create_dir(&destination) {
                            Ok(()) => {}
                            Err(e)
                                if e.kind() == ErrorKind::AlreadyExists
                                    && destination.is_dir() => {}
                            Err(e) => return Err(io_err(&destination, e)),
                        }
                    }
                    self.emit(SyncEvent::DirectoryCreated { path: destination });
                }
                SourceKind::File => {
                    let bytes = if self.dry_run {
                        self.check_planned_parent(&destination)?;
                        fs::metadata(&source).map_err(|e| io_err(&source, e))?.len()
                    } else {
                        fs::copy(&source, &destination).map_err(|e| io_err(&destination, e))?
                    };
                    self.emit(SyncEvent::FileCopied {
                        from: source,
                        to: destination,
                        bytes,
                    });
                }
            }
        }

        Ok(resolved)
    }
}

impl<R: Reporter> Reporter for Synchronizer<R> {
    fn report(&mut self, event: &SyncEvent) {
        self.emit(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use modpack_core::ManifestEntry;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn folders(names: &[&str]) -> Vec<FolderName> {
        names.iter().map(|n| FolderName::from(*n)).collect()
    }

    fn sync() -> Synchronizer<Vec<SyncEvent>> {
        Synchronizer::new(Vec::new())
    }

    fn tempdir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    #[test]
    fn ensure_output_root_creates_single_level() {
        let tmp = tempdir();
        let out = tmp.path().join("build");
        let mut s = sync();
        s.ensure_output_root(&out).expect("create output root");
        assert!(out.is_dir());
        assert!(matches!(s.events(), [SyncEvent::OutputRootCreated { .. }]));
    }

    #[test]
    fn ensure_output_root_existing_is_noop() {
        let tmp = tempdir();
        let mut s = sync();
        s.ensure_output_root(tmp.path()).expect("existing output root");
        assert!(s.events().is_empty());
    }

    #[test]
    fn ensure_output_root_refuses_missing_parent_without_mutation() {
        let tmp = tempdir();
        let out = tmp.path().join("missing").join("build");
        let mut s = sync();
        let err = s
            .ensure_output_root(&out)
            .expect_err("two missing levels must be refused");
        assert!(matches!(err, SyncError::Configuration { .. }), "got: {err}");
        assert!(err.to_string().contains("cannot create more than one directory"));
        assert!(!tmp.path().join("missing").exists());
        assert!(s.events().is_empty());
    }

    #[test]
    fn ensure_output_root_rejects_file() {
        let tmp = tempdir();
        let out = tmp.path().join("build");
        fs::write(&out, "not a dir").expect("write output file");
        let err = sync()
            .ensure_output_root(&out)
            .expect_err("a file is not an output root");
        assert!(matches!(err, SyncError::Configuration { .. }), "got: {err}");
    }

    #[test]
    fn clearing_removes_non_empty_and_leaves_absent_absent() {
        let tmp = tempdir();
        let m = tmp.path();
        fs::create_dir_all(m.join("Defs/Nested")).expect("create Defs/Nested");
        fs::write(m.join("Defs/Nested/Old.xml"), "stale").expect("write stale def");

        let mut s = sync();
        s.clear_relevant_folders(m, &folders(&["Defs", "Textures"]), ClearMode::KeepEmpty)
            .expect("clear relevant folders");

        assert!(!m.join("Defs").exists());
        assert!(!m.join("Textures").exists(), "clearing must not fabricate folders");
        assert!(matches!(s.events(), [SyncEvent::FolderCleared { name, .. }] if name == "Defs"));
    }

    #[rstest]
    #[case(ClearMode::KeepEmpty, true)]
    #[case(ClearMode::RemoveEmpty, false)]
    fn empty_folder_follows_clear_mode(#[case] mode: ClearMode, #[case] survives: bool) {
        let tmp = tempdir();
        fs::create_dir(tmp.path().join("Assemblies")).expect("create Assemblies");

        sync()
            .clear_relevant_folders(tmp.path(), &folders(&["Assemblies"]), mode)
            .expect("clear relevant folders");

        assert_eq!(tmp.path().join("Assemblies").is_dir(), survives);
    }

    #[test]
    fn folders_outside_relevant_set_survive() {
        let tmp = tempdir();
        let m = tmp.path();
        fs::create_dir_all(m.join("Sounds")).expect("create Sounds");
        fs::write(m.join("Sounds/keep.ogg"), "ogg").expect("write sound");
        fs::write(m.join("LoadFolders.xml"), "xml").expect("write LoadFolders.xml");

        sync()
            .clear_relevant_folders(m, &folders(&["Defs", "Sounds2"]), ClearMode::RemoveEmpty)
            .expect("clear relevant folders");

        assert!(m.join("Sounds/keep.ogg").is_file());
        assert!(m.join("LoadFolders.xml").is_file());
    }

    #[test]
    fn relevant_name_as_file_is_removed() {
        let tmp = tempdir();
        fs::write(tmp.path().join("About"), "oops").expect("write About file");
        let mut s = sync();
        s.clear_relevant_folders(tmp.path(), &folders(&["About"]), ClearMode::KeepEmpty)
            .expect("clear relevant folders");
        assert!(!tmp.path().join("About").exists());
        assert!(matches!(s.events(), [SyncEvent::StaleEntryRemoved { .. }]));
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_relevant_folder_is_unlinked_not_followed() {
        let tmp = tempdir();
        let outside = tempdir();
        fs::write(outside.path().join("precious.txt"), "keep me").expect("write outside file");
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("Defs"))
            .expect("symlink Defs");

        sync()
            .clear_relevant_folders(tmp.path(), &folders(&["Defs"]), ClearMode::KeepEmpty)
            .expect("clear relevant folders");

        assert!(!tmp.path().join("Defs").exists());
        assert!(outside.path().join("precious.txt").is_file());
    }

    #[test]
    fn prepare_creates_missing_mod_directory_without_clearing() {
        let tmp = tempdir();
        let mod_dir = tmp.path().join("MyMod");
        let mut s = sync();
        s.prepare_mod_directory(&mod_dir, &folders(&["Defs"]), ClearMode::KeepEmpty)
            .expect("prepare mod directory");
        assert!(mod_dir.is_dir());
        assert!(matches!(s.events(), [SyncEvent::ModDirectoryCreated { .. }]));
    }

    #[test]
    fn populate_copies_bytes_and_creates_directories() {
        let src = tempdir();
        let dst = tempdir();
        fs::create_dir_all(src.path().join("Defs/Sub")).expect("create Defs/Sub");
        let payload = [0u8, 255, 10, 13, 42];
        fs::write(src.path().join("Defs/Sub/A.xml"), payload).expect("write def");

        let manifest = CopyManifest::Patterns(vec![ManifestEntry::required("Defs/**")]);
        let mut s = sync();
        let resolved = s
            .populate_mod_directory(src.path(), dst.path(), &manifest)
            .expect("populate mod directory");

        assert_eq!(resolved.len(), 3);
        assert_eq!(
            fs::read(dst.path().join("Defs/Sub/A.xml")).expect("read copied def"),
            payload
        );
    }

    #[test]
    fn populate_overwrites_existing_files() {
        let src = tempdir();
        let dst = tempdir();
        fs::create_dir(src.path().join("About")).expect("create source About");
        fs::write(src.path().join("About/About.xml"), "new").expect("write source About.xml");
        fs::create_dir(dst.path().join("About")).expect("create destination About");
        fs::write(dst.path().join("About/About.xml"), "old and longer")
            .expect("write stale About.xml");

        let manifest = CopyManifest::Patterns(vec![
            ManifestEntry::required("About/"),
            ManifestEntry::required("About/About.xml"),
        ]);
        sync()
            .populate_mod_directory(src.path(), dst.path(), &manifest)
            .expect("populate mod directory");
        assert_eq!(
            fs::read_to_string(dst.path().join("About/About.xml")).expect("read About.xml"),
            "new"
        );
    }

    /// Source tree with `Assemblies/Mod.dll` and a manifest that lists the
    /// file without its folder.
    fn dll_without_folder_entry() -> (TempDir, CopyManifest) {
        let src = tempdir();
        fs::create_dir(src.path().join("Assemblies")).expect("create Assemblies");
        fs::write(src.path().join("Assemblies/Mod.dll"), "dll").expect("write dll");
        let manifest = CopyManifest::Patterns(vec![ManifestEntry::required("Assemblies/Mod.dll")]);
        (src, manifest)
    }

    #[test]
    fn file_without_destination_parent_is_io_error() {
        let (src, manifest) = dll_without_folder_entry();
        let dst = tempdir();

        let err = sync()
            .populate_mod_directory(src.path(), dst.path(), &manifest)
            .expect_err("copy into a missing folder");
        assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    }

    #[rstest]
    #[case::file_without_parent(&["Assemblies/Mod.dll"], false)]
    #[case::folder_then_file(&["Assemblies/", "Assemblies/Mod.dll"], true)]
    #[case::nested_folder_without_parent(&["Assemblies/Sub/"], false)]
    fn dry_run_fails_exactly_where_real_run_fails(
        #[case] entries: &[&str],
        #[case] succeeds: bool,
    ) {
        let (src, _) = dll_without_folder_entry();
        fs::create_dir(src.path().join("Assemblies/Sub")).expect("create Assemblies/Sub");
        let manifest = CopyManifest::Patterns(
            entries.iter().map(|e| ManifestEntry::required(*e)).collect(),
        );
        let dry_dst = tempdir();
        let real_dst = tempdir();

        let dry = sync()
            .with_dry_run(true)
            .populate_mod_directory(src.path(), dry_dst.path(), &manifest);
        let real = sync().populate_mod_directory(src.path(), real_dst.path(), &manifest);

        assert_eq!(dry.is_ok(), succeeds, "dry run: {dry:?}");
        assert_eq!(real.is_ok(), succeeds, "real run: {real:?}");
        if let (Err(dry), Err(real)) = (&dry, &real) {
            assert!(matches!(dry, SyncError::Io { .. }), "dry run: {dry}");
            assert!(matches!(real, SyncError::Io { .. }), "real run: {real}");
        }
        assert_eq!(
            fs::read_dir(dry_dst.path()).expect("read dry-run destination").count(),
            0,
            "dry-run must not write"
        );
    }

    #[test]
    fn dry_run_sees_planned_output_root_and_mod_directory() {
        let src = tempdir();
        fs::create_dir(src.path().join("About")).expect("create About");
        fs::write(src.path().join("About/About.xml"), "<ModMetaData/>").expect("write About.xml");
        let out = tempdir();
        let output_root = out.path().join("build");
        let mod_dir = output_root.join("Mod");

        let mut s = sync().with_dry_run(true);
        s.ensure_output_root(&output_root).expect("plan output root");
        s.prepare_mod_directory(&mod_dir, &folders(&["About"]), ClearMode::KeepEmpty)
            .expect("plan mod directory");
        let manifest = CopyManifest::Patterns(vec![
            ManifestEntry::required("About/"),
            ManifestEntry::required("About/About.xml"),
        ]);
        s.populate_mod_directory(src.path(), &mod_dir, &manifest)
            .expect("plan copy");

        assert!(!output_root.exists());
        assert!(matches!(
            s.events(),
            [
                SyncEvent::OutputRootCreated { .. },
                SyncEvent::ModDirectoryCreated { .. },
                SyncEvent::DirectoryCreated { .. },
                SyncEvent::FileCopied { bytes: 14, .. },
            ]
        ));
    }

    #[test]
    fn dry_run_plans_without_mutating() {
        let src = tempdir();
        let out = tempdir();
        fs::create_dir(src.path().join("Defs")).expect("create source Defs");
        fs::write(src.path().join("Defs/A.xml"), "a").expect("write def");
        let mod_dir = out.path().join("Mod");
        fs::create_dir_all(mod_dir.join("Defs")).expect("create destination Defs");
        fs::write(mod_dir.join("Defs/Old.xml"), "stale").expect("write stale def");

        let mut s = sync().with_dry_run(true);
        s.prepare_mod_directory(&mod_dir, &folders(&["Defs"]), ClearMode::KeepEmpty)
            .expect("plan clearing");
        let manifest = CopyManifest::Patterns(vec![ManifestEntry::required("Defs/**")]);
        s.populate_mod_directory(src.path(), &mod_dir, &manifest)
            .expect("plan copy");

        assert!(mod_dir.join("Defs/Old.xml").is_file(), "dry-run must not delete");
        assert!(!mod_dir.join("Defs/A.xml").exists(), "dry-run must not copy");
        // Defs is planned for removal, so its re-creation is part of the plan.
        assert!(matches!(
            s.events(),
            [
                SyncEvent::FolderCleared { .. },
                SyncEvent::DirectoryCreated { .. },
                SyncEvent::FileCopied { bytes: 1, .. },
            ]
        ));
    }
}
