//! Thin adapters that run exports and imports at host lifecycle events.
//!
//! Hosts call the lifecycle methods (`enable`, `disable`, `start`, `destroy`) from their own
//! event handlers, or the action methods directly from menus. Meshes are passed in on each
//! call; `None` stands for a host object with no mesh attached and makes every action a no-op.

use anyhow::Context;
use chrono::NaiveDateTime;
use log::{error, info};
use meshport_mesh::MeshModel;
use meshport_stl::TIMESTAMP_FORMAT;
use std::path::{Path, PathBuf};

use crate::paths::{FileTarget, PathResolver};

/// Invoked with the file path after a successful export or import. Never invoked on failure.
pub type Completion = Box<dyn FnMut(&Path)>;

/// Exports a mesh as text to a single host-chosen file.
pub struct ObjExportHook<T: FileTarget> {
    pub target: Option<T>,
    pub export_on_enable: bool,
    pub export_on_disable: bool,
    on_exported: Option<Completion>,
}

impl<T: FileTarget> ObjExportHook<T> {
    pub fn new(target: T) -> Self {
        Self {
            target: Some(target),
            export_on_enable: false,
            export_on_disable: false,
            on_exported: None,
        }
    }

    pub fn on_exported(mut self, f: impl FnMut(&Path) + 'static) -> Self {
        self.on_exported = Some(Box::new(f));
        self
    }

    pub fn enable(&mut self, mesh: Option<&MeshModel>) -> anyhow::Result<Option<PathBuf>> {
        if self.export_on_enable {
            self.save(mesh)
        } else {
            Ok(None)
        }
    }

    pub fn disable(&mut self, mesh: Option<&MeshModel>) -> anyhow::Result<Option<PathBuf>> {
        if self.export_on_disable {
            self.save(mesh)
        } else {
            Ok(None)
        }
    }

    /// Exports `mesh` to the target. Returns the written path, or `None` when there was no
    /// mesh or no target.
    pub fn save(&mut self, mesh: Option<&MeshModel>) -> anyhow::Result<Option<PathBuf>> {
        let (Some(mesh), Some(target)) = (mesh, &self.target) else {
            return Ok(None);
        };
        let path = target.file_path();
        crate::export_text(mesh, &path)
            .with_context(|| format!("failed to save OBJ to {}", path.display()))?;
        if let Some(f) = self.on_exported.as_mut() {
            f(&path);
        }
        info!("Saved mesh to {}", path.display());
        Ok(Some(path))
    }
}

/// Imports a mesh from a single host-chosen file.
pub struct ObjImportHook<T: FileTarget> {
    pub target: Option<T>,
    pub import_on_enable: bool,
    on_imported: Option<Completion>,
}

impl<T: FileTarget> ObjImportHook<T> {
    pub fn new(target: T) -> Self {
        Self {
            target: Some(target),
            import_on_enable: false,
            on_imported: None,
        }
    }

    pub fn on_imported(mut self, f: impl FnMut(&Path) + 'static) -> Self {
        self.on_imported = Some(Box::new(f));
        self
    }

    pub fn enable(&mut self) -> anyhow::Result<Option<MeshModel>> {
        if self.import_on_enable {
            self.import()
        } else {
            Ok(None)
        }
    }

    /// Reads the target into a mesh named after the file stem. Returns `None` when there is
    /// no target.
    pub fn import(&mut self) -> anyhow::Result<Option<MeshModel>> {
        let Some(target) = &self.target else {
            return Ok(None);
        };
        let path = target.file_path();
        let (mesh, status) = crate::import_text(&path);
        status.with_context(|| format!("failed to import OBJ from {}", path.display()))?;
        if let Some(f) = self.on_imported.as_mut() {
            f(&path);
        }
        info!("Import mesh from {}", path.display());
        Ok(Some(mesh))
    }
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Directory under each root that receives the files.
    pub sub_directory: String,
    /// File stem of every written file and label of binary headers.
    pub mesh_name: String,
    pub export_on_start: bool,
    pub export_on_destroy: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sub_directory: "eLabRC/Mesh".to_string(),
            mesh_name: "ExportMesh".to_string(),
            export_on_start: false,
            export_on_destroy: false,
        }
    }
}

/// Saves a mesh in both formats under an application-private root and as text under the
/// user-visible platform root.
pub struct MeshArchiver<P: PathResolver, S: PathResolver> {
    pub settings: ExportSettings,
    persistent: P,
    shared: S,
}

impl<P: PathResolver, S: PathResolver> MeshArchiver<P, S> {
    pub fn new(settings: ExportSettings, persistent: P, shared: S) -> Self {
        Self {
            settings,
            persistent,
            shared,
        }
    }

    fn persistent_path(&self, extension: &str) -> PathBuf {
        self.persistent
            .resolve_root()
            .join(&self.settings.sub_directory)
            .join(format!("{}.{}", self.settings.mesh_name, extension))
    }

    /// `<shared root>/<sub directory>/<name>[_<timestamp>].obj`
    pub fn shared_obj_path(&self, stamp: Option<&NaiveDateTime>) -> PathBuf {
        let file = match stamp {
            Some(t) => format!(
                "{}_{}.obj",
                self.settings.mesh_name,
                t.format(TIMESTAMP_FORMAT)
            ),
            None => format!("{}.obj", self.settings.mesh_name),
        };
        self.shared
            .resolve_root()
            .join(&self.settings.sub_directory)
            .join(file)
    }

    pub fn save_persistent_stl(
        &self,
        mesh: Option<&MeshModel>,
    ) -> anyhow::Result<Option<PathBuf>> {
        let Some(mesh) = mesh else {
            return Ok(None);
        };
        let path = self.persistent_path("stl");
        crate::export_binary(mesh, &self.settings.mesh_name, &path)
            .with_context(|| format!("failed to save STL to {}", path.display()))?;
        Ok(Some(path))
    }

    pub fn save_persistent_obj(
        &self,
        mesh: Option<&MeshModel>,
    ) -> anyhow::Result<Option<PathBuf>> {
        let Some(mesh) = mesh else {
            return Ok(None);
        };
        let path = self.persistent_path("obj");
        crate::export_text(mesh, &path)
            .with_context(|| format!("failed to save OBJ to {}", path.display()))?;
        Ok(Some(path))
    }

    /// Saves text under the platform root, with the current local time in the file name when
    /// `with_date` is set.
    pub fn save_shared_obj(
        &self,
        mesh: Option<&MeshModel>,
        with_date: bool,
    ) -> anyhow::Result<Option<PathBuf>> {
        let Some(mesh) = mesh else {
            return Ok(None);
        };
        let now = chrono::Local::now().naive_local();
        let path = self.shared_obj_path(with_date.then_some(&now));
        crate::export_text(mesh, &path)
            .with_context(|| format!("failed to save shared OBJ to {}", path.display()))?;
        Ok(Some(path))
    }

    /// Runs every save without date. Each save is attempted regardless of earlier failures;
    /// the failures are logged and returned.
    pub fn save_all(&self, mesh: Option<&MeshModel>) -> Vec<anyhow::Error> {
        [
            self.save_persistent_stl(mesh),
            self.save_persistent_obj(mesh),
            self.save_shared_obj(mesh, false),
        ]
        .into_iter()
        .filter_map(|r| r.err())
        .inspect(|e| error!("{:#}", e))
        .collect()
    }

    pub fn start(&self, mesh: Option<&MeshModel>) -> Vec<anyhow::Error> {
        if self.settings.export_on_start {
            self.save_all(mesh)
        } else {
            Vec::new()
        }
    }

    pub fn destroy(&self, mesh: Option<&MeshModel>) -> Vec<anyhow::Error> {
        if self.settings.export_on_destroy {
            self.save_all(mesh)
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::FixedRoot;
    use chrono::NaiveDate;
    use meshport_mesh::Vector3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn triangle() -> MeshModel {
        MeshModel::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    fn recorder() -> (Rc<RefCell<Vec<PathBuf>>>, impl FnMut(&Path) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |p: &Path| sink.borrow_mut().push(p.to_path_buf()))
    }

    #[test]
    fn export_hook_respects_flags() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out/mesh.obj");
        let (seen, f) = recorder();
        let mut hook = ObjExportHook::new(target.clone()).on_exported(f);
        let mesh = triangle();

        assert_eq!(None, hook.enable(Some(&mesh)).unwrap());
        assert!(!target.exists());

        hook.export_on_disable = true;
        assert_eq!(Some(target.clone()), hook.disable(Some(&mesh)).unwrap());
        assert!(target.exists());
        assert_eq!(vec![target], *seen.borrow());
    }

    #[test]
    fn export_hook_without_mesh_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (seen, f) = recorder();
        let mut hook = ObjExportHook::new(dir.path().join("mesh.obj")).on_exported(f);
        assert_eq!(None, hook.save(None).unwrap());

        hook.target = None;
        assert_eq!(None, hook.save(Some(&triangle())).unwrap());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn export_failure_skips_callback() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let (seen, f) = recorder();
        let mut hook = ObjExportHook::new(blocker.join("mesh.obj")).on_exported(f);

        let err = hook.save(Some(&triangle())).unwrap_err();
        assert!(err.to_string().contains("failed to save OBJ"));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn import_hook_names_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.obj");
        crate::export_text(&triangle(), &path).unwrap();

        let (seen, f) = recorder();
        let mut hook = ObjImportHook::new(path.clone()).on_imported(f);
        assert!(hook.enable().unwrap().is_none());

        hook.import_on_enable = true;
        let mesh = hook.enable().unwrap().unwrap();
        assert_eq!("panel", mesh.name);
        assert_eq!(vec![0, 1, 2], mesh.triangles);
        assert_eq!(vec![path], *seen.borrow());
    }

    #[test]
    fn import_hook_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (seen, f) = recorder();
        let mut hook = ObjImportHook::new(dir.path().join("absent.obj")).on_imported(f);

        let err = hook.import().unwrap_err();
        let cause = err.downcast_ref::<crate::Error>().unwrap();
        assert!(cause.is_missing_file());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn shared_path_with_and_without_date() {
        let archiver = MeshArchiver::new(
            ExportSettings::default(),
            FixedRoot("/data".into()),
            FixedRoot("/sdcard".into()),
        );
        let stamp = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(17, 5, 42)
            .unwrap();
        assert_eq!(
            PathBuf::from("/sdcard/eLabRC/Mesh/ExportMesh_2024_03_09_17_05_42.obj"),
            archiver.shared_obj_path(Some(&stamp))
        );
        assert_eq!(
            PathBuf::from("/sdcard/eLabRC/Mesh/ExportMesh.obj"),
            archiver.shared_obj_path(None)
        );
    }

    #[test]
    fn save_all_writes_every_artifact() {
        let persistent = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        let settings = ExportSettings {
            mesh_name: "Scan".into(),
            export_on_destroy: true,
            ..Default::default()
        };
        let archiver = MeshArchiver::new(
            settings,
            FixedRoot(persistent.path().to_path_buf()),
            FixedRoot(shared.path().to_path_buf()),
        );

        assert!(archiver.start(Some(&triangle())).is_empty());
        assert!(!persistent.path().join("eLabRC").exists());

        assert!(archiver.destroy(Some(&triangle())).is_empty());
        let base = persistent.path().join("eLabRC/Mesh");
        assert!(base.join("Scan.stl").is_file());
        assert!(base.join("Scan.obj").is_file());
        assert!(shared.path().join("eLabRC/Mesh/Scan.obj").is_file());

        let stl = std::fs::read(base.join("Scan.stl")).unwrap();
        assert!(stl.starts_with(b"Scan|"));
    }

    #[test]
    fn save_all_continues_past_failures() {
        let persistent = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        // The shared root is a file, so the shared save cannot create its directory.
        let blocked = shared.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();

        let archiver = MeshArchiver::new(
            ExportSettings::default(),
            FixedRoot(persistent.path().to_path_buf()),
            FixedRoot(blocked),
        );
        let errors = archiver.save_all(Some(&triangle()));
        assert_eq!(1, errors.len());
        assert!(persistent.path().join("eLabRC/Mesh/ExportMesh.stl").is_file());
        assert!(persistent.path().join("eLabRC/Mesh/ExportMesh.obj").is_file());
    }

    #[test]
    fn save_all_without_mesh() {
        let persistent = tempfile::tempdir().unwrap();
        let archiver = MeshArchiver::new(
            ExportSettings::default(),
            FixedRoot(persistent.path().to_path_buf()),
            FixedRoot(persistent.path().to_path_buf()),
        );
        assert!(archiver.save_all(None).is_empty());
        assert!(!persistent.path().join("eLabRC").exists());
    }
}
