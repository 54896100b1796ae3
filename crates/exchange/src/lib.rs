//! Host-facing entry points for moving meshes in and out of files.
//!
//! [`export_text`], [`import_text`] and [`export_binary`] are the whole surface a host needs.
//! The [`hooks`] module wires them to lifecycle events, and [`paths`] isolates platform
//! storage discovery behind [`PathResolver`].

mod error;
pub mod hooks;
pub mod paths;

use log::{error, info};
use std::path::Path;

pub use error::{Error, Result};
pub use meshport_mesh::{MeshModel, Triangle, Vector2, Vector3};
pub use meshport_stl::StlHeader;
pub use paths::{FileTarget, FixedRoot, PathResolver, PlatformRoot};

/// Creates every missing directory above `path`.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Writes `mesh` as a text file at `path`, creating parent directories and replacing any
/// existing file.
pub fn export_text<P: AsRef<Path>>(mesh: &MeshModel, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    meshport_obj::save_obj(mesh, path)?;
    info!(
        "Mesh exported to {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}

/// Reads a text file into a mesh named after the file stem.
///
/// Never panics and always yields a mesh: on failure the mesh is empty and the second element
/// reports why. A nonexistent `path` is reported as [`Error::MissingFile`].
pub fn import_text<P: AsRef<Path>>(path: P) -> (MeshModel, Result<()>) {
    let path = path.as_ref();
    match meshport_obj::load_obj(path) {
        Ok(mesh) => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mesh = mesh.with_name(name);
            info!(
                "Imported mesh from {} ({} vertices, {} triangle indices)",
                path.display(),
                mesh.vertex_count(),
                mesh.triangles.len()
            );
            (mesh, Ok(()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("File not found: {}", path.display());
            (
                MeshModel::default(),
                Err(Error::MissingFile {
                    path: path.to_path_buf(),
                }),
            )
        }
        Err(e) => {
            error!("Could not read {}: {}", path.display(), e);
            (MeshModel::default(), Err(e.into()))
        }
    }
}

/// Writes `mesh` as a binary STL file at `path` with a `<label>|<local time>` header,
/// creating parent directories and replacing any existing file.
pub fn export_binary<P: AsRef<Path>>(mesh: &MeshModel, label: &str, path: P) -> Result<()> {
    export_binary_with_header(mesh, &StlHeader::now(label), path)
}

/// Like [`export_binary`] but with a caller-built header.
pub fn export_binary_with_header<P: AsRef<Path>>(
    mesh: &MeshModel,
    header: &StlHeader,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    meshport_stl::save_stl(mesh, header, path)?;
    info!(
        "Mesh exported to {} ({} facets)",
        path.display(),
        mesh.triangle_count()
    );
    Ok(())
}
