use log::warn;
use meshport_mesh::MeshModel;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Comment written on the first line of every exported file.
pub const OBJ_BANNER: &str = "meshport OBJ export";

fn write_obj<W: Write>(mesh: &MeshModel, w: &mut W) -> std::io::Result<()> {
    writeln!(w, "# {}", OBJ_BANNER)?;

    // `Display` for f32 is locale independent and always uses a decimal point.
    for v in &mesh.positions {
        writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for n in &mesh.normals {
        writeln!(w, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for t in &mesh.texcoords {
        writeln!(w, "vt {} {}", t.x, t.y)?;
    }

    let faces = mesh.triangles.chunks_exact(3);
    if !faces.remainder().is_empty() {
        warn!(
            "mesh '{}': dropping {} trailing indices that do not form a triangle",
            mesh.name,
            faces.remainder().len()
        );
    }
    for face in faces {
        // Indices are 1-based in the file.
        let (a, b, c) = (face[0] + 1, face[1] + 1, face[2] + 1);
        writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    Ok(())
}

/// Writes `mesh` to the file at `p`, replacing any existing file.
///
/// The parent directory must already exist.
pub fn save_obj<P: AsRef<Path>>(mesh: &MeshModel, p: P) -> std::io::Result<()> {
    let mut f = BufWriter::new(File::create(p)?);
    write_obj(mesh, &mut f)?;
    f.flush()
}

/// Renders `mesh` into an in-memory string.
pub fn format_obj(mesh: &MeshModel) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail, and every record is ASCII.
    match write_obj(mesh, &mut buf) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

pub trait ObjWriter: Write {
    fn write_obj(&mut self, mesh: &MeshModel) -> std::io::Result<()>;
}

impl<T: Write> ObjWriter for T {
    fn write_obj(&mut self, mesh: &MeshModel) -> std::io::Result<()> {
        write_obj(mesh, self)
    }
}
