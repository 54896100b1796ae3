//! Writer for the binary triangle-soup (STL) format.
//!
//! Layout, little-endian throughout:
//!
//! ```text
//! [80-byte header][u32 triangle count][count x 50-byte facet record]
//! facet record = [3 x f32 normal][3 x (3 x f32) vertex][u16 attribute = 0]
//! ```

use byteorder::{LittleEndian, WriteBytesExt};
use chrono::NaiveDateTime;
use log::debug;
use meshport_mesh::{MeshModel, Vector3};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const HEADER_LEN: usize = 80;
pub const FACET_RECORD_LEN: usize = 50;

/// Timestamp layout embedded in headers, e.g. `2024_03_09_17_05_42`.
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

/// The fixed-size header at the start of every binary file.
///
/// The format gives this block no structure. We store ASCII text of the form
/// `<label>|<timestamp>`, zero padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StlHeader([u8; HEADER_LEN]);

impl StlHeader {
    /// Builds a header from arbitrary text. Non-ASCII characters become `?` and anything past
    /// 80 bytes is cut off.
    pub fn new(text: &str) -> Self {
        let mut bytes = [0u8; HEADER_LEN];
        let ascii = text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' });
        for (slot, b) in bytes.iter_mut().zip(ascii) {
            *slot = b;
        }
        Self(bytes)
    }

    pub fn labeled(label: &str, stamp: &NaiveDateTime) -> Self {
        Self::new(&format!("{}|{}", label, stamp.format(TIMESTAMP_FORMAT)))
    }

    /// A header labeled with the current local time.
    pub fn now(label: &str) -> Self {
        Self::labeled(label, &chrono::Local::now().naive_local())
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_LEN] {
        &self.0
    }

    /// The header text up to the zero padding.
    pub fn text(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(HEADER_LEN);
        // Only ASCII bytes are ever stored.
        std::str::from_utf8(&self.0[..end]).unwrap_or_default()
    }
}

fn write_vector<W: Write>(w: &mut W, v: Vector3) -> std::io::Result<()> {
    w.write_f32::<LittleEndian>(v.x)?;
    w.write_f32::<LittleEndian>(v.y)?;
    w.write_f32::<LittleEndian>(v.z)
}

fn write_binary<W: Write>(
    mesh: &MeshModel,
    header: &StlHeader,
    w: &mut W,
) -> std::io::Result<()> {
    // Check everything up front so that a bad mesh never leaves a truncated file behind.
    let n_triangles = u32::try_from(mesh.triangle_count()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "too many triangles for a binary STL file",
        )
    })?;
    let n = mesh.vertex_count();
    if let Some(&bad) = mesh.triangles[..3 * mesh.triangle_count()]
        .iter()
        .find(|&&i| i as usize >= n)
    {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("triangle references vertex {} of a {}-vertex mesh", bad, n),
        ));
    }

    w.write_all(header.as_bytes())?;
    w.write_u32::<LittleEndian>(n_triangles)?;

    for triangle in mesh.triangles() {
        // Normals always come from the geometry; any normals stored on the mesh are ignored.
        write_vector(w, triangle.normal())?;
        write_vector(w, triangle.p0)?;
        write_vector(w, triangle.p1)?;
        write_vector(w, triangle.p2)?;
        // Attribute byte count. Some tools store color here; we always write 0.
        w.write_u16::<LittleEndian>(0)?;
    }
    debug!("wrote {} facets for '{}'", n_triangles, header.text());
    Ok(())
}

/// Writes `mesh` to the file at `p`, replacing any existing file.
///
/// The parent directory must already exist. Fails with `InvalidInput` before creating the
/// file if a triangle references a vertex outside the mesh.
pub fn save_stl<P: AsRef<Path>>(
    mesh: &MeshModel,
    header: &StlHeader,
    p: P,
) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(encoded_len(mesh));
    write_binary(mesh, header, &mut buf)?;
    let mut f = BufWriter::new(File::create(p)?);
    f.write_all(&buf)?;
    f.flush()
}

/// Encodes `mesh` into an in-memory buffer.
pub fn encode_stl(mesh: &MeshModel, header: &StlHeader) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(mesh));
    write_binary(mesh, header, &mut buf)?;
    Ok(buf)
}

/// Size in bytes of the binary encoding of `mesh`.
pub fn encoded_len(mesh: &MeshModel) -> usize {
    HEADER_LEN + 4 + FACET_RECORD_LEN * mesh.triangle_count()
}

pub trait StlWriter: Write {
    fn write_stl(&mut self, mesh: &MeshModel, header: &StlHeader) -> std::io::Result<()>;
}

impl<T: Write> StlWriter for T {
    fn write_stl(&mut self, mesh: &MeshModel, header: &StlHeader) -> std::io::Result<()> {
        write_binary(mesh, header, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(17, 5, 42)
            .unwrap()
    }

    #[test]
    fn header_layout() {
        let header = StlHeader::labeled("ExportMesh", &stamp());
        assert_eq!("ExportMesh|2024_03_09_17_05_42", header.text());
        let bytes = header.as_bytes();
        assert_eq!(&b"ExportMesh|2024_03_09_17_05_42"[..], &bytes[..30]);
        assert!(bytes[30..].iter().all(|&b| b == 0));
    }

    #[test]
    fn header_truncates_long_text() {
        let label = "x".repeat(100);
        let header = StlHeader::labeled(&label, &stamp());
        assert_eq!(HEADER_LEN, header.text().len());
        assert!(header.as_bytes().iter().all(|&b| b == b'x'));
    }

    #[test]
    fn header_replaces_non_ascii() {
        let header = StlHeader::new("pièce");
        assert_eq!("pi?ce", header.text());
    }

    #[test]
    fn empty_mesh() {
        let buf = encode_stl(&MeshModel::default(), &StlHeader::new("")).unwrap();
        assert_eq!(HEADER_LEN + 4, buf.len());
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mesh = MeshModel::new(vec![Vector3::new(0.0, 0.0, 0.0)], vec![0, 0, 1]);
        let err = encode_stl(&mesh, &StlHeader::new("bad")).unwrap_err();
        assert_eq!(std::io::ErrorKind::InvalidInput, err.kind());
    }

    #[test]
    fn trailing_partial_triangle_is_not_written() {
        let mesh = MeshModel::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 7],
        );
        let buf = encode_stl(&mesh, &StlHeader::new("quad")).unwrap();
        assert_eq!(HEADER_LEN + 4 + FACET_RECORD_LEN, buf.len());
        assert_eq!(&1u32.to_le_bytes(), &buf[80..84]);
    }
}
