use log::trace;
use meshport_mesh::{MeshModel, Vector2, Vector3};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Accumulates records line by line.
///
/// Malformed records (too few tokens, unparseable numbers, non-positive face indices) are
/// dropped whole. Unknown record types are ignored.
#[derive(Default)]
struct ObjParser {
    mesh: MeshModel,
    // Parsed for completeness; normals are always rebuilt from the faces.
    parsed_normals: Vec<Vector3>,
    skipped: usize,
}

fn parse_floats<const N: usize>(tokens: &[&str]) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(tokens.get(..N)?) {
        *slot = token.parse().ok()?;
    }
    Some(out)
}

/// Resolves the position slot of a face corner such as `7`, `7/2` or `7/2/5` to a 0-based
/// index. The texture coordinate and normal slots are not used.
fn parse_corner(token: &str) -> Option<u32> {
    let position = token.split('/').next()?;
    position.parse::<u32>().ok()?.checked_sub(1)
}

impl ObjParser {
    fn line(&mut self, number: usize, line: &str) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&kind, args)) = tokens.split_first() else {
            return;
        };

        let accepted = match kind {
            "v" => parse_floats::<3>(args)
                .map(|[x, y, z]| self.mesh.positions.push(Vector3::new(x, y, z))),
            "vn" => parse_floats::<3>(args)
                .map(|[x, y, z]| self.parsed_normals.push(Vector3::new(x, y, z))),
            "vt" => parse_floats::<2>(args)
                .map(|[u, v]| self.mesh.texcoords.push(Vector2::new(u, v))),
            "f" if args.len() >= 3 => args
                .iter()
                .map(|corner| parse_corner(corner))
                .collect::<Option<Vec<u32>>>()
                // Polygons are not triangulated; every corner is appended as-is.
                .map(|corners| self.mesh.triangles.extend(corners)),
            "f" => None,
            _ => Some(()),
        };

        if accepted.is_none() {
            trace!("skipping malformed '{}' record on line {}", kind, number);
            self.skipped += 1;
        }
    }

    fn finish(self) -> MeshModel {
        let ObjParser {
            mut mesh,
            parsed_normals,
            skipped,
        } = self;
        if skipped > 0 {
            trace!("skipped {} malformed records", skipped);
        }
        trace!("discarding {} parsed normals", parsed_normals.len());
        mesh.recompute_normals();
        mesh
    }
}

fn read_text<R: BufRead>(mut r: R) -> std::io::Result<MeshModel> {
    let mut parser = ObjParser::default();
    let mut buf = Vec::new();
    let mut number = 0;
    loop {
        buf.clear();
        if r.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        number += 1;
        // Bytes that are not UTF-8 (such as Latin-1 comments) only spoil their own line.
        let line = String::from_utf8_lossy(&buf);
        parser.line(number, line.trim_end_matches(['\n', '\r']));
    }
    Ok(parser.finish())
}

/// Reads a mesh from the file at `p`.
///
/// Normals in the file are ignored; the returned mesh carries smooth per-vertex normals
/// computed from its triangles.
pub fn load_obj<P: AsRef<Path>>(p: P) -> std::io::Result<MeshModel> {
    let f = File::open(p)?;
    read_text(BufReader::new(f))
}

/// Parses a mesh from in-memory text.
pub fn parse_obj(text: &str) -> MeshModel {
    let mut parser = ObjParser::default();
    for (i, line) in text.lines().enumerate() {
        parser.line(i + 1, line);
    }
    parser.finish()
}

pub trait ObjReader: BufRead {
    fn read_obj(&mut self) -> std::io::Result<MeshModel>;
}

impl<T: BufRead> ObjReader for T {
    fn read_obj(&mut self) -> std::io::Result<MeshModel> {
        read_text(self)
    }
}
