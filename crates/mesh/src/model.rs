use cgmath::Zero;
use log::warn;

use crate::geometry::{normalize_or_zero, Triangle, Vector2, Vector3};

/// An indexed triangle mesh.
///
/// `normals` and `texcoords` are either empty or parallel to `positions`: entry `i` of each
/// belongs to vertex `i`. Every three consecutive entries of `triangles` form one triangle,
/// listed in winding order, and each entry indexes into `positions`.
///
/// None of these invariants is enforced on construction. Meshes read from text files may
/// legitimately violate them (see [`MeshModel::is_well_formed`]).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshModel {
    pub name: String,
    pub positions: Vec<Vector3>,
    pub normals: Vec<Vector3>,
    pub texcoords: Vec<Vector2>,
    pub triangles: Vec<u32>,
}

impl MeshModel {
    pub fn new(positions: Vec<Vector3>, triangles: Vec<u32>) -> Self {
        Self {
            positions,
            triangles,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of complete triangles; a trailing partial triangle is not counted.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.triangles.is_empty()
    }

    /// Checks the structural invariants: whole triangles, in-range indices and attribute
    /// arrays that are empty or parallel to `positions`.
    pub fn is_well_formed(&self) -> bool {
        let n = self.positions.len();
        self.triangles.len() % 3 == 0
            && self.triangles.iter().all(|&i| (i as usize) < n)
            && (self.normals.is_empty() || self.normals.len() == n)
            && (self.texcoords.is_empty() || self.texcoords.len() == n)
    }

    /// Resolves the triangle at `index` to its corner positions.
    ///
    /// Returns `None` if the triangle is out of range or references a missing vertex.
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let start = index.checked_mul(3)?;
        let corners = self.triangles.get(start..start.checked_add(3)?)?;
        Some(Triangle {
            p0: *self.positions.get(corners[0] as usize)?,
            p1: *self.positions.get(corners[1] as usize)?,
            p2: *self.positions.get(corners[2] as usize)?,
        })
    }

    /// Iterates over the resolvable triangles of the mesh in index order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).filter_map(move |i| self.triangle(i))
    }

    /// Replaces `normals` with smooth per-vertex normals derived from the geometry.
    ///
    /// Each vertex receives the normalized sum of the unit face normals of the triangles that
    /// reference it. Vertices no triangle references (or that only touch degenerate
    /// triangles) get the zero vector.
    pub fn recompute_normals(&mut self) {
        if self.triangles.len() % 3 != 0 {
            warn!(
                "mesh '{}' has {} triangle indices, ignoring the trailing {}",
                self.name,
                self.triangles.len(),
                self.triangles.len() % 3
            );
        }

        let mut accum = vec![Vector3::zero(); self.positions.len()];
        let mut skipped = 0usize;
        for (i, corners) in self.triangles.chunks_exact(3).enumerate() {
            let Some(triangle) = self.triangle(i) else {
                skipped += 1;
                continue;
            };
            let normal = triangle.normal();
            for &corner in corners {
                accum[corner as usize] += normal;
            }
        }
        if skipped > 0 {
            warn!(
                "mesh '{}': skipped {} triangles referencing vertices beyond {}",
                self.name,
                skipped,
                self.positions.len()
            );
        }

        self.normals = accum.into_iter().map(normalize_or_zero).collect();
    }
}
