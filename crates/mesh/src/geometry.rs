use cgmath::{InnerSpace, Zero};

pub type Vector3 = cgmath::Vector3<f32>;
pub type Vector2 = cgmath::Vector2<f32>;

// Writers emit vectors component by component and rely on a packed layout.
static_assertions::assert_eq_size!(Vector3, [f32; 3]);
static_assertions::assert_eq_size!(Vector2, [f32; 2]);
static_assertions::assert_eq_align!(Vector3, f32);

#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Triangle {
    pub p0: Vector3,
    pub p1: Vector3,
    pub p2: Vector3,
}

impl Triangle {
    pub fn new(p0: Vector3, p1: Vector3, p2: Vector3) -> Self {
        Self { p0, p1, p2 }
    }

    /// Unit normal of the triangle following the right-hand rule over `p0, p1, p2`.
    ///
    /// Degenerate (zero-area) triangles yield the zero vector instead of NaN.
    pub fn normal(&self) -> Vector3 {
        normalize_or_zero((self.p1 - self.p0).cross(self.p2 - self.p0))
    }
}

impl std::default::Default for Triangle {
    fn default() -> Self {
        Self {
            p0: Vector3::zero(),
            p1: Vector3::zero(),
            p2: Vector3::zero(),
        }
    }
}

/// Normalizes `v`, mapping zero-length (or non-finite length) input to zero.
pub fn normalize_or_zero(v: Vector3) -> Vector3 {
    let len2 = v.magnitude2();
    if len2 > 0.0 && len2.is_finite() {
        v / len2.sqrt()
    } else {
        Vector3::zero()
    }
}
