pub struct TestModel {
    pub text: &'static str,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

pub const OBJ_CUBE: TestModel = TestModel {
    text: include_str!("../../../res/cube/cube.obj"),
    vertex_count: 8,
    triangle_count: 12,
};

/// Carries comments, groups, material directives, blank lines, a short vertex record, a
/// two-corner face and a polyline alongside a two-triangle panel.
pub const OBJ_ANNOTATED: TestModel = TestModel {
    text: include_str!("../../../res/annotated/annotated.obj"),
    vertex_count: 4,
    triangle_count: 2,
};

/// One four-corner face, which is read without triangulation.
pub const OBJ_QUAD: TestModel = TestModel {
    text: include_str!("../../../res/quad/quad.obj"),
    vertex_count: 4,
    triangle_count: 1,
};

/// A triangle whose comment and group name are Latin-1 encoded, so the file is not UTF-8.
pub const OBJ_LATIN1: &[u8] = include_bytes!("../../../res/latin1/latin1.obj");
