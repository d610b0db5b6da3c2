use raybound_algebra::*;

/// Interleaved vertex as meshes arrive from the importer. Spatial code only
/// ever reads `position`; normal and uv ride along for the render path.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vertex {
  pub position: Vec3<f32>,
  pub normal: Vec3<f32>,
  pub uv: [f32; 2],
}

unsafe impl bytemuck::Zeroable for Vertex {}
unsafe impl bytemuck::Pod for Vertex {}

impl Vertex {
  pub fn new(position: Vec3<f32>, normal: Vec3<f32>, uv: [f32; 2]) -> Self {
    Self {
      position,
      normal,
      uv,
    }
  }

  /// Position-only constructor for geometry where shading attributes are
  /// irrelevant, e.g. collision meshes and tests.
  pub fn from_position(position: Vec3<f32>) -> Self {
    Self {
      position,
      normal: vec3(0.0, 1.0, 0.0),
      uv: [0.0, 0.0],
    }
  }
}
