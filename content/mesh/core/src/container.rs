use raybound_algebra::*;
use raybound_geometry::{Box3, Triangle};

use crate::Vertex;

/// Flat indexed triangle mesh: every consecutive index triple names one
/// triangle. This is the exchange format between the importer, the BVH
/// builder, and the upload path.
#[derive(Debug, Default, Clone)]
pub struct MeshBuffer {
  pub vertices: Vec<Vertex>,
  pub indices: Vec<u32>,
}

/// Coarse whole-mesh bounds: an AABB plus the enclosing sphere around its
/// center. Used for camera framing and culling, not by the BVH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBounds {
  pub center: Vec3<f32>,
  pub radius: f32,
  pub size: Vec3<f32>,
}

impl MeshBuffer {
  pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
    let mesh = Self { vertices, indices };
    debug_assert!(mesh.check_index_integrity(), "malformed index buffer");
    mesh
  }

  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Corner positions of triangle `i`. Indices out of the vertex range are a
  /// caller contract violation and only trapped in debug builds.
  #[inline]
  pub fn triangle(&self, i: usize) -> Triangle {
    let base = i * 3;
    Triangle::new(
      self.position(self.indices[base]),
      self.position(self.indices[base + 1]),
      self.position(self.indices[base + 2]),
    )
  }

  #[inline]
  pub fn position(&self, vertex_index: u32) -> Vec3<f32> {
    self.vertices[vertex_index as usize].position
  }

  pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
    self.indices.chunks_exact(3).map(|tri| {
      Triangle::new(
        self.position(tri[0]),
        self.position(tri[1]),
        self.position(tri[2]),
      )
    })
  }

  /// True when the index count is a whole number of triangles and every
  /// index lands inside the vertex array.
  pub fn check_index_integrity(&self) -> bool {
    self.indices.len() % 3 == 0
      && self
        .indices
        .iter()
        .all(|&i| (i as usize) < self.vertices.len())
  }

  /// Whole-mesh bounds over the raw vertices. None for an empty mesh.
  pub fn compute_bounds(&self) -> Option<MeshBounds> {
    if self.vertices.is_empty() {
      return None;
    }

    let aabb = Box3::from_points(self.vertices.iter().map(|v| v.position));
    let center = aabb.center();
    let radius = self
      .vertices
      .iter()
      .map(|v| v.position.distance(center))
      .fold(0.0_f32, f32::max);

    Some(MeshBounds {
      center,
      radius,
      size: aabb.size(),
    })
  }
}
