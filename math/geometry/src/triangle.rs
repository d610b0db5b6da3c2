use raybound_algebra::*;

use crate::Box3;

/// Triangle by three corner positions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
  pub a: Vec3<f32>,
  pub b: Vec3<f32>,
  pub c: Vec3<f32>,
}

impl Triangle {
  #[inline]
  pub fn new(a: Vec3<f32>, b: Vec3<f32>, c: Vec3<f32>) -> Self {
    Self { a, b, c }
  }

  /// Exact min/max bounds of the three corners, no padding.
  #[inline]
  pub fn bounding(&self) -> Box3 {
    Box3 {
      min: self.a.min(self.b).min(self.c),
      max: self.a.max(self.b).max(self.c),
    }
  }

  /// Arithmetic mean of the corners. This is the representative point split
  /// classification uses; note it is not the bounding box center.
  #[inline]
  pub fn centroid(&self) -> Vec3<f32> {
    (self.a + self.b + self.c) / 3.0
  }

  pub fn face_normal_unnormalized(&self) -> Vec3<f32> {
    let cb = self.c - self.b;
    let ab = self.a - self.b;
    cb.cross(ab)
  }
}
