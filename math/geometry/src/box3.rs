use raybound_algebra::*;

use crate::Axis3;

/// Axis aligned bounding box in mesh space.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Box3 {
  pub min: Vec3<f32>,
  pub max: Vec3<f32>,
}

unsafe impl bytemuck::Zeroable for Box3 {}
unsafe impl bytemuck::Pod for Box3 {}

impl Default for Box3 {
  fn default() -> Self {
    Self::empty()
  }
}

impl Box3 {
  #[inline]
  pub fn new(min: Vec3<f32>, max: Vec3<f32>) -> Self {
    Self { min, max }
  }

  /// The inverted sentinel box. Unioning anything into it yields that thing's
  /// bounds; its own extents are negative and its area reports zero.
  #[inline]
  pub fn empty() -> Self {
    Self {
      min: Vec3::splat(f32::INFINITY),
      max: Vec3::splat(f32::NEG_INFINITY),
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
  }

  #[inline]
  pub fn center(&self) -> Vec3<f32> {
    (self.min + self.max) * 0.5
  }

  #[inline]
  pub fn size(&self) -> Vec3<f32> {
    self.max - self.min
  }

  #[inline]
  pub fn expand_by_point(&mut self, point: Vec3<f32>) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  #[inline]
  pub fn expand_by_box(&mut self, box3: Box3) {
    self.min = self.min.min(box3.min);
    self.max = self.max.max(box3.max);
  }

  #[inline]
  #[must_use]
  pub fn union(&self, other: Box3) -> Self {
    Self {
      min: self.min.min(other.min),
      max: self.max.max(other.max),
    }
  }

  /// The axis with the largest extent and that extent. Exact ties fall
  /// through to the later axis; the comparison chain is fixed so axis
  /// selection stays deterministic.
  pub fn longest_axis(&self) -> (Axis3, f32) {
    let size = self.size();
    if size.x > size.y {
      if size.x > size.z {
        (Axis3::X, size.x)
      } else {
        (Axis3::Z, size.z)
      }
    } else if size.y > size.z {
      (Axis3::Y, size.y)
    } else {
      (Axis3::Z, size.z)
    }
  }

  /// Half the surface area, the quantity the surface area heuristic weighs
  /// child costs with. The constant factor cancels in cost comparisons.
  /// Empty boxes report zero instead of a meaningless negative product.
  #[inline]
  pub fn half_area(&self) -> f32 {
    let size = self.size();
    if size.x < 0.0 || size.y < 0.0 || size.z < 0.0 {
      0.0
    } else {
      size.x * size.y + size.y * size.z + size.z * size.x
    }
  }

  #[inline]
  pub fn contains_point(&self, p: Vec3<f32>) -> bool {
    p.x >= self.min.x
      && p.x <= self.max.x
      && p.y >= self.min.y
      && p.y <= self.max.y
      && p.z >= self.min.z
      && p.z <= self.max.z
  }

  #[inline]
  pub fn contains_box(&self, other: &Box3) -> bool {
    !other.is_empty() && self.contains_point(other.min) && self.contains_point(other.max)
  }

  pub fn from_points(iter: impl Iterator<Item = Vec3<f32>>) -> Self {
    let mut bbox = Self::empty();
    iter.for_each(|p| bbox.expand_by_point(p));
    bbox
  }

  pub fn from_boxes(iter: impl Iterator<Item = Box3>) -> Self {
    let mut bbox = Self::empty();
    iter.for_each(|b| bbox.expand_by_box(b));
    bbox
  }
}

impl FromIterator<Box3> for Box3 {
  fn from_iter<I: IntoIterator<Item = Box3>>(iter: I) -> Self {
    Self::from_boxes(iter.into_iter())
  }
}

impl FromIterator<Vec3<f32>> for Box3 {
  fn from_iter<I: IntoIterator<Item = Vec3<f32>>>(iter: I) -> Self {
    Self::from_points(iter.into_iter())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_box_unions_to_identity() {
    let b = Box3::new(vec3(-1.0, 0.0, 2.0), vec3(1.0, 3.0, 4.0));
    assert_eq!(Box3::empty().union(b), b);
    assert!(Box3::empty().is_empty());
    assert_eq!(Box3::empty().half_area(), 0.0);
  }

  #[test]
  fn longest_axis_is_deterministic() {
    let b = Box3::new(Vec3::zero(), vec3(3.0, 1.0, 2.0));
    assert_eq!(b.longest_axis().0, Axis3::X);

    let b = Box3::new(Vec3::zero(), vec3(1.0, 1.0, 2.0));
    assert_eq!(b.longest_axis().0, Axis3::Z);

    // exact tie falls through the strict comparison chain
    let b = Box3::new(Vec3::zero(), Vec3::splat(1.0));
    assert_eq!(b.longest_axis().0, Axis3::Z);
  }

  #[test]
  fn half_area_of_unit_cube() {
    let b = Box3::new(Vec3::zero(), Vec3::splat(1.0));
    assert_eq!(b.half_area(), 3.0);
  }

  #[test]
  fn containment() {
    let outer = Box3::new(Vec3::zero(), Vec3::splat(2.0));
    let inner = Box3::new(Vec3::splat(0.5), Vec3::splat(1.5));
    assert!(outer.contains_box(&inner));
    assert!(!inner.contains_box(&outer));
    assert!(!outer.contains_box(&Box3::empty()));
  }
}
