use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use raybound_algebra::Vec3;
use raybound_geometry::Box3;

/// Flat BVH arena record, laid out for verbatim upload into a storage buffer.
///
/// `primitive_count == 0` marks an internal node; this zero/nonzero state is
/// the sole leaf discriminant, there is no separate tag. Children of an
/// internal node are always appended as a contiguous sibling pair, so the
/// right child lives at `left_child + 1` and one link field covers both.
///
/// `first_primitive` stays meaningful only for leaves; internal nodes keep
/// the value they carried while still unsplit. Consumers must not read it
/// once `primitive_count` is zero.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
  pub aabb_min: Vec3<f32>,
  pub left_child: u32,
  pub aabb_max: Vec3<f32>,
  pub first_primitive: u32,
  pub primitive_count: u32,
}

impl BvhNode {
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.primitive_count > 0
  }

  #[inline]
  pub fn bounding(&self) -> Box3 {
    Box3::new(self.aabb_min, self.aabb_max)
  }

  #[inline]
  pub(super) fn set_bounding(&mut self, bounding: Box3) {
    self.aabb_min = bounding.min;
    self.aabb_max = bounding.max;
  }

  #[inline]
  pub fn left_child_offset(&self) -> Option<u32> {
    (!self.is_leaf()).then_some(self.left_child)
  }

  #[inline]
  pub fn right_child_offset(&self) -> Option<u32> {
    (!self.is_leaf()).then_some(self.left_child + 1)
  }

  /// The slice of the sorted primitive index this leaf owns.
  #[inline]
  pub fn primitive_range(&self) -> Range<usize> {
    let first = self.first_primitive as usize;
    first..first + self.primitive_count as usize
  }
}
