use raybound_geometry::Box3;

use super::BvhNode;
use crate::utils::{bounding_from_build_source, BuildPrimitive, TreeBuildOption};

const SAH_BIN_COUNT: usize = 8;

/// Children are never materialized with fewer primitives than this; a split
/// that would produce a sliver (or empty) side leaves the parent a leaf.
const MIN_PRIMITIVES_PER_CHILD: usize = 2;

/// Axes whose centroid extent falls under this cannot host a useful split
/// plane and would feed a near-zero scale into bin classification.
const DEGENERATE_AXIS_EPSILON: f32 = 1e-5;

#[derive(Clone, Copy)]
struct Bin {
  bounds: Box3,
  count: usize,
}

impl Default for Bin {
  fn default() -> Self {
    Self {
      bounds: Box3::empty(),
      count: 0,
    }
  }
}

struct SplitCandidate {
  axis: usize,
  position: f32,
  cost: f32,
}

pub(super) struct Subdivider<'a> {
  pub primitives: &'a [BuildPrimitive],
  pub index: &'a mut Vec<u32>,
  pub nodes: &'a mut Vec<BvhNode>,
}

impl Subdivider<'_> {
  #[inline]
  fn center(&self, sorted_slot: usize, axis: usize) -> f32 {
    self.primitives[self.index[sorted_slot] as usize].center[axis]
  }

  /// Recompute a node's bounds as the exact union of its primitive run.
  /// Only called while the node still owns a run, i.e. before any flip to
  /// internal, which is what keeps every stored box tight.
  pub fn update_node_bounds(&mut self, node_idx: usize) {
    let range = self.nodes[node_idx].primitive_range();
    let bounds = bounding_from_build_source(self.index.as_slice(), self.primitives, range);
    self.nodes[node_idx].set_bounding(bounds);
  }

  pub fn subdivide(&mut self, node_idx: usize, option: &TreeBuildOption) {
    let node = self.nodes[node_idx];
    let first = node.first_primitive as usize;
    let count = node.primitive_count as usize;

    if !option.should_continue(count) {
      return;
    }

    let (axis, split_pos) = match self.find_binned_sah_split(first, count) {
      Some(candidate) => (candidate.axis, candidate.position),
      None => self.median_split(node.bounding(), first, count),
    };

    // in-place two pointer partition of the node's slice of the index:
    // centers strictly below the plane end up first, ties go right
    let mut i = first;
    let mut j = first + count;
    while i < j {
      if self.center(i, axis) < split_pos {
        i += 1;
      } else {
        j -= 1;
        self.index.swap(i, j);
      }
    }

    let left_count = i - first;
    let right_count = count - left_count;
    if left_count < MIN_PRIMITIVES_PER_CHILD || right_count < MIN_PRIMITIVES_PER_CHILD {
      return;
    }

    let left_child = self.nodes.len() as u32;
    self.nodes[node_idx].left_child = left_child;
    // flips the parent from leaf to internal; the count is the discriminant
    self.nodes[node_idx].primitive_count = 0;

    self.nodes.push(BvhNode {
      first_primitive: first as u32,
      primitive_count: left_count as u32,
      ..Default::default()
    });
    self.nodes.push(BvhNode {
      first_primitive: (first + left_count) as u32,
      primitive_count: right_count as u32,
      ..Default::default()
    });

    self.update_node_bounds(left_child as usize);
    self.update_node_bounds(left_child as usize + 1);

    self.subdivide(left_child as usize, option);
    self.subdivide(left_child as usize + 1, option);
  }

  /// Binned SAH over all three axes. Returns None when no boundary produces
  /// a both-sides-nonempty split, e.g. when every center coincides.
  fn find_binned_sah_split(&self, first: usize, count: usize) -> Option<SplitCandidate> {
    // bins span the range of centers, not the node box; a split plane can
    // only ever fall between two distinct center coordinates
    let centroid_bounds: Box3 = self.index[first..first + count]
      .iter()
      .map(|&i| self.primitives[i as usize].center)
      .collect();

    let mut best: Option<SplitCandidate> = None;

    for axis in 0..3 {
      let axis_min = centroid_bounds.min[axis];
      let extent = centroid_bounds.max[axis] - axis_min;
      if extent < DEGENERATE_AXIS_EPSILON {
        continue;
      }

      let mut bins = [Bin::default(); SAH_BIN_COUNT];
      let scale = SAH_BIN_COUNT as f32 / extent;
      for &i in &self.index[first..first + count] {
        let primitive = &self.primitives[i as usize];
        let bin_idx =
          (((primitive.center[axis] - axis_min) * scale) as usize).min(SAH_BIN_COUNT - 1);
        bins[bin_idx].count += 1;
        bins[bin_idx].bounds.expand_by_box(primitive.bounding);
      }

      // one forward and one backward sweep give the union bounds and counts
      // on both sides of every boundary
      let mut left_area = [0.0_f32; SAH_BIN_COUNT];
      let mut left_count = [0_usize; SAH_BIN_COUNT];
      let mut right_area = [0.0_f32; SAH_BIN_COUNT];
      let mut right_count = [0_usize; SAH_BIN_COUNT];

      let mut swept = Box3::empty();
      let mut sum = 0;
      for bin_idx in 0..SAH_BIN_COUNT {
        sum += bins[bin_idx].count;
        swept.expand_by_box(bins[bin_idx].bounds);
        left_count[bin_idx] = sum;
        left_area[bin_idx] = swept.half_area();
      }

      swept = Box3::empty();
      sum = 0;
      for bin_idx in (0..SAH_BIN_COUNT).rev() {
        sum += bins[bin_idx].count;
        swept.expand_by_box(bins[bin_idx].bounds);
        right_count[bin_idx] = sum;
        right_area[bin_idx] = swept.half_area();
      }

      // boundaries scanned left to right under strict less-than, axes in
      // x/y/z order: the first minimum wins, which pins down tie behavior
      // and makes rebuilds bit-identical
      for boundary in 0..SAH_BIN_COUNT - 1 {
        if left_count[boundary] == 0 || right_count[boundary + 1] == 0 {
          continue;
        }
        let cost = left_count[boundary] as f32 * left_area[boundary]
          + right_count[boundary + 1] as f32 * right_area[boundary + 1];
        if best.as_ref().map_or(true, |b| cost < b.cost) {
          best = Some(SplitCandidate {
            axis,
            position: axis_min + (boundary + 1) as f32 * (extent / SAH_BIN_COUNT as f32),
            cost,
          });
        }
      }
    }

    best
  }

  /// Fallback when SAH found nothing: partially order the run around its
  /// median on the longest node axis and split at the median center.
  fn median_split(&mut self, node_bounds: Box3, first: usize, count: usize) -> (usize, f32) {
    let axis = node_bounds.longest_axis().0.as_index();
    let primitives = self.primitives;
    let slice = &mut self.index[first..first + count];
    let mid = count / 2;
    slice.select_nth_unstable_by(mid, |&a, &b| {
      primitives[a as usize].center[axis].total_cmp(&primitives[b as usize].center[axis])
    });
    (axis, primitives[slice[mid] as usize].center[axis])
  }
}
