use std::ops::Range;

use raybound_algebra::Vec3;
use raybound_geometry::Box3;

/// One item of the build input: bounds plus the representative point used to
/// classify it against split planes. For meshes the center is the triangle
/// centroid, which is not the bounding box center.
pub struct BuildPrimitive {
  pub bounding: Box3,
  pub center: Vec3<f32>,
}

impl BuildPrimitive {
  pub fn new(bounding: Box3) -> Self {
    let center = bounding.center();
    Self { bounding, center }
  }

  pub fn with_center(bounding: Box3, center: Vec3<f32>) -> Self {
    Self { bounding, center }
  }
}

/// Caller-facing granularity knob. Smaller targets yield deeper trees with
/// tighter leaves at the price of build time and node memory.
pub struct TreeBuildOption {
  pub target_leaf_size: usize,
}

impl Default for TreeBuildOption {
  fn default() -> Self {
    Self {
      target_leaf_size: 4,
    }
  }
}

impl TreeBuildOption {
  #[inline]
  pub fn should_continue(&self, item_count: usize) -> bool {
    item_count > self.target_leaf_size
  }
}

pub fn bounding_from_build_source(
  index_list: &[u32],
  primitives: &[BuildPrimitive],
  range: Range<usize>,
) -> Box3 {
  index_list[range]
    .iter()
    .map(|&index| primitives[index as usize].bounding)
    .collect()
}

/// Seeded random boxes for tests and benches, reproducible across runs.
pub fn generate_boxes_in_space(count: usize, space_size: f32, box_size: f32) -> Vec<Box3> {
  use rand::prelude::*;
  use rand_chacha::ChaCha8Rng;

  const SEED: u64 = 0x51AB_93F0_26C4_77E1;
  let mut rng = ChaCha8Rng::seed_from_u64(SEED);
  let mut random = || rng.gen::<f32>();

  (0..count)
    .map(|_| {
      let center = Vec3::new(random(), random(), random()) * space_size;
      let half_size = Vec3::new(random(), random(), random()) * box_size;
      Box3::new(center - half_size, center + half_size)
    })
    .collect()
}
