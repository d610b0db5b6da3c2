mod build;
mod node;
mod stats;

#[cfg(test)]
mod test;

pub use node::*;
pub use stats::*;

use raybound_geometry::Box3;

use crate::utils::{BuildPrimitive, TreeBuildOption};
use build::Subdivider;

/// Flat binary BVH over a primitive sequence.
///
/// `nodes[0]` is the root and spans every primitive. Leaves reference
/// contiguous runs of `sorted_primitive_index`, which is a permutation of
/// `0..primitive_count`; primitives themselves are never moved, only their
/// indices are reordered during partitioning. Both arrays are plain data the
/// renderer can upload as-is.
pub struct FlattenBvh {
  pub nodes: Vec<BvhNode>,
  pub sorted_primitive_index: Vec<u32>,
}

impl FlattenBvh {
  /// Build the full tree synchronously. An empty input yields an empty tree
  /// with no root, which is a valid output rather than an error.
  ///
  /// The build is deterministic: a fixed input and option always produce
  /// bit-identical `nodes` and `sorted_primitive_index`.
  pub fn build(primitives: &[BuildPrimitive], option: &TreeBuildOption) -> Self {
    debug_assert!(
      primitives.len() < u32::MAX as usize,
      "primitive count must be addressable by u32"
    );

    if primitives.is_empty() {
      return Self {
        nodes: Vec::new(),
        sorted_primitive_index: Vec::new(),
      };
    }

    let mut index: Vec<u32> = (0..primitives.len() as u32).collect();
    let mut nodes = vec![BvhNode {
      first_primitive: 0,
      primitive_count: primitives.len() as u32,
      ..Default::default()
    }];

    let mut subdivider = Subdivider {
      primitives,
      index: &mut index,
      nodes: &mut nodes,
    };
    subdivider.update_node_bounds(0);
    subdivider.subdivide(0, option);

    log::trace!(
      "bvh build: {} primitives into {} nodes",
      primitives.len(),
      nodes.len()
    );

    Self {
      nodes,
      sorted_primitive_index: index,
    }
  }

  /// Convenience entry for sources whose representative point is simply the
  /// box center.
  pub fn from_boxes(source: impl Iterator<Item = Box3>, option: &TreeBuildOption) -> Self {
    let primitives: Vec<BuildPrimitive> = source.map(BuildPrimitive::new).collect();
    Self::build(&primitives, option)
  }

  pub fn root(&self) -> Option<&BvhNode> {
    self.nodes.first()
  }

  /// The original primitive indices a leaf references.
  pub fn leaf_primitives(&self, leaf: &BvhNode) -> &[u32] {
    &self.sorted_primitive_index[leaf.primitive_range()]
  }

  /// Depth-first walk. `branch_enter_visitor` returning false prunes that
  /// subtree; every reached leaf is handed to `leaf_visitor`.
  pub fn traverse(
    &self,
    mut branch_enter_visitor: impl FnMut(&BvhNode) -> bool,
    mut leaf_visitor: impl FnMut(&BvhNode),
  ) {
    if self.nodes.is_empty() {
      return;
    }
    let mut stack = vec![0_usize];
    while let Some(node_idx) = stack.pop() {
      let node = &self.nodes[node_idx];
      if node.is_leaf() {
        leaf_visitor(node);
      } else if branch_enter_visitor(node) {
        // right pushed first so the left subtree is walked first
        stack.push(node.left_child as usize + 1);
        stack.push(node.left_child as usize);
      }
    }
  }
}
