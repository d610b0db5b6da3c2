use std::time::{Duration, Instant};

use raybound_space_algorithm::bvh::{BvhNode, BvhStats, FlattenBvh};
use raybound_space_algorithm::utils::{BuildPrimitive, TreeBuildOption};

use crate::MeshBuffer;

/// The upload-ready acceleration structure of one mesh.
///
/// `nodes` is the flat tree (root at 0) and `tri_idx` the permutation that
/// maps a leaf's slots back to original triangle indices; traversal resolves
/// a leaf's triangles as `tri_idx[first_primitive + k]`. Both arrays are
/// recreated wholesale by every build; a mesh edit means calling
/// [`MeshBvh::build`] again and re-uploading.
pub struct MeshBvh {
  pub nodes: Vec<BvhNode>,
  pub tri_idx: Vec<u32>,
  pub stats: BvhStats,
  pub build_time: Duration,
}

impl MeshBvh {
  /// Build the tree for a finalized mesh. Runs synchronously to completion;
  /// a mesh without triangles yields an empty tree, which is valid output.
  ///
  /// A malformed index buffer is a caller contract violation: trapped by a
  /// debug assertion here, undefined tree content in release builds.
  pub fn build(mesh: &MeshBuffer, option: &TreeBuildOption) -> Self {
    debug_assert!(mesh.check_index_integrity(), "malformed index buffer");

    let started = Instant::now();

    // per-triangle bounds cache: owned by this invocation, recomputed
    // wholesale, immutable while the recursion runs
    let primitives: Vec<BuildPrimitive> = mesh
      .triangles()
      .map(|t| BuildPrimitive::with_center(t.bounding(), t.centroid()))
      .collect();

    let bvh = FlattenBvh::build(&primitives, option);
    let stats = bvh.compute_stats();
    let build_time = started.elapsed();

    log::debug!(
      "mesh bvh: {} tris -> {} nodes, {} leaves, max {} avg {:.2} tris/leaf, depth {}, took {:?}",
      mesh.triangle_count(),
      stats.node_count,
      stats.leaf_count,
      stats.max_leaf_size,
      stats.avg_leaf_size,
      stats.max_depth,
      build_time
    );

    Self {
      nodes: bvh.nodes,
      tri_idx: bvh.sorted_primitive_index,
      stats,
      build_time,
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn root(&self) -> Option<&BvhNode> {
    self.nodes.first()
  }

  /// Original triangle indices referenced by a leaf node.
  pub fn leaf_triangles(&self, leaf: &BvhNode) -> &[u32] {
    &self.tri_idx[leaf.primitive_range()]
  }
}

/// Build seam for mesh-shaped types; keeps call sites reading
/// `mesh.build_bvh(..)` without the container crate knowing about meshes.
pub trait MeshBvhExt {
  fn build_bvh(&self, option: &TreeBuildOption) -> MeshBvh;
}

impl MeshBvhExt for MeshBuffer {
  fn build_bvh(&self, option: &TreeBuildOption) -> MeshBvh {
    MeshBvh::build(self, option)
  }
}
