mod vec3;

pub use num_traits::{One, Zero};
pub use vec3::*;

use num_traits::real::Real;

/// The scalar type usable as vector components in this workspace.
///
/// Everything downstream instantiates with f32, the precision the mesh data
/// uses; the bound keeps an f64 upgrade open without touching call sites.
pub trait Scalar: Real + Default + std::fmt::Debug + 'static {}
impl<T: Real + Default + std::fmt::Debug + 'static> Scalar for T {}
