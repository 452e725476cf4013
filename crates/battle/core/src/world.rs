use crate::env::{RngOracle, Scene};
use crate::state::Battlefield;

/// Mutable collaborators threaded through resolution.
///
/// Borrowed for one resume at a time; the caller keeps ownership between
/// suspensions.
pub struct World<'w> {
    pub field: &'w mut Battlefield,
    pub scene: &'w mut dyn Scene,
    pub rng: &'w mut dyn RngOracle,
}

impl<'w> World<'w> {
    pub fn new(
        field: &'w mut Battlefield,
        scene: &'w mut dyn Scene,
        rng: &'w mut dyn RngOracle,
    ) -> Self {
        Self { field, scene, rng }
    }
}
