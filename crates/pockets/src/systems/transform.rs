//! World-matrix propagation over the locus hierarchy.

use glam::Affine2;
use slotmap::SecondaryMap;

use crate::api::types::EntityId;
use crate::core::world::World;

/// Caches the world matrix of every locus for the current frame.
#[derive(Debug, Default)]
pub struct TransformSystem {
    world_matrices: SecondaryMap<EntityId, Affine2>,
    // Scratch chain reused across propagations.
    pending: Vec<EntityId>,
}

impl TransformSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every world matrix. Each locus is visited once and parents
    /// are resolved before their children, without recursion.
    pub fn propagate(&mut self, world: &World) {
        self.world_matrices.clear();

        for (id, _) in world.loci.iter() {
            if self.world_matrices.contains_key(id) {
                continue;
            }

            // Climb until a computed ancestor (or the root) is found.
            self.pending.clear();
            let mut cursor = Some(id);
            let mut base = Affine2::IDENTITY;
            while let Some(current) = cursor {
                if let Some(&known) = self.world_matrices.get(current) {
                    base = known;
                    break;
                }
                let Some(locus) = world.loci.get(current) else { break };
                self.pending.push(current);
                cursor = locus.parent;
            }

            // Unwind from the topmost uncomputed ancestor down to `id`.
            while let Some(current) = self.pending.pop() {
                if let Some(locus) = world.loci.get(current) {
                    base = base * locus.local_matrix();
                }
                self.world_matrices.insert(current, base);
            }
        }
    }

    /// World matrix from the last [`propagate`](Self::propagate).
    pub fn world_matrix(&self, id: EntityId) -> Option<Affine2> {
        self.world_matrices.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.world_matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world_matrices.is_empty()
    }
}
