use bevy::prelude::*;
use cadence_index_animation_core::IndexAnimationHandle;

/// Owns an index animation for the entity. Despawning the entity drops the
/// handle, which unregisters the animation.
#[derive(Component, Debug)]
pub struct IndexAnimator(pub IndexAnimationHandle);

/// Mirror of the animator's current index, refreshed every `Update`.
/// Change detection fires only when the index moves.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnimatedIndex(pub usize);
