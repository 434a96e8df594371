//! Impact Events
//!
//! Collects rapier collision-start events that involve a marble and turns them
//! into [`ImpactEvent`]s with the impact normal speed. rapier requires
//! `EventHandler: Send + Sync`, hence the mutex; it is only ever locked from
//! the stepping thread.

use std::sync::{Mutex, MutexGuard};

use rapier3d::prelude::{
    ColliderSet, CollisionEvent, ContactPair, EventHandler, Real, RigidBodyHandle, RigidBodySet,
};

use super::materials::SurfaceMaterial;

/// A tracked body started touching something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEvent {
    /// The marble's rigid body
    pub body: RigidBodyHandle,
    /// What it hit
    pub surface: SurfaceMaterial,
    /// Speed along the contact normal just before the solver ran
    pub normal_speed: f32,
}

/// rapier event sink; drained once per sub-step.
#[derive(Debug, Default)]
pub struct ImpactCollector {
    events: Mutex<Vec<ImpactEvent>>,
}

impl ImpactCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<ImpactEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn drain(&self) -> Vec<ImpactEvent> {
        std::mem::take(&mut *self.events())
    }
}

impl EventHandler for ImpactCollector {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        let CollisionEvent::Started(h1, h2, _) = event else {
            return;
        };
        let (Some(c1), Some(c2)) = (colliders.get(h1), colliders.get(h2)) else {
            return;
        };
        let m1 = SurfaceMaterial::from_user_data(c1.user_data);
        let m2 = SurfaceMaterial::from_user_data(c2.user_data);

        let (marble, other) = match (m1, m2) {
            (Some(SurfaceMaterial::Marble), _) => (c1, m2),
            (_, Some(SurfaceMaterial::Marble)) => (c2, m1),
            _ => return,
        };
        let Some(handle) = marble.parent() else {
            return;
        };
        let Some(body) = bodies.get(handle) else {
            return;
        };

        let velocity = body.linvel();
        let normal_speed = contact_pair
            .and_then(|pair| pair.manifolds.first())
            .map(|manifold| velocity.dot(&manifold.data.normal).abs())
            .unwrap_or_else(|| velocity.norm());

        self.events().push(ImpactEvent {
            body: handle,
            surface: other.unwrap_or(SurfaceMaterial::Terrain),
            normal_speed,
        });
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}
