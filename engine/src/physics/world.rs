//! Minimal physics world
//!
//! Wraps a `hecs::World` holding `Transform`, `Rigidbody` and `Collider`
//! components. It does just enough for the sphere controller: contact
//! reports, trigger overlaps, ray probes, Euler integration and pushing
//! dynamic bodies out of penetrations.

use super::collision::narrow_phase::{ray_cast_shape, test_collision, Ray};
use super::components::{Collider, CollisionShape, Rigidbody, Transform};
use super::queries::{BodyInfo, ContactReport, PhysicsQueries, ProbeHit, ProbeQuery};
use glam::{Quat, Vec3};
use hecs::Entity;
use tracing::{debug, trace};

/// Extra radius used when looking for contacts so resting bodies keep
/// touching the surface they were pushed out of
pub const CONTACT_OFFSET: f32 = 0.01;

/// Physics world resource
pub struct PhysicsWorld {
    inner: hecs::World,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with arbitrary components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Spawn static geometry (no rigid body)
    pub fn spawn_static(&mut self, transform: Transform, collider: Collider) -> Entity {
        let entity = self.inner.spawn((transform, collider));
        debug!(entity = ?entity, shape = ?collider.shape, "Spawned static collider");
        entity
    }

    /// Spawn a rigid body with a collider
    pub fn spawn_body(
        &mut self,
        transform: Transform,
        rigidbody: Rigidbody,
        collider: Collider,
    ) -> Entity {
        let entity = self.inner.spawn((transform, rigidbody, collider));
        debug!(
            entity = ?entity,
            mass = rigidbody.mass,
            kinematic = rigidbody.is_kinematic,
            "Spawned rigid body"
        );
        entity
    }

    /// Despawn an entity and all its components
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get a reference to a component on an entity
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Insert a component into an entity
    pub fn insert_one(
        &mut self,
        entity: Entity,
        component: impl hecs::Component,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, component)
    }

    /// Query entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query()
    }

    /// Query entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut()
    }

    /// Copy of an entity's transform
    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.inner.get::<&Transform>(entity).ok().map(|t| *t)
    }

    /// Copy of an entity's rigid body
    pub fn rigidbody(&self, entity: Entity) -> Option<Rigidbody> {
        self.inner.get::<&Rigidbody>(entity).ok().map(|rb| *rb)
    }

    /// Mutable access to an entity's transform and rigid body at once
    pub fn body_mut(&mut self, entity: Entity) -> Option<(&mut Transform, &mut Rigidbody)> {
        self.inner
            .query_one_mut::<(&mut Transform, &mut Rigidbody)>(entity)
            .ok()
    }

    /// Overwrite a body's linear velocity
    pub fn set_velocity(&mut self, entity: Entity, velocity: Vec3) {
        if let Ok(rb) = self.inner.query_one_mut::<&mut Rigidbody>(entity) {
            rb.linear_velocity = velocity;
        }
    }

    /// Contacts currently touching `entity`
    ///
    /// Report normals point from the other surface towards `entity`.
    /// Triggers never produce contacts.
    pub fn contacts_for(&self, entity: Entity) -> Vec<ContactReport> {
        self.overlaps(entity, CONTACT_OFFSET)
            .into_iter()
            .map(|overlap| ContactReport {
                normal: overlap.normal,
                body: overlap.body,
                layer: overlap.layer,
            })
            .collect()
    }

    /// Trigger colliders overlapping `entity`
    pub fn triggers_for(&self, entity: Entity) -> Vec<Entity> {
        let Some((transform, collider)) = self.shape_of(entity) else {
            return Vec::new();
        };
        let aabb = collider
            .shape
            .world_aabb(transform.position, transform.rotation);

        let mut triggers = Vec::new();
        for (other, (other_transform, other_collider)) in
            self.inner.query::<(&Transform, &Collider)>().iter()
        {
            if other == entity || !other_collider.is_trigger {
                continue;
            }
            let other_aabb = other_collider
                .shape
                .world_aabb(other_transform.position, other_transform.rotation);
            if !aabb.overlaps(&other_aabb) {
                continue;
            }
            let touching = test_collision(
                &collider.shape,
                (transform.position, transform.rotation),
                entity,
                &other_collider.shape,
                (other_transform.position, other_transform.rotation),
                other,
            )
            .is_some();
            if touching {
                triggers.push(other);
            }
        }
        triggers
    }

    /// Advance every rigid body by `dt`
    ///
    /// Bodies move by their velocities; dynamic bodies are then pushed out of
    /// whatever solid colliders they penetrate and lose the part of their
    /// velocity heading into those surfaces. Forces such as gravity are the
    /// caller's business.
    pub fn integrate(&mut self, dt: f32) {
        for (_, (transform, rb)) in self.inner.query_mut::<(&mut Transform, &Rigidbody)>() {
            transform.position += rb.linear_velocity * dt;
            if rb.angular_velocity.length_squared() > 1e-12 {
                let delta = Quat::from_scaled_axis(rb.angular_velocity * dt);
                transform.rotation = (delta * transform.rotation).normalize();
            }
        }

        let dynamic: Vec<Entity> = self
            .inner
            .query::<(&Rigidbody, &Collider)>()
            .iter()
            .filter(|(_, (rb, collider))| !rb.is_kinematic && !collider.is_trigger)
            .map(|(entity, _)| entity)
            .collect();

        for entity in dynamic {
            self.resolve_penetrations(entity);
        }
    }

    fn resolve_penetrations(&mut self, entity: Entity) {
        let overlaps = self.overlaps(entity, 0.0);
        if overlaps.is_empty() {
            return;
        }

        let other_velocities: Vec<Vec3> = overlaps
            .iter()
            .map(|overlap| {
                overlap
                    .body
                    .and_then(|body| self.rigidbody(body))
                    .map(|rb| rb.linear_velocity)
                    .unwrap_or(Vec3::ZERO)
            })
            .collect();

        let Some((transform, rb)) = self.body_mut(entity) else {
            return;
        };
        for (overlap, other_velocity) in overlaps.iter().zip(other_velocities) {
            if overlap.penetration > 0.0 {
                transform.position += overlap.normal * overlap.penetration;
            }
            let into_surface = (rb.linear_velocity - other_velocity).dot(overlap.normal);
            if into_surface < 0.0 {
                rb.linear_velocity -= overlap.normal * into_surface;
            }
            trace!(
                entity = ?entity,
                normal = ?overlap.normal,
                penetration = overlap.penetration,
                "Resolved penetration"
            );
        }
    }

    fn shape_of(&self, entity: Entity) -> Option<(Transform, Collider)> {
        let transform = self.transform(entity)?;
        let collider = *self.inner.get::<&Collider>(entity).ok()?;
        Some((transform, collider))
    }

    /// Solid colliders overlapping `entity`, with its own shape inflated by `skin`
    fn overlaps(&self, entity: Entity, skin: f32) -> Vec<Overlap> {
        let Some((transform, collider)) = self.shape_of(entity) else {
            return Vec::new();
        };
        let shape = match collider.shape {
            CollisionShape::Sphere { radius } => CollisionShape::Sphere {
                radius: radius + skin,
            },
            CollisionShape::Box { half_extents } => CollisionShape::Box {
                half_extents: half_extents + Vec3::splat(skin),
            },
        };
        let aabb = shape.world_aabb(transform.position, transform.rotation);

        let mut overlaps = Vec::new();
        for (other, (other_transform, other_collider, other_rb)) in self
            .inner
            .query::<(&Transform, &Collider, Option<&Rigidbody>)>()
            .iter()
        {
            if other == entity || other_collider.is_trigger {
                continue;
            }
            let other_aabb = other_collider
                .shape
                .world_aabb(other_transform.position, other_transform.rotation);
            if !aabb.overlaps(&other_aabb) {
                continue;
            }
            if let Some(contact) = test_collision(
                &shape,
                (transform.position, transform.rotation),
                entity,
                &other_collider.shape,
                (other_transform.position, other_transform.rotation),
                other,
            ) {
                overlaps.push(Overlap {
                    normal: -contact.normal,
                    penetration: contact.penetration - skin,
                    body: other_rb.map(|_| other),
                    layer: other_collider.layer,
                });
            }
        }
        overlaps
    }
}

struct Overlap {
    /// From the other collider towards the queried entity
    normal: Vec3,
    penetration: f32,
    body: Option<Entity>,
    layer: u32,
}

impl PhysicsQueries for PhysicsWorld {
    fn probe(&self, query: &ProbeQuery) -> Option<ProbeHit> {
        let direction = query.direction.normalize_or_zero();
        if direction == Vec3::ZERO || query.max_distance <= 0.0 {
            return None;
        }
        let ray = Ray {
            origin: query.origin,
            direction,
        };

        let mut closest: Option<ProbeHit> = None;
        for (entity, (transform, collider, rb)) in self
            .inner
            .query::<(&Transform, &Collider, Option<&Rigidbody>)>()
            .iter()
        {
            if collider.is_trigger
                || query.exclude == Some(entity)
                || !query.layer_mask.contains(collider.layer)
            {
                continue;
            }
            let max_distance = closest.map_or(query.max_distance, |hit| hit.distance);
            if let Some(hit) = ray_cast_shape(
                &ray,
                max_distance,
                &collider.shape,
                (transform.position, transform.rotation),
            ) {
                closest = Some(ProbeHit {
                    normal: hit.normal,
                    distance: hit.distance,
                    point: hit.point,
                    body: rb.map(|_| entity),
                    collider: entity,
                    layer: collider.layer,
                });
            }
        }
        closest
    }

    fn body_info(&self, body: Entity) -> Option<BodyInfo> {
        let transform = self.transform(body)?;
        let rb = self.rigidbody(body)?;
        Some(BodyInfo {
            transform,
            mass: rb.mass,
            is_kinematic: rb.is_kinematic,
        })
    }
}
