//! Narrow phase collision detection and ray casts

use super::Contact;
use crate::physics::components::CollisionShape;
use glam::{Quat, Vec3};
use hecs::Entity;

/// Test for collision between two shapes and generate contact information
///
/// Box-box pairs are not reported; boxes are only used as static or
/// kinematic scenery.
pub fn test_collision(
    shape_a: &CollisionShape,
    transform_a: (Vec3, Quat),
    entity_a: Entity,
    shape_b: &CollisionShape,
    transform_b: (Vec3, Quat),
    entity_b: Entity,
) -> Option<Contact> {
    match (shape_a, shape_b) {
        (
            CollisionShape::Sphere { radius: radius_a },
            CollisionShape::Sphere { radius: radius_b },
        ) => sphere_sphere_collision(
            transform_a.0,
            *radius_a,
            entity_a,
            transform_b.0,
            *radius_b,
            entity_b,
        ),
        (CollisionShape::Sphere { radius }, CollisionShape::Box { half_extents }) => {
            sphere_box_collision(
                transform_a.0,
                *radius,
                entity_a,
                transform_b.0,
                transform_b.1,
                *half_extents,
                entity_b,
            )
        }
        (CollisionShape::Box { half_extents }, CollisionShape::Sphere { radius }) => {
            sphere_box_collision(
                transform_b.0,
                *radius,
                entity_b,
                transform_a.0,
                transform_a.1,
                *half_extents,
                entity_a,
            )
            .map(|contact| contact.flipped())
        }
        (CollisionShape::Box { .. }, CollisionShape::Box { .. }) => None,
    }
}

/// Test collision between two spheres
fn sphere_sphere_collision(
    pos_a: Vec3,
    radius_a: f32,
    entity_a: Entity,
    pos_b: Vec3,
    radius_b: f32,
    entity_b: Entity,
) -> Option<Contact> {
    let delta = pos_b - pos_a;
    let distance_sq = delta.length_squared();
    let radius_sum = radius_a + radius_b;

    if distance_sq > radius_sum * radius_sum {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > 0.0 {
        delta / distance
    } else {
        // Concentric spheres, any normal will do
        Vec3::Y
    };

    let penetration = radius_sum - distance;
    let contact_point = pos_a + normal * (radius_a - penetration * 0.5);

    Some(Contact::new(
        entity_a,
        entity_b,
        contact_point,
        normal,
        penetration,
    ))
}

/// Test collision between a sphere and an oriented box
///
/// The returned normal points from the sphere towards the box.
fn sphere_box_collision(
    sphere_pos: Vec3,
    sphere_radius: f32,
    sphere_entity: Entity,
    box_pos: Vec3,
    box_rot: Quat,
    box_half_extents: Vec3,
    box_entity: Entity,
) -> Option<Contact> {
    // Transform sphere to box's local space
    let local_sphere_pos = box_rot.conjugate() * (sphere_pos - box_pos);

    // Closest point on box to sphere center
    let closest = local_sphere_pos.clamp(-box_half_extents, box_half_extents);

    let delta = local_sphere_pos - closest;
    let distance_sq = delta.length_squared();

    if distance_sq > sphere_radius * sphere_radius {
        return None;
    }

    let distance = distance_sq.sqrt();
    let (outward, penetration) = if distance > 0.0 {
        (delta / distance, sphere_radius - distance)
    } else {
        // Center inside the box: push out through the nearest face
        let face_distances = [
            (
                box_half_extents.x - local_sphere_pos.x.abs(),
                Vec3::X * sign_or_one(local_sphere_pos.x),
            ),
            (
                box_half_extents.y - local_sphere_pos.y.abs(),
                Vec3::Y * sign_or_one(local_sphere_pos.y),
            ),
            (
                box_half_extents.z - local_sphere_pos.z.abs(),
                Vec3::Z * sign_or_one(local_sphere_pos.z),
            ),
        ];
        let (depth, face) = face_distances
            .iter()
            .copied()
            .fold((f32::MAX, Vec3::Y), |best, candidate| {
                if candidate.0 < best.0 {
                    candidate
                } else {
                    best
                }
            });
        (face, sphere_radius + depth)
    };

    // Outward points from the box surface to the sphere
    let world_outward = box_rot * outward;
    let contact_point = sphere_pos - world_outward * sphere_radius;

    Some(Contact::new(
        sphere_entity,
        box_entity,
        contact_point,
        -world_outward,
        penetration,
    ))
}

fn sign_or_one(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Ray used for probe queries
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin in world space
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

/// Hit information from a ray cast against a single shape
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance along the ray
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
    /// Surface normal at hit point
    pub normal: Vec3,
}

/// Cast a ray against a shape
///
/// Rays starting inside a shape do not hit it.
pub fn ray_cast_shape(
    ray: &Ray,
    max_distance: f32,
    shape: &CollisionShape,
    transform: (Vec3, Quat),
) -> Option<RayHit> {
    match shape {
        CollisionShape::Sphere { radius } => ray_sphere(ray, max_distance, transform.0, *radius),
        CollisionShape::Box { half_extents } => {
            ray_box(ray, max_distance, transform.0, transform.1, *half_extents)
        }
    }
}

fn ray_sphere(ray: &Ray, max_distance: f32, center: Vec3, radius: f32) -> Option<RayHit> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;

    if c < 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    if t < 0.0 || t > max_distance {
        return None;
    }

    let point = ray.origin + ray.direction * t;
    Some(RayHit {
        distance: t,
        point,
        normal: (point - center).normalize_or_zero(),
    })
}

fn ray_box(
    ray: &Ray,
    max_distance: f32,
    box_pos: Vec3,
    box_rot: Quat,
    half_extents: Vec3,
) -> Option<RayHit> {
    let inverse = box_rot.conjugate();
    let origin = inverse * (ray.origin - box_pos);
    let direction = inverse * ray.direction;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut local_normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let h = half_extents[axis];

        if d.abs() < f32::EPSILON {
            // Parallel to this slab
            if o < -h || o > h {
                return None;
            }
            continue;
        }

        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

        if near > t_min {
            t_min = near;
            let mut normal = Vec3::ZERO;
            normal[axis] = -d.signum();
            local_normal = normal;
        }
        t_max = t_max.min(far);

        if t_min > t_max {
            return None;
        }
    }

    if t_min < 0.0 || t_min > max_distance {
        return None;
    }

    Some(RayHit {
        distance: t_min,
        point: ray.origin + ray.direction * t_min,
        normal: box_rot * local_normal,
    })
}
