//! Per-step contact bookkeeping
//!
//! Contacts are folded in one at a time before the step runs. Counts and
//! summed normals do not depend on the order contacts arrive in.

use crate::config::SphereParams;
use crate::physics::ContactReport;
use glam::Vec3;
use hecs::Entity;
use tracing::trace;

/// Anything with an up-dot below this is a ceiling, not a steep wall
pub const MIN_STEEP_DOT: f32 = -0.01;

/// Contact counts and summed normals for one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactAccumulator {
    pub ground_count: u32,
    pub steep_count: u32,
    pub climb_count: u32,

    /// Sum of ground normals, normalized once more than one was seen
    pub contact_normal: Vec3,
    pub steep_normal: Vec3,
    pub climb_normal: Vec3,
    /// Most recent single climb normal, used in crevasses
    pub last_climb_normal: Vec3,

    /// Body the sphere rests on this step
    pub connected_body: Option<Entity>,
    /// Body the sphere rested on last step
    pub previous_connected_body: Option<Entity>,
}

impl ContactAccumulator {
    /// Classify one contact and fold it in
    ///
    /// Ground contacts win over steep ones for the connected body. Climb
    /// contacts are only considered for contacts that are not ground.
    pub fn accumulate(
        &mut self,
        contact: &ContactReport,
        up_axis: Vec3,
        params: &SphereParams,
        wants_climb: bool,
    ) {
        let normal = contact.normal;
        let up_dot = up_axis.dot(normal);

        if up_dot >= params.min_dot(contact.layer) {
            self.ground_count += 1;
            self.contact_normal += normal;
            self.connected_body = contact.body;
            trace!(?normal, up_dot, "Ground contact");
            return;
        }

        if up_dot >= MIN_STEEP_DOT {
            self.steep_count += 1;
            self.steep_normal += normal;
            if self.ground_count == 0 {
                self.connected_body = contact.body;
            }
            trace!(?normal, up_dot, "Steep contact");
        }

        let climbable = wants_climb
            && up_dot >= params.min_climb_dot
            && params.config.climbable_mask.contains(contact.layer);
        if climbable {
            self.climb_count += 1;
            self.climb_normal += normal;
            self.last_climb_normal = normal;
            self.connected_body = contact.body;
            trace!(?normal, up_dot, "Climb contact");
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.ground_count > 0
    }

    pub fn has_steep(&self) -> bool {
        self.steep_count > 0
    }

    /// Forget this step's contacts and remember the connected body
    pub fn reset(&mut self) {
        self.ground_count = 0;
        self.steep_count = 0;
        self.climb_count = 0;
        self.contact_normal = Vec3::ZERO;
        self.steep_normal = Vec3::ZERO;
        self.climb_normal = Vec3::ZERO;
        self.previous_connected_body = self.connected_body.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayerMask, SphereConfig};

    fn wall(angle_from_up_deg: f32) -> Vec3 {
        let angle = angle_from_up_deg.to_radians();
        Vec3::new(angle.sin(), angle.cos(), 0.0)
    }

    #[test]
    fn test_classification() {
        let params = SphereParams::default();
        let mut contacts = ContactAccumulator::default();

        contacts.accumulate(&ContactReport::with_static(wall(10.0), 0), Vec3::Y, &params, false);
        contacts.accumulate(&ContactReport::with_static(wall(80.0), 0), Vec3::Y, &params, false);
        // Ceiling
        contacts.accumulate(&ContactReport::with_static(Vec3::NEG_Y, 0), Vec3::Y, &params, false);

        assert_eq!(contacts.ground_count, 1);
        assert_eq!(contacts.steep_count, 1);
        assert_eq!(contacts.climb_count, 0);
    }

    #[test]
    fn test_climb_needs_intent_and_mask() {
        let config = SphereConfig {
            climbable_mask: LayerMask::from_layers(&[5]),
            ..Default::default()
        };
        let params = SphereParams::new(config);
        let mut contacts = ContactAccumulator::default();

        contacts.accumulate(&ContactReport::with_static(Vec3::X, 5), Vec3::Y, &params, false);
        assert_eq!(contacts.climb_count, 0);

        contacts.accumulate(&ContactReport::with_static(Vec3::X, 0), Vec3::Y, &params, true);
        assert_eq!(contacts.climb_count, 0);

        // Overhang below the climb angle still climbable
        let overhang = wall(120.0);
        contacts.accumulate(&ContactReport::with_static(overhang, 5), Vec3::Y, &params, true);
        assert_eq!(contacts.climb_count, 1);
        assert_eq!(contacts.last_climb_normal, overhang);
        // Not a steep contact though
        assert_eq!(contacts.steep_count, 2);
    }

    #[test]
    fn test_ground_wins_connected_body() {
        let mut world = hecs::World::new();
        let floor = world.spawn(());
        let wall_body = world.spawn(());
        let params = SphereParams::default();

        let mut contacts = ContactAccumulator::default();
        contacts.accumulate(&ContactReport::with_body(Vec3::Y, floor, 0), Vec3::Y, &params, false);
        contacts.accumulate(&ContactReport::with_body(Vec3::X, wall_body, 0), Vec3::Y, &params, false);
        assert_eq!(contacts.connected_body, Some(floor));

        contacts.reset();
        assert_eq!(contacts.previous_connected_body, Some(floor));
        assert_eq!(contacts.connected_body, None);
        assert_eq!(contacts.ground_count, 0);
        assert_eq!(contacts.contact_normal, Vec3::ZERO);
    }

    #[test]
    fn test_order_does_not_change_counts() {
        let params = SphereParams::default();
        let reports = [
            ContactReport::with_static(wall(5.0), 0),
            ContactReport::with_static(wall(85.0), 0),
            ContactReport::with_static(wall(-30.0), 0),
            ContactReport::with_static(wall(100.0), 0),
        ];

        let mut forward = ContactAccumulator::default();
        for report in &reports {
            forward.accumulate(report, Vec3::Y, &params, true);
        }
        let mut backward = ContactAccumulator::default();
        for report in reports.iter().rev() {
            backward.accumulate(report, Vec3::Y, &params, true);
        }

        assert_eq!(forward.ground_count, backward.ground_count);
        assert_eq!(forward.steep_count, backward.steep_count);
        assert_eq!(forward.climb_count, backward.climb_count);
        assert!((forward.contact_normal - backward.contact_normal).length() < 1e-6);
        assert!((forward.steep_normal - backward.steep_normal).length() < 1e-6);
        assert!((forward.climb_normal - backward.climb_normal).length() < 1e-6);
    }
}
