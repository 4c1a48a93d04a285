use super::events::{LocomotionEvent, StepReport};
use super::input::InputLatch;
use super::state::StateLabel;
use super::state_machine::{LocomotionStateMachine, TransitionFlags};
use super::status::{project_on_plane, SphereStatus};
use crate::config::SphereParams;
use crate::gravity::GravityField;
use crate::physics::{BodyInfo, ContactReport, PhysicsQueries, Rigidbody, Transform};
use crate::stats::{Stamina, StatFactors};
use glam::{Quat, Vec2, Vec3};
use hecs::Entity;
use tracing::{debug, trace, warn};

/// Collaborators a sphere needs for one step
pub struct StepContext<'a> {
    pub gravity: &'a GravityField,
    pub physics: &'a dyn PhysicsQueries,
    /// Without stamina, every stamina rule is skipped
    pub stamina: Option<&'a mut dyn Stamina>,
    pub stats: StatFactors,
}

impl<'a> StepContext<'a> {
    pub fn new(gravity: &'a GravityField, physics: &'a dyn PhysicsQueries) -> Self {
        Self {
            gravity,
            physics,
            stamina: None,
            stats: StatFactors::default(),
        }
    }

    pub fn with_stamina(mut self, stamina: &'a mut dyn Stamina) -> Self {
        self.stamina = Some(stamina);
        self
    }

    pub fn with_stats(mut self, stats: StatFactors) -> Self {
        self.stats = stats;
        self
    }

    fn has_stamina(&self) -> bool {
        self.stamina
            .as_ref()
            .map_or(true, |stamina| stamina.current() > 0.0)
    }
}

/// Gravity-relative movement controller for a rolling sphere
///
/// Each fixed step: feed the step's contacts with [`accumulate_contact`],
/// call [`step`], write the returned velocity to the rigid body.
///
/// [`accumulate_contact`]: SphereBody::accumulate_contact
/// [`step`]: SphereBody::step
#[derive(Debug, Clone)]
pub struct SphereBody {
    params: SphereParams,
    status: SphereStatus,
    machine: LocomotionStateMachine,
    input: InputLatch,
    /// Camera-like frame the input is relative to
    input_space: Option<Quat>,
}

impl Default for SphereBody {
    fn default() -> Self {
        Self::new(SphereParams::default())
    }
}

impl SphereBody {
    pub fn new(params: SphereParams) -> Self {
        Self {
            params,
            status: SphereStatus::default(),
            machine: LocomotionStateMachine::new(),
            input: InputLatch::default(),
            input_space: None,
        }
    }

    /// Tell the sphere which collider is its own so probes skip it
    pub fn with_collider(mut self, collider: Entity) -> Self {
        self.status.collider = Some(collider);
        self
    }

    pub fn params(&self) -> &SphereParams {
        &self.params
    }

    pub fn status(&self) -> &SphereStatus {
        &self.status
    }

    pub fn state(&self) -> StateLabel {
        self.machine.label()
    }

    pub fn steps_in_state(&self) -> u32 {
        self.machine.steps_in_state()
    }

    pub fn jump_phase(&self) -> u32 {
        self.status.jump_phase
    }

    pub fn up_axis(&self) -> Vec3 {
        self.status.up_axis
    }

    /// Feed one frame of input (x = right, y = forward)
    pub fn set_input(&mut self, movement: Vec2, climb_held: bool, jump_pressed: bool) {
        self.input.update(movement, climb_held, jump_pressed);
    }

    /// Make input relative to a rotation, e.g. an orbit camera
    pub fn set_input_space(&mut self, rotation: Option<Quat>) {
        self.input_space = rotation;
    }

    /// Behave as if a jump just happened: no snapping, no climbing
    pub fn prevent_snap_to_ground(&mut self) {
        self.status.steps_since_last_jump = -1;
    }

    /// Fold one contact from the physics engine into this step
    ///
    /// Contacts are classified against the up axis of the last step.
    pub fn accumulate_contact(&mut self, contact: &ContactReport) {
        self.status.contacts.accumulate(
            contact,
            self.status.up_axis,
            &self.params,
            self.input.climb_held(),
        );
    }

    /// Run one fixed step and return the velocity to commit
    pub fn step(
        &mut self,
        transform: &Transform,
        rigidbody: &Rigidbody,
        ctx: &mut StepContext<'_>,
        dt: f32,
    ) -> StepReport {
        let mut events = Vec::new();

        if !dt.is_finite() || dt <= 0.0 {
            warn!(dt, "Skipping sphere step with invalid time step");
            return StepReport {
                state: self.state(),
                velocity: rigidbody.linear_velocity,
                connected_body: None,
                events,
            };
        }

        let (gravity, up_axis) = ctx.gravity.gravity_and_up(transform.position, false);
        self.status.gravity = gravity;
        self.status.up_axis = up_axis;
        self.status.position = transform.position;
        self.status.wants_climb = self.input.climb_held();
        self.update_input_axes();

        self.update_status(rigidbody, ctx, dt, &mut events);
        self.adjust_velocity(ctx.stats, dt);

        if self.input.take_jump() {
            self.jump(ctx, &mut events);
        }

        let effect = self
            .machine
            .current()
            .gravity_effect(&self.status, &self.params, dt);
        self.status.velocity += effect;

        let report = StepReport {
            state: self.state(),
            velocity: self.status.velocity,
            connected_body: self.status.contacts.connected_body,
            events,
        };
        self.clear_state();
        report
    }

    fn update_input_axes(&mut self) {
        let (right, forward) = match self.input_space {
            Some(rotation) => (rotation * Vec3::X, rotation * Vec3::Z),
            None => (Vec3::X, Vec3::Z),
        };
        self.status.right_axis = project_on_plane(right, self.status.up_axis);
        self.status.forward_axis = project_on_plane(forward, self.status.up_axis);
    }

    fn transition_flags(&self, ctx: &StepContext<'_>) -> TransitionFlags {
        TransitionFlags {
            climbing: self.status.is_climbing(),
            has_stamina: ctx.has_stamina(),
            grounded: self.status.walkable_surface_detected(),
            steep: self.status.steep_detected(),
        }
    }

    fn transition(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<LocomotionEvent>) {
        let flags = self.transition_flags(ctx);
        if let Some(change) = self.machine.update(flags, ctx.stamina.as_deref_mut()) {
            events.push(LocomotionEvent::StateChanged {
                from: change.from,
                to: change.to,
            });
        }
    }

    fn update_status(
        &mut self,
        rigidbody: &Rigidbody,
        ctx: &mut StepContext<'_>,
        dt: f32,
        events: &mut Vec<LocomotionEvent>,
    ) {
        self.transition(ctx, events);

        let status = &mut self.status;
        status.steps_since_last_grounded = status.steps_since_last_grounded.saturating_add(1);
        status.steps_since_last_jump = status.steps_since_last_jump.saturating_add(1);
        status.velocity = rigidbody.linear_velocity;

        let grounded = self.machine.current().update_grounded_state(
            &mut self.status,
            &self.params,
            ctx.physics,
        );
        if grounded {
            self.status.steps_since_last_grounded = 0;
            // The jump's own first airborne step must not reset the phase
            if self.status.steps_since_last_jump > 1 {
                self.status.jump_phase = 0;
            }
            let contacts = &mut self.status.contacts;
            if contacts.ground_count > 1 {
                contacts.contact_normal = contacts.contact_normal.normalize_or_zero();
            }
        }

        // Grounding may just have changed
        self.transition(ctx, events);
        self.machine.on_stay();

        let Some(connected) = self.status.contacts.connected_body else {
            return;
        };
        match ctx.physics.body_info(connected) {
            // Lighter dynamic bodies are not platforms
            Some(info) if info.is_kinematic || info.mass >= rigidbody.mass => {
                self.update_connection(&info, dt);
            }
            Some(_) => trace!(body = ?connected, "Connected body too light, ignored"),
            None => trace!(body = ?connected, "Connected body has no rigid body"),
        }
    }

    fn update_connection(&mut self, info: &BodyInfo, dt: f32) {
        let status = &mut self.status;
        if status.contacts.connected_body == status.contacts.previous_connected_body {
            let movement = info
                .transform
                .transform_point(status.connection_local_position)
                - status.connection_world_position;
            status.connection_velocity = movement / dt;
        }

        status.connection_world_position = status.position;
        status.connection_local_position =
            info.transform.inverse_transform_point(status.connection_world_position);
    }

    fn adjust_velocity(&mut self, stats: StatFactors, dt: f32) {
        let state = self.machine.current();
        let config = &self.params.config;
        let acceleration = state.max_acceleration(&self.status, &self.params) * stats.agility;
        let speed = state.max_speed(&self.status, &self.params) * stats.speed;

        let normal = self.status.contacts.contact_normal;
        let (x_axis, z_axis) = state.axes(&self.status);
        let x_axis = project_on_plane(x_axis, normal);
        let z_axis = project_on_plane(z_axis, normal);

        let relative = self.status.velocity - self.status.connection_velocity;
        let current = Vec2::new(relative.dot(x_axis), relative.dot(z_axis));
        let input = self.input.movement();
        let desired = input * speed;

        let adjustment = (desired - current).clamp_length_max(acceleration * dt);
        if input.length() >= config.input_epsilon || adjustment.length() >= config.input_epsilon {
            self.status.velocity += x_axis * adjustment.x + z_axis * adjustment.y;
            trace!(?adjustment, velocity = ?self.status.velocity, "Adjusted velocity");
        }
        self.status.velocity = self.status.velocity.clamp_length_max(config.max_fall_speed);
    }

    fn jump(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<LocomotionEvent>) {
        // Checked first so a refused jump leaves the phase alone
        if !ctx.has_stamina() {
            trace!("Jump refused, no stamina");
            return;
        }

        let mut phase = self.status.jump_phase;
        let Some(direction) =
            self.machine
                .current()
                .jump_direction(&self.status, &self.params, &mut phase)
        else {
            trace!(state = %self.state(), "Jump not allowed");
            return;
        };

        if let Some(stamina) = ctx.stamina.as_deref_mut() {
            stamina.deduct(self.params.config.jump_stamina_cost);
        }

        let status = &mut self.status;
        status.jump_phase = phase + 1;
        status.steps_since_last_jump = 0;

        // Bias towards up so wall jumps still gain height
        let direction = (direction.normalize_or_zero() + status.up_axis).normalize_or_zero();
        let mut speed = (2.0 * status.gravity.length() * self.params.config.jump_height).sqrt();
        let aligned_speed = status.velocity.dot(direction);
        if aligned_speed > 0.0 {
            speed = (speed - aligned_speed).max(0.0);
        }
        status.velocity += direction * speed;

        debug!(?direction, speed, phase = status.jump_phase, "Jumped");
        events.push(LocomotionEvent::Jumped {
            direction,
            speed,
            phase: status.jump_phase,
        });
    }

    fn clear_state(&mut self) {
        let status = &mut self.status;
        status.last_contact_normal = status.contacts.contact_normal.normalize_or_zero();
        status.last_steep_normal = status.contacts.steep_normal.normalize_or_zero();
        status.last_connection_velocity = status.connection_velocity;
        status.connection_velocity = Vec3::ZERO;
        status.contacts.reset();
    }
}
