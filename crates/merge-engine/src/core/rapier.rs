use std::collections::HashMap;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use crate::api::types::PieceId;
use crate::core::physics::{Boundary, ColliderMaterial, ContactPair as PieceContact, PhysicsAdapter};

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam <-> nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Boundary bodies keep the default `user_data` of 0; piece ids start at 1.
const NO_PIECE: u128 = 0;

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        self.collisions
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        // Only "began touching" matters to the merge loop.
        if event.started() {
            if let Ok(mut events) = self.collisions.lock() {
                events.push(event);
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// RapierWorld
// ---------------------------------------------------------------------------

/// `PhysicsAdapter` backed by Rapier2D.
pub struct RapierWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    pieces: HashMap<PieceId, RigidBodyHandle>,
    material: ColliderMaterial,
}

impl RapierWorld {
    /// Create a new world with the given gravity vector.
    /// Y grows downward, so use positive Y for falling pieces
    /// (e.g., `Vec2::new(0.0, 981.0)`).
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            pieces: HashMap::new(),
            material: ColliderMaterial::default(),
        }
    }

    /// Use a different material for pieces created from now on.
    pub fn with_material(mut self, material: ColliderMaterial) -> Self {
        self.material = material;
        self
    }

    /// Number of piece bodies (boundaries excluded).
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    fn rigid_body(&self, id: PieceId) -> Option<&RigidBody> {
        let handle = self.pieces.get(&id)?;
        self.bodies.get(*handle)
    }

    fn rigid_body_mut(&mut self, id: PieceId) -> Option<&mut RigidBody> {
        let handle = self.pieces.get(&id)?;
        self.bodies.get_mut(*handle)
    }

    fn collider_to_piece(&self, collider_handle: ColliderHandle) -> Option<PieceId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        if body.user_data == NO_PIECE {
            return None;
        }
        Some(PieceId(body.user_data as u32))
    }
}

impl PhysicsAdapter for RapierWorld {
    fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    fn create_static_boundary(&mut self, boundary: &Boundary) {
        let rb = RigidBodyBuilder::fixed()
            .translation(vec2_to_na(boundary.center))
            .build();
        let body_handle = self.bodies.insert(rb);

        let collider = ColliderBuilder::cuboid(boundary.half_extents.x, boundary.half_extents.y)
            .friction(self.material.friction)
            .build();
        self.colliders
            .insert_with_parent(collider, body_handle, &mut self.bodies);
    }

    fn create_circle(&mut self, id: PieceId, pos: Vec2, radius: f32, is_static: bool) {
        let body_type = if is_static {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        let rb = RigidBodyBuilder::new(body_type)
            .translation(vec2_to_na(pos))
            .user_data(id.0 as u128)
            .build();
        let body_handle = self.bodies.insert(rb);

        let collider = ColliderBuilder::ball(radius)
            .restitution(self.material.restitution)
            .friction(self.material.friction)
            .density(self.material.density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, body_handle, &mut self.bodies);

        if let Some(old) = self.pieces.insert(id, body_handle) {
            log::warn!("piece {} re-created; dropping stale body", id.0);
            self.bodies.remove(
                old,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    fn set_body_static(&mut self, id: PieceId, is_static: bool) {
        if let Some(rb) = self.rigid_body_mut(id) {
            if is_static {
                rb.set_linvel(nalgebra::Vector2::zeros(), false);
                rb.set_body_type(RigidBodyType::Fixed, true);
            } else {
                rb.set_body_type(RigidBodyType::Dynamic, true);
            }
        }
    }

    fn set_position(&mut self, id: PieceId, pos: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) {
            rb.set_translation(vec2_to_na(pos), true);
        }
    }

    fn set_velocity(&mut self, id: PieceId, vel: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) {
            if rb.is_dynamic() {
                rb.set_linvel(vec2_to_na(vel), true);
            }
        }
    }

    fn remove_body(&mut self, id: PieceId) -> bool {
        let Some(handle) = self.pieces.remove(&id) else {
            return false;
        };
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        true
    }

    fn step_into(&mut self, contacts: &mut Vec<PieceContact>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Resolve collider handles → piece ids; boundary contacts are dropped.
        for event in self.event_collector.drain_collisions() {
            let (h1, h2) = (event.collider1(), event.collider2());
            if let (Some(a), Some(b)) = (self.collider_to_piece(h1), self.collider_to_piece(h2)) {
                contacts.push(PieceContact::new(a, b));
            }
        }
    }

    fn position(&self, id: PieceId) -> Option<Vec2> {
        self.rigid_body(id).map(|rb| na_to_vec2(rb.translation()))
    }

    fn velocity(&self, id: PieceId) -> Option<Vec2> {
        self.rigid_body(id).map(|rb| na_to_vec2(rb.linvel()))
    }

    fn rotation(&self, id: PieceId) -> Option<f32> {
        self.rigid_body(id).map(|rb| rb.rotation().angle())
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
