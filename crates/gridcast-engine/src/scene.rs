//! The entity registry and fixed-tick scheduler.
//!
//! A [`Scene`] owns the tile grid, the live entity set, the per-tick input
//! frame, and the content RNG. Everything happens inside [`Scene::tick`],
//! on one thread, in a fixed phase order:
//!
//! 1. flush deferred discards, then deferred adds (at most once per tick,
//!    discards first so an entity added and discarded in the same tick is
//!    never observed live);
//! 2. re-sort the update order by depth if it changed (stable, so equal
//!    depths keep spawn order);
//! 3. step each entity: record its step-start position, run its behavior,
//!    reclassify tile occupancy, dispatch tile and solid-contact callbacks;
//! 4. run the tick's scheduled events, dropping any whose owner was
//!    discarded.
//!
//! Entity state lives in generation-checked slots; handles held across a
//! discard go stale instead of aliasing the slot's next occupant. While an
//! entity's own behavior runs, its state is checked out of its slot, which
//! is what lets the behavior mutate its body and the rest of the scene at
//! the same time.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::{debug, warn};

use gridcast_geom::prelude::{collides, Shape};
use gridcast_stage::prelude::{solid_space, TileCode, TileGrid};

use crate::entity::{Body, EntityId};
use crate::input::InputFrame;
use crate::snapshot::{EntityRecord, SceneSnapshot};
use crate::validator::{self, classify_footprint, Direction};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Per-entity game logic, run once per tick by the scheduler.
///
/// The callbacks receive the entity's [`Body`] checked out of the scene, so
/// they can move it while spawning, discarding, and querying other entities
/// through the [`TickCtx`]. During its own callbacks the entity is not
/// visible through scene queries ([`TickCtx::body`] on its own handle
/// returns `None`).
pub trait Behavior {
    /// The main per-tick step. Runs before occupancy classification, so
    /// movement made here is reflected in this tick's `on_tile` calls.
    fn step(&mut self, id: EntityId, body: &mut Body, ctx: &mut TickCtx<'_>);

    /// Called after `step`, once per non-Hollow tile code the footprint
    /// now overlaps.
    fn on_tile(
        &mut self,
        _id: EntityId,
        _body: &mut Body,
        _code: TileCode,
        _ctx: &mut TickCtx<'_>,
    ) {
    }

    /// Called after `step`, once per solid-obstacle entity the body now
    /// collides with.
    fn on_hit(
        &mut self,
        _id: EntityId,
        _body: &mut Body,
        _other: EntityId,
        _ctx: &mut TickCtx<'_>,
    ) {
    }
}

// ---------------------------------------------------------------------------
// Internal storage
// ---------------------------------------------------------------------------

struct Entry {
    body: Body,
    behavior: Option<Box<dyn Behavior>>,
    /// False between spawn and the activating flush.
    live: bool,
}

struct Slot {
    generation: u32,
    /// `None` when vacant, and briefly while the occupant's behavior runs.
    entry: Option<Entry>,
}

struct ScheduledEvent {
    /// Discarding the owner cancels the event.
    owner: Option<EntityId>,
    run: Box<dyn FnOnce(&mut Scene)>,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The world: tile grid, entity registry, scheduler, input, and RNG.
pub struct Scene {
    grid: TileGrid,
    slots: Vec<Slot>,
    free: VecDeque<u32>,
    /// Update/draw order: live handles paired with their depth at the last
    /// sort. Stable-sorted by depth, spawn order among equals.
    order: Vec<(EntityId, i32)>,
    order_dirty: bool,
    pending_add: Vec<EntityId>,
    pending_discard: Vec<EntityId>,
    events: Vec<ScheduledEvent>,
    tick: u64,
    input: InputFrame,
    rng: Pcg32,
}

impl Scene {
    /// A scene over `grid` with a seeded content RNG.
    pub fn new(grid: TileGrid, seed: u64) -> Self {
        Self {
            grid,
            slots: Vec::new(),
            free: VecDeque::new(),
            order: Vec::new(),
            order_dirty: false,
            pending_add: Vec::new(),
            pending_discard: Vec::new(),
            events: Vec::new(),
            tick: 0,
            input: InputFrame::default(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    // -- world access ---------------------------------------------------------

    /// The tile grid.
    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable tile grid access, for deformation between ticks.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    /// Completed tick count.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The input frame the next tick will see.
    #[inline]
    pub fn input(&self) -> InputFrame {
        self.input
    }

    /// Set the input frame for subsequent ticks.
    pub fn set_input(&mut self, input: InputFrame) {
        self.input = input;
    }

    /// The seeded content RNG. All in-simulation randomness must come from
    /// here or determinism is lost.
    #[inline]
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    // -- entity lifecycle -----------------------------------------------------

    /// Queue a behavior-less entity for addition at the next flush.
    ///
    /// The handle is valid immediately (it can be stored and discarded),
    /// but the entity is not live until the next tick's flush.
    pub fn spawn(&mut self, body: Body) -> EntityId {
        self.spawn_entry(body, None)
    }

    /// Queue an entity with a behavior for addition at the next flush.
    pub fn spawn_with(&mut self, body: Body, behavior: impl Behavior + 'static) -> EntityId {
        self.spawn_entry(body, Some(Box::new(behavior)))
    }

    fn spawn_entry(&mut self, body: Body, behavior: Option<Box<dyn Behavior>>) -> EntityId {
        let entry = Entry {
            body,
            behavior,
            live: false,
        };
        let id = if let Some(index) = self.free.pop_front() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            EntityId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            EntityId::new(index, 0)
        };
        self.pending_add.push(id);
        id
    }

    /// Queue an entity for removal at the next flush. Discard is terminal:
    /// once flushed, the handle is stale forever.
    ///
    /// Discarding an already-stale handle is an error at call time; a
    /// handle discarded twice in the same tick is dropped with a warning
    /// at flush time.
    pub fn discard(&mut self, id: EntityId) -> Result<(), EngineError> {
        if !self.handle_current(id) {
            return Err(EngineError::StaleEntity { entity: id });
        }
        self.pending_discard.push(id);
        Ok(())
    }

    /// Whether the handle's generation matches its slot. True for live and
    /// pending-add entities, including one checked out for its own step.
    fn handle_current(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.generation == id.generation())
    }

    /// Whether `id` refers to a live (flushed, not discarded) entity.
    pub fn is_live(&self, id: EntityId) -> bool {
        self.entry(id).is_some_and(|e| e.live)
    }

    /// Number of live entities.
    pub fn live_count(&self) -> usize {
        self.order.len()
    }

    /// Live handles in update/draw order (ascending depth, spawn order
    /// among equals).
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().map(|&(id, _)| id)
    }

    fn entry(&self, id: EntityId) -> Option<&Entry> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    /// The entity's body. `None` for stale handles and for an entity
    /// currently running its own behavior.
    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.entry(id).map(|e| &e.body)
    }

    /// Mutable body access, for setup and cross-tick tooling.
    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_mut().map(|e| &mut e.body)
    }

    // -- events ---------------------------------------------------------------

    /// Schedule a closure to run after this tick's entity steps. With an
    /// owner, the event is cancelled if the owner is discarded first.
    pub fn schedule(&mut self, owner: Option<EntityId>, run: impl FnOnce(&mut Scene) + 'static) {
        self.events.push(ScheduledEvent {
            owner,
            run: Box::new(run),
        });
    }

    // -- tick -----------------------------------------------------------------

    /// Run one simulation tick to completion.
    pub fn tick(&mut self) {
        self.flush();
        self.resort_if_needed();

        let order: Vec<EntityId> = self.order.iter().map(|&(id, _)| id).collect();
        for id in order {
            self.step_entity(id);
        }

        let events = std::mem::take(&mut self.events);
        for ev in events {
            (ev.run)(self);
        }

        self.tick += 1;
    }

    /// Run `n` ticks back to back with the current input frame.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Apply deferred discards, then deferred adds.
    fn flush(&mut self) {
        for id in std::mem::take(&mut self.pending_discard) {
            let index = id.index() as usize;
            let slot = &mut self.slots[index];
            if slot.generation != id.generation() {
                warn!(%id, "discard of a stale handle dropped");
                continue;
            }
            let Some(entry) = slot.entry.take() else {
                warn!(%id, "duplicate discard dropped");
                continue;
            };
            if entry.live {
                self.order.retain(|&(oid, _)| oid != id);
            } else {
                debug!(%id, "entity discarded before activation");
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push_back(id.index());
            self.events.retain(|ev| ev.owner != Some(id));
        }

        for id in std::mem::take(&mut self.pending_add) {
            let index = id.index() as usize;
            let slot = &mut self.slots[index];
            if slot.generation != id.generation() {
                continue; // discarded in the same tick, never observed
            }
            if let Some(entry) = slot.entry.as_mut() {
                entry.live = true;
                self.order.push((id, entry.body.depth));
                self.order_dirty = true;
            }
        }
    }

    /// Stable re-sort of the update order when a depth changed or an
    /// entity was added.
    fn resort_if_needed(&mut self) {
        let depth_changed = self.order.iter().any(|&(id, sorted_depth)| {
            self.body(id).is_some_and(|b| b.depth != sorted_depth)
        });
        if !self.order_dirty && !depth_changed {
            return;
        }
        let slots = &self.slots;
        for (id, sorted_depth) in &mut self.order {
            if let Some(entry) = slots[id.index() as usize].entry.as_ref() {
                *sorted_depth = entry.body.depth;
            }
        }
        self.order.sort_by_key(|&(_, depth)| depth);
        self.order_dirty = false;
    }

    /// Run one entity's step: check it out of its slot, record the
    /// step-start position, run the behavior, reclassify occupancy,
    /// dispatch callbacks, check it back in.
    fn step_entity(&mut self, id: EntityId) {
        let index = id.index() as usize;
        let Some(mut entry) = self.slots[index].entry.take() else {
            return;
        };
        entry.body.prev_x = entry.body.shape.x;
        entry.body.prev_y = entry.body.shape.y;

        if let Some(behavior) = entry.behavior.as_mut() {
            let mut ctx = TickCtx {
                scene: self,
                current: id,
            };
            behavior.step(id, &mut entry.body, &mut ctx);
        }

        entry.body.touching = classify_footprint(&entry.body.shape, &self.grid);

        if let Some(behavior) = entry.behavior.as_mut() {
            for code in entry.body.touching.iter() {
                let mut ctx = TickCtx {
                    scene: self,
                    current: id,
                };
                behavior.on_tile(id, &mut entry.body, code, &mut ctx);
            }

            let solids = entry.body.solids.clone();
            for other in solids {
                let hit = self
                    .body(other)
                    .is_some_and(|o| collides(&entry.body.shape, &o.shape));
                if hit {
                    let mut ctx = TickCtx {
                        scene: self,
                        current: id,
                    };
                    behavior.on_hit(id, &mut entry.body, other, &mut ctx);
                }
            }
        }

        self.slots[index].entry = Some(entry);
    }

    // -- snapshots ------------------------------------------------------------

    /// Capture the simulation state: tick count, tile bytes, input, and
    /// every live entity in update order.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            tick: self.tick,
            grid_width: self.grid.width(),
            grid_height: self.grid.height(),
            tiles: self.grid.to_bytes(),
            input: self.input,
            entities: self
                .order
                .iter()
                .filter_map(|&(id, _)| self.body(id).map(|b| EntityRecord::capture(id, b)))
                .collect(),
        }
    }

    /// BLAKE3 hex digest of the current snapshot. Two runs fed identical
    /// seeds and input sequences hash identically on every tick.
    pub fn state_hash(&self) -> String {
        self.snapshot().state_hash()
    }
}

// ---------------------------------------------------------------------------
// TickCtx
// ---------------------------------------------------------------------------

/// A behavior's window onto the rest of the scene while its entity is
/// checked out.
pub struct TickCtx<'a> {
    scene: &'a mut Scene,
    current: EntityId,
}

impl TickCtx<'_> {
    /// The entity whose behavior is running.
    #[inline]
    pub fn current(&self) -> EntityId {
        self.current
    }

    /// Completed tick count.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.scene.tick
    }

    /// The tile grid.
    #[inline]
    pub fn grid(&self) -> &TileGrid {
        self.scene.grid()
    }

    /// Mutable tile grid access, for deformation effects.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        self.scene.grid_mut()
    }

    /// This tick's input frame.
    #[inline]
    pub fn input(&self) -> InputFrame {
        self.scene.input
    }

    /// The scene's content RNG.
    #[inline]
    pub fn rng(&mut self) -> &mut Pcg32 {
        self.scene.rng()
    }

    /// Queue a behavior-less entity for the next flush.
    pub fn spawn(&mut self, body: Body) -> EntityId {
        self.scene.spawn(body)
    }

    /// Queue an entity with a behavior for the next flush.
    pub fn spawn_with(&mut self, body: Body, behavior: impl Behavior + 'static) -> EntityId {
        self.scene.spawn_with(body, behavior)
    }

    /// Queue an entity for removal at the next flush.
    pub fn discard(&mut self, id: EntityId) -> Result<(), EngineError> {
        self.scene.discard(id)
    }

    /// Another entity's body. `None` for stale handles and for the current
    /// entity itself.
    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.scene.body(id)
    }

    /// Schedule a closure for after this tick's entity steps, owned by the
    /// current entity (cancelled if it is discarded first).
    pub fn schedule(&mut self, run: impl FnOnce(&mut Scene) + 'static) {
        let owner = self.current;
        self.scene.schedule(Some(owner), run);
    }

    // -- movement -------------------------------------------------------------

    /// Whether `body` may occupy center `(x, y)`, counting its solid
    /// obstacles that are still live.
    pub fn can_occupy(&self, body: &Body, x: f32, y: f32) -> bool {
        let solids = self.resolve_solids(body);
        validator::can_occupy(body, x, y, &self.scene.grid, &solids)
    }

    /// Whether `body` could move `steps` pixels in `dir`.
    pub fn can_step(&self, body: &Body, dir: Direction, steps: u32) -> bool {
        let solids = self.resolve_solids(body);
        validator::can_step(body, dir, steps, &self.scene.grid, &solids)
    }

    /// Move `body` up to `steps` pixels in `dir`, one validated pixel at a
    /// time. `true` only if the full distance was covered.
    pub fn try_step(&self, body: &mut Body, dir: Direction, steps: u32) -> bool {
        let solids = self.resolve_solids(body);
        validator::try_step(body, dir, steps, &self.scene.grid, &solids)
    }

    /// Whether `body` could move `steps` pixels up.
    pub fn can_go_up(&self, body: &Body, steps: u32) -> bool {
        self.can_step(body, Direction::Up, steps)
    }

    /// Whether `body` could move `steps` pixels down.
    pub fn can_go_down(&self, body: &Body, steps: u32) -> bool {
        self.can_step(body, Direction::Down, steps)
    }

    /// Whether `body` could move `steps` pixels left.
    pub fn can_go_left(&self, body: &Body, steps: u32) -> bool {
        self.can_step(body, Direction::Left, steps)
    }

    /// Whether `body` could move `steps` pixels right.
    pub fn can_go_right(&self, body: &Body, steps: u32) -> bool {
        self.can_step(body, Direction::Right, steps)
    }

    /// Step `body` up, one validated pixel at a time.
    pub fn try_up(&self, body: &mut Body, steps: u32) -> bool {
        self.try_step(body, Direction::Up, steps)
    }

    /// Step `body` down, one validated pixel at a time.
    pub fn try_down(&self, body: &mut Body, steps: u32) -> bool {
        self.try_step(body, Direction::Down, steps)
    }

    /// Step `body` left, one validated pixel at a time.
    pub fn try_left(&self, body: &mut Body, steps: u32) -> bool {
        self.try_step(body, Direction::Left, steps)
    }

    /// Step `body` right, one validated pixel at a time.
    pub fn try_right(&self, body: &mut Body, steps: u32) -> bool {
        self.try_step(body, Direction::Right, steps)
    }

    /// Line-of-sight between two pixel positions: true when no Solid cell
    /// lies on the cell-to-cell line between them.
    pub fn can_see(&self, from: (f32, f32), to: (f32, f32)) -> bool {
        let ts = self.scene.grid.tile_size();
        let cell = |p: f32| (p / ts).floor() as i32;
        solid_space(
            &self.scene.grid,
            cell(from.0),
            cell(from.1),
            cell(to.0),
            cell(to.1),
        )
    }

    fn resolve_solids(&self, body: &Body) -> Vec<&Shape> {
        body.solids
            .iter()
            .filter_map(|&id| self.scene.body(id).map(|b| &b.shape))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
