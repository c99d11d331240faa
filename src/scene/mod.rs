pub mod camera;
pub mod graph;
pub mod pick;

use glam::Vec2;

use crate::cat::ModelFactory;
use crate::catalog::VariantCatalog;
use crate::config::SimConfig;
use crate::ecs::components::Visual;
use crate::ecs::systems::interaction::{CursorHint, HoverInfo, PointerController, PointerCtx};
use crate::ecs::systems::{animation, lifecycle};
use crate::feedback::{Cue, Feedback};

use self::camera::ViewCamera;
use self::graph::SceneGraph;

/// Active/total counters for the stats readout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub active: usize,
    /// Every cat ever spawned. Never decremented.
    pub total_spawned: u64,
}

/// Simulation context: the cat pool, the scene graph it draws into, the
/// camera, the pointer controller, and the knobs that drive them.
///
/// The host calls [`Scene::tick`] once per displayed frame and forwards
/// input to the pointer/wheel/resize handlers. Everything runs on the
/// host's single event-loop thread; each call is atomic with respect to
/// the others.
pub struct Scene {
    world: hecs::World,
    /// Live cats in spawn order.
    pool: Vec<hecs::Entity>,
    graph: SceneGraph,
    camera: ViewCamera,
    pointer: PointerController,
    config: SimConfig,
    catalog: VariantCatalog,
    factory: Box<dyn ModelFactory>,
    feedback: Box<dyn Feedback>,
    rng: fastrand::Rng,

    last_spawn_ms: f64,
    metrics: Metrics,
    metrics_dirty: bool,
    /// Width of the left strip the settings panel owns, while it is open.
    reserved_width: Option<f32>,
    torn_down: bool,

    // Scratch buffers reused every tick.
    aged: Vec<hecs::Entity>,
    despawned: Vec<hecs::Entity>,
}

impl Scene {
    pub fn new(
        viewport: Vec2,
        factory: Box<dyn ModelFactory>,
        feedback: Box<dyn Feedback>,
        rng: fastrand::Rng,
    ) -> Self {
        let catalog = VariantCatalog::new();
        let config = SimConfig::new(catalog.available()[0].clone());
        Self {
            world: hecs::World::new(),
            pool: Vec::with_capacity(32),
            graph: SceneGraph::new(),
            camera: ViewCamera::new(viewport.x, viewport.y),
            pointer: PointerController::new(),
            config,
            catalog,
            factory,
            feedback,
            rng,
            last_spawn_ms: 0.0,
            metrics: Metrics::default(),
            metrics_dirty: false,
            reserved_width: None,
            torn_down: false,
            aged: Vec::with_capacity(32),
            despawned: Vec::with_capacity(8),
        }
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Advance the simulation to host time `t` (ms). Returns false once the
    /// scene has been torn down, telling the host to stop scheduling frames.
    pub fn tick(&mut self, t: f64) -> bool {
        if self.torn_down {
            return false;
        }
        let before = self.pool.len();

        // 1. Spawn timer (interval read fresh every tick)
        let fresh = if self.config.auto_spawn
            && t - self.last_spawn_ms >= self.config.spawn_interval_ms()
        {
            let breed = self.catalog.pick(&mut self.rng).to_string();
            Some(self.spawn(t, &breed))
        } else {
            None
        };

        // 2. Aging: despawn expired cats, rescale the rest
        self.aged.clear();
        self.despawned.clear();
        lifecycle::age(
            &mut self.world,
            &mut self.graph,
            &self.pool,
            fresh,
            t,
            self.config.despawn_timeout_ms(),
            &mut self.aged,
            &mut self.despawned,
        );
        for &gone in &self.despawned {
            self.pointer.forget(gone);
            self.feedback.notify(Cue::Despawn);
            log::debug!("despawned {gone:?}");
        }

        // 3. Idle animation for everything that was aged
        animation::update(
            &self.world,
            &mut self.graph,
            &self.aged,
            t,
            self.config.rotation_multiplier(),
            self.pointer.dragged(),
        );

        // 4. Swap in the surviving pool
        self.pool.clear();
        self.pool.extend_from_slice(&self.aged);
        self.pool.extend(fresh);

        if self.pool.len() != before || !self.despawned.is_empty() {
            self.metrics.active = self.pool.len();
            self.metrics_dirty = true;
        }
        true
    }

    /// Spawn a cat right now, bypassing the timer. A `breed` that is None or
    /// blank picks a random available breed. Resets the automatic spawn timer.
    pub fn spawn_now(&mut self, t: f64, breed: Option<&str>) -> Option<hecs::Entity> {
        if self.torn_down {
            return None;
        }
        let breed = match breed.map(str::trim).filter(|b| !b.is_empty()) {
            Some(b) => b.to_string(),
            None => self.catalog.pick(&mut self.rng).to_string(),
        };
        let entity = self.spawn(t, &breed);
        self.pool.push(entity);
        self.metrics.active = self.pool.len();
        Some(entity)
    }

    fn spawn(&mut self, t: f64, breed: &str) -> hecs::Entity {
        let entity = lifecycle::spawn(
            &mut self.world,
            &mut self.graph,
            self.factory.as_mut(),
            &mut self.rng,
            breed,
            t,
        );
        self.last_spawn_ms = t;
        self.metrics.total_spawned += 1;
        self.metrics.active = self.pool.len() + 1;
        self.metrics_dirty = true;
        self.feedback.notify(Cue::Spawn);
        log::debug!("spawned {breed} {entity:?} at {t:.0}ms");
        entity
    }

    /// Add a breed name to the spawn list. Blank or known names are ignored.
    pub fn register_variant(&mut self, name: &str) -> bool {
        let added = self.catalog.register(name);
        if added {
            log::debug!("registered breed {:?}", name.trim());
        }
        added
    }

    /// Stop the simulation and release every visual. Safe to call again.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        for &entity in &self.pool {
            if let Ok(visual) = self.world.get::<&Visual>(entity).map(|v| v.0) {
                self.graph.detach(visual);
            }
        }
        self.pool.clear();
        self.world.clear();
        self.graph.clear();
        self.pointer.reset();
        self.metrics.active = 0;
        self.metrics_dirty = true;
        log::info!("scene torn down ({} cats spawned)", self.metrics.total_spawned);
    }

    #[cfg(test)]
    pub fn is_live(&self) -> bool {
        !self.torn_down
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    fn pointer_ctx(&mut self) -> (&mut PointerController, PointerCtx<'_>) {
        (
            &mut self.pointer,
            PointerCtx {
                world: &self.world,
                graph: &mut self.graph,
                camera: &self.camera,
                feedback: self.feedback.as_mut(),
            },
        )
    }

    pub fn pointer_down(&mut self, screen: Vec2) {
        if self.torn_down {
            return;
        }
        let reserved = self.reserved_width;
        let (pointer, ctx) = self.pointer_ctx();
        pointer.pointer_down(ctx, screen, reserved);
    }

    pub fn pointer_move(&mut self, screen: Vec2) {
        if self.torn_down {
            return;
        }
        let (pointer, ctx) = self.pointer_ctx();
        pointer.pointer_move(ctx, screen);
    }

    pub fn pointer_up(&mut self) {
        self.pointer.pointer_up();
    }

    /// Wheel zoom. Positive `delta_y` moves the camera away.
    pub fn wheel(&mut self, delta_y: f32) {
        if self.torn_down {
            return;
        }
        self.camera.zoom(delta_y);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    /// Reserve a left-edge strip for UI; pointer-downs inside it are ignored.
    pub fn set_reserved_width(&mut self, width: Option<f32>) {
        self.reserved_width = width;
    }

    // -----------------------------------------------------------------------
    // Readouts
    // -----------------------------------------------------------------------

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Counters if they changed since the last call.
    pub fn take_metrics_update(&mut self) -> Option<Metrics> {
        std::mem::take(&mut self.metrics_dirty).then_some(self.metrics)
    }

    pub fn hovered(&self) -> Option<&HoverInfo> {
        self.pointer.hover()
    }

    pub fn cursor(&self) -> CursorHint {
        self.pointer.cursor()
    }

    #[cfg(test)]
    pub fn dragged(&self) -> Option<hecs::Entity> {
        self.pointer.dragged()
    }

    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SimConfig {
        &mut self.config
    }

    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    /// Live cats in spawn order.
    #[cfg(test)]
    pub fn cats(&self) -> &[hecs::Entity] {
        &self.pool
    }

    #[cfg(test)]
    pub fn transform_of(&self, entity: hecs::Entity) -> Option<graph::Transform> {
        let visual = self.world.get::<&Visual>(entity).ok()?.0;
        self.graph.transform(visual).copied()
    }

    #[cfg(test)]
    pub fn position_of(&self, entity: hecs::Entity) -> Option<glam::Vec3> {
        self.transform_of(entity).map(|xf| xf.position)
    }
}
