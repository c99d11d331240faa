use glam::{Vec2, Vec3};

use crate::ecs::components::{Breed, CatName, Visual};
use crate::feedback::{Cue, Feedback};
use crate::scene::camera::ViewCamera;
use crate::scene::graph::SceneGraph;
use crate::scene::pick::{self, Plane};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// An in-progress drag. Holds the entity as a weak reference: it is
/// checked against the world before every use and cleared on despawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub entity: hecs::Entity,
    /// Plane through the cat at grab time, facing the camera.
    pub plane: Plane,
    /// Cat position minus the grab point, so the cat does not snap.
    pub offset: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    Idle,
    Hovering(hecs::Entity),
    Dragging(Drag),
}

/// Tooltip payload for the cat under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub entity: hecs::Entity,
    pub name: String,
    pub breed: String,
    pub screen_pos: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Pointer,
    Grabbing,
}

/// Everything a pointer handler may read or touch.
pub struct PointerCtx<'a> {
    pub world: &'a hecs::World,
    pub graph: &'a mut SceneGraph,
    pub camera: &'a ViewCamera,
    pub feedback: &'a mut dyn Feedback,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Pointer state machine: Idle -> Hovering -> Dragging -> Idle.
pub struct PointerController {
    state: PointerState,
    /// Last cat that fired a hover cue. Only cleared when the pointer
    /// leaves every cat.
    last_hovered: Option<hecs::Entity>,
    hover: Option<HoverInfo>,
    cursor: CursorHint,
}

impl PointerController {
    pub fn new() -> Self {
        Self {
            state: PointerState::Idle,
            last_hovered: None,
            hover: None,
            cursor: CursorHint::Default,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn hover(&self) -> Option<&HoverInfo> {
        self.hover.as_ref()
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn dragged(&self) -> Option<hecs::Entity> {
        match self.state {
            PointerState::Dragging(drag) => Some(drag.entity),
            _ => None,
        }
    }

    /// Grab the cat under the pointer, if any. Presses inside `reserved`
    /// (a left-edge strip owned by the settings panel) are ignored.
    pub fn pointer_down(&mut self, ctx: PointerCtx<'_>, screen: Vec2, reserved: Option<f32>) {
        if reserved.is_some_and(|width| screen.x < width) {
            return;
        }
        let ray = ctx.camera.ray(screen);
        let Some(entity) = pick_cat(ctx.world, ctx.graph, &ray) else {
            return;
        };
        let Some(position) = position_of(ctx.world, ctx.graph, entity) else {
            return;
        };

        let plane = Plane::from_normal_and_point(-ctx.camera.forward(), position);
        let offset = ray
            .intersect_plane(&plane)
            .map_or(Vec3::ZERO, |hit| position - hit);

        log::trace!("drag start {entity:?} at {position}");
        self.state = PointerState::Dragging(Drag {
            entity,
            plane,
            offset,
        });
        self.hover = None;
        self.cursor = CursorHint::Grabbing;
    }

    pub fn pointer_move(&mut self, ctx: PointerCtx<'_>, screen: Vec2) {
        let ray = ctx.camera.ray(screen);

        if let PointerState::Dragging(drag) = self.state {
            if !ctx.world.contains(drag.entity) {
                self.release();
                return;
            }
            if let Some(hit) = ray.intersect_plane(&drag.plane) {
                let visual = ctx.world.get::<&Visual>(drag.entity).map(|v| v.0);
                if let Ok(visual) = visual {
                    if let Some(xf) = ctx.graph.transform_mut(visual) {
                        xf.position = hit + drag.offset;
                    }
                }
            }
            return;
        }

        match pick_cat(ctx.world, ctx.graph, &ray) {
            Some(entity) => {
                if self.last_hovered != Some(entity) {
                    ctx.feedback.notify(Cue::Hover);
                    self.last_hovered = Some(entity);
                }
                self.hover = Some(HoverInfo {
                    entity,
                    name: component_text::<CatName>(ctx.world, entity, |c| &c.0),
                    breed: component_text::<Breed>(ctx.world, entity, |b| &b.0),
                    screen_pos: screen,
                });
                self.state = PointerState::Hovering(entity);
                self.cursor = CursorHint::Pointer;
            }
            None => self.clear_hover(),
        }
    }

    /// Release any drag, wherever the pointer is.
    pub fn pointer_up(&mut self) {
        if matches!(self.state, PointerState::Dragging(_)) {
            log::trace!("drag released");
            self.release();
        }
    }

    /// Drop every reference to a cat that just left the pool.
    pub fn forget(&mut self, entity: hecs::Entity) {
        match self.state {
            PointerState::Dragging(drag) if drag.entity == entity => self.release(),
            PointerState::Hovering(e) if e == entity => {
                self.state = PointerState::Idle;
                self.hover = None;
                self.cursor = CursorHint::Default;
            }
            _ => {}
        }
        if self.last_hovered == Some(entity) {
            self.last_hovered = None;
        }
    }

    /// Back to Idle with nothing remembered.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn release(&mut self) {
        self.state = PointerState::Idle;
        self.cursor = CursorHint::Default;
    }

    fn clear_hover(&mut self) {
        self.state = PointerState::Idle;
        self.hover = None;
        self.last_hovered = None;
        self.cursor = CursorHint::Default;
    }
}

impl Default for PointerController {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Nearest hit mapped to its owning cat. Hits on unowned visuals, or on
/// visuals whose owner is no longer alive, count as a miss.
fn pick_cat(world: &hecs::World, graph: &SceneGraph, ray: &pick::Ray) -> Option<hecs::Entity> {
    let hit = pick::raycast(graph, ray)?;
    hit.owner.filter(|&owner| world.contains(owner))
}

fn position_of(world: &hecs::World, graph: &SceneGraph, entity: hecs::Entity) -> Option<Vec3> {
    let visual = world.get::<&Visual>(entity).ok()?.0;
    graph.transform(visual).map(|xf| xf.position)
}

fn component_text<T: hecs::Component>(
    world: &hecs::World,
    entity: hecs::Entity,
    text: impl Fn(&T) -> &String,
) -> String {
    world
        .get::<&T>(entity)
        .map(|c| text(&*c).clone())
        .unwrap_or_default()
}
