use crate::ecs::components::{SpawnTime, Spin, Visual};
use crate::scene::graph::SceneGraph;

/// Bob phase speed, radians per ms of host time.
const BOB_FREQUENCY: f64 = 0.001;
/// Vertical offset added per tick at the crest of the bob.
const BOB_AMPLITUDE: f32 = 0.005;

/// Idle animation for aged cats: spin every one of them, bob all but the
/// one being dragged (the pointer owns its position).
pub fn update(
    world: &hecs::World,
    graph: &mut SceneGraph,
    cats: &[hecs::Entity],
    t: f64,
    spin_multiplier: f32,
    dragged: Option<hecs::Entity>,
) {
    for &entity in cats {
        let Ok(mut query) = world.query_one::<(&Visual, &Spin, &SpawnTime)>(entity) else {
            continue;
        };
        let Some((visual, spin, spawned_at)) = query.get() else {
            continue;
        };
        let Some(xf) = graph.transform_mut(visual.0) else {
            continue;
        };

        // A held cat keeps spinning; only its bob stops.
        xf.rotation += spin.0 * spin_multiplier;

        if Some(entity) != dragged {
            xf.position.y += (t * BOB_FREQUENCY + spawned_at.0).sin() as f32 * BOB_AMPLITUDE;
        }
    }
}
