use glam::Vec3;

use crate::cat::ModelFactory;
use crate::catalog;
use crate::ecs::components::{Breed, CatName, SpawnTime, Spin, TargetScale, Visual};
use crate::scene::graph::{SceneGraph, Transform};

/// Logical size every cat is built at.
const CAT_SIZE: f32 = 2.0;
/// Spawn box: x in [-5, 5], y in [-3.5, 3.5], z in [-2.5, -0.5].
const SPAWN_MIN: Vec3 = Vec3::new(-5.0, -3.5, -2.5);
const SPAWN_MAX: Vec3 = Vec3::new(5.0, 3.5, -0.5);
/// Max per-axis spin in radians per tick.
const MAX_SPIN: f32 = 0.02;
/// Length of the grow-in and shrink-out ramps.
pub const FADE_MS: f64 = 500.0;

/// Create one cat of `breed` at time `t`: build its visual at zero scale,
/// attach it, and register the entity. Does not touch the pool order.
pub fn spawn(
    world: &mut hecs::World,
    graph: &mut SceneGraph,
    factory: &mut dyn ModelFactory,
    rng: &mut fastrand::Rng,
    breed: &str,
    t: f64,
) -> hecs::Entity {
    let variant = catalog::lookup(breed);
    let model = factory.build(variant.body, variant.eyes, CAT_SIZE);

    let position = SPAWN_MIN + (SPAWN_MAX - SPAWN_MIN) * Vec3::new(rng.f32(), rng.f32(), rng.f32());
    let rotation = Vec3::new(rng.f32(), rng.f32(), rng.f32()) * std::f32::consts::TAU;
    let visual = graph.attach(
        model,
        Transform {
            position,
            rotation,
            scale: 0.0,
        },
        None,
    );

    let spin = Vec3::new(
        (rng.f32() - 0.5) * 2.0 * MAX_SPIN,
        (rng.f32() - 0.5) * 2.0 * MAX_SPIN,
        (rng.f32() - 0.5) * 2.0 * MAX_SPIN,
    );

    let entity = world.spawn((
        CatName(catalog::random_name(rng).to_string()),
        Breed(breed.to_string()),
        Visual(visual),
        SpawnTime(t),
        Spin(spin),
        TargetScale(1.0),
    ));
    graph.set_owner(visual, entity);
    entity
}

/// Grow-hold-shrink envelope. Zero at birth and at `timeout`, `target`
/// between the two ramps, never negative and never above `target`.
pub fn scale_envelope(age_ms: f64, timeout_ms: f64, target: f32) -> f32 {
    let grow = age_ms / FADE_MS;
    let shrink = (timeout_ms - age_ms) / FADE_MS;
    let k = grow.min(shrink).clamp(0.0, 1.0);
    k as f32 * target
}

/// Age every pooled cat except `fresh`. Expired cats are detached,
/// despawned and pushed to `despawned`; the rest get their envelope scale
/// and are pushed to `aged`, in pool order.
#[allow(clippy::too_many_arguments)]
pub fn age(
    world: &mut hecs::World,
    graph: &mut SceneGraph,
    pool: &[hecs::Entity],
    fresh: Option<hecs::Entity>,
    t: f64,
    timeout_ms: f64,
    aged: &mut Vec<hecs::Entity>,
    despawned: &mut Vec<hecs::Entity>,
) {
    for &entity in pool {
        if Some(entity) == fresh {
            continue;
        }
        let (spawned_at, visual, target) =
            match world.query_one_mut::<(&SpawnTime, &Visual, &TargetScale)>(entity) {
                Ok((s, v, ts)) => (s.0, v.0, ts.0),
                Err(_) => continue,
            };

        let age = (t - spawned_at).max(0.0);
        if age >= timeout_ms {
            graph.detach(visual);
            let _ = world.despawn(entity);
            despawned.push(entity);
            continue;
        }

        if let Some(xf) = graph.transform_mut(visual) {
            xf.scale = scale_envelope(age, timeout_ms, target);
        }
        aged.push(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cat::ProceduralCat;

    #[test]
    fn envelope_boundaries() {
        let timeout = 9_000.0;
        assert_eq!(scale_envelope(0.0, timeout, 1.0), 0.0);
        assert_eq!(scale_envelope(250.0, timeout, 1.0), 0.5);
        assert_eq!(scale_envelope(500.0, timeout, 1.0), 1.0);
        assert_eq!(scale_envelope(4_000.0, timeout, 1.0), 1.0);
        assert_eq!(scale_envelope(timeout - 500.0, timeout, 1.0), 1.0);
        assert_eq!(scale_envelope(timeout - 250.0, timeout, 1.0), 0.5);
        assert!(scale_envelope(timeout - 1.0, timeout, 1.0) < 0.01);
    }

    #[test]
    fn envelope_is_clamped_both_ways() {
        assert_eq!(scale_envelope(-100.0, 9_000.0, 1.0), 0.0);
        assert_eq!(scale_envelope(12_000.0, 9_000.0, 1.0), 0.0);
        assert_eq!(scale_envelope(700.0, 9_000.0, 0.5), 0.5);
    }

    #[test]
    fn shorter_timeout_reshapes_shrink_window() {
        // Same age, timeout lowered mid-flight: the shrink ramp moves with it.
        assert_eq!(scale_envelope(3_000.0, 9_000.0, 1.0), 1.0);
        assert_eq!(scale_envelope(3_000.0, 3_250.0, 1.0), 0.5);
    }

    #[test]
    fn spawn_places_cat_in_box_at_zero_scale() {
        let mut world = hecs::World::new();
        let mut graph = SceneGraph::new();
        let mut rng = fastrand::Rng::with_seed(11);

        for _ in 0..50 {
            let e = spawn(&mut world, &mut graph, &mut ProceduralCat, &mut rng, "Bengal", 0.0);
            let visual = world.get::<&Visual>(e).expect("has visual").0;
            let node = graph.get(visual).expect("attached");
            assert_eq!(node.owner, Some(e));
            assert_eq!(node.transform.scale, 0.0);

            let p = node.transform.position;
            assert!(p.cmpge(SPAWN_MIN).all() && p.cmple(SPAWN_MAX).all(), "{p:?}");

            let spin = world.get::<&Spin>(e).expect("has spin").0;
            assert!(spin.abs().cmple(Vec3::splat(MAX_SPIN)).all());
        }
        assert_eq!(graph.len(), 50);
    }

    #[test]
    fn age_despawns_expired_and_skips_fresh() {
        let mut world = hecs::World::new();
        let mut graph = SceneGraph::new();
        let mut rng = fastrand::Rng::with_seed(5);

        let old = spawn(&mut world, &mut graph, &mut ProceduralCat, &mut rng, "Tabby", 0.0);
        let mid = spawn(&mut world, &mut graph, &mut ProceduralCat, &mut rng, "Tabby", 4_000.0);
        let fresh = spawn(&mut world, &mut graph, &mut ProceduralCat, &mut rng, "Tabby", 9_000.0);

        let mut aged = Vec::new();
        let mut gone = Vec::new();
        age(
            &mut world,
            &mut graph,
            &[old, mid, fresh],
            Some(fresh),
            9_000.0,
            9_000.0,
            &mut aged,
            &mut gone,
        );

        assert_eq!(gone, vec![old]);
        assert_eq!(aged, vec![mid]);
        assert!(!world.contains(old));
        assert_eq!(graph.len(), 2);

        let mid_visual = world.get::<&Visual>(mid).expect("alive").0;
        assert_eq!(graph.transform(mid_visual).expect("attached").scale, 1.0);
    }
}
