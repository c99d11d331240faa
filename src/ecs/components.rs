use glam::Vec3;

use crate::scene::graph::VisualHandle;

/// Display name for tooltips. Independent of the breed.
#[derive(Debug, Clone)]
pub struct CatName(pub String);

/// Breed the cat was built from.
#[derive(Debug, Clone)]
pub struct Breed(pub String);

/// The visual this cat owns. Released exactly once, at despawn.
#[derive(Debug, Clone, Copy)]
pub struct Visual(pub VisualHandle);

/// Host timestamp (ms) at which the cat was created.
#[derive(Debug, Clone, Copy)]
pub struct SpawnTime(pub f64);

/// Per-axis rotation added every tick, before the spin multiplier (radians).
#[derive(Debug, Clone, Copy)]
pub struct Spin(pub Vec3);

/// Scale the envelope grows to and holds at.
#[derive(Debug, Clone, Copy)]
pub struct TargetScale(pub f32);
