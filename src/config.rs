use std::ops::RangeInclusive;

/// Slider range for the automatic spawn interval (ms).
pub const SPAWN_INTERVAL_RANGE_MS: RangeInclusive<f64> = 500.0..=10_000.0;
/// Slider range for how long a cat lives (ms).
pub const DESPAWN_TIMEOUT_RANGE_MS: RangeInclusive<f64> = 2_000.0..=30_000.0;
/// Slider range for the spin multiplier.
pub const ROTATION_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.1..=10.0;

const INITIAL_SPAWN_INTERVAL_MS: f64 = 3_000.0;
const INITIAL_DESPAWN_TIMEOUT_MS: f64 = 9_000.0;

/// Live-tunable simulation knobs. Read fresh on every tick; writes take
/// effect on the next one.
#[derive(Debug, Clone)]
pub struct SimConfig {
    spawn_interval_ms: f64,
    despawn_timeout_ms: f64,
    rotation_multiplier: f32,
    /// When false the spawn timer never fires. Manual spawns still work.
    pub auto_spawn: bool,
    /// Breed used by the manual factory button.
    pub manual_selection: String,
}

impl SimConfig {
    pub fn new(manual_selection: impl Into<String>) -> Self {
        Self {
            spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            despawn_timeout_ms: INITIAL_DESPAWN_TIMEOUT_MS,
            rotation_multiplier: 1.0,
            auto_spawn: true,
            manual_selection: manual_selection.into(),
        }
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    pub fn despawn_timeout_ms(&self) -> f64 {
        self.despawn_timeout_ms
    }

    pub fn rotation_multiplier(&self) -> f32 {
        self.rotation_multiplier
    }

    pub fn set_spawn_interval_ms(&mut self, ms: f64) {
        self.spawn_interval_ms = clamp_f64(ms, &SPAWN_INTERVAL_RANGE_MS, self.spawn_interval_ms);
    }

    pub fn set_despawn_timeout_ms(&mut self, ms: f64) {
        self.despawn_timeout_ms =
            clamp_f64(ms, &DESPAWN_TIMEOUT_RANGE_MS, self.despawn_timeout_ms);
    }

    pub fn set_rotation_multiplier(&mut self, mult: f32) {
        if mult.is_nan() {
            return;
        }
        self.rotation_multiplier =
            mult.clamp(*ROTATION_MULTIPLIER_RANGE.start(), *ROTATION_MULTIPLIER_RANGE.end());
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(crate::catalog::VARIANTS[0].name)
    }
}

/// NaN keeps the current value; everything else is clamped into range.
fn clamp_f64(value: f64, range: &RangeInclusive<f64>, current: f64) -> f64 {
    if value.is_nan() {
        current
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_constants() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.spawn_interval_ms(), 3_000.0);
        assert_eq!(cfg.despawn_timeout_ms(), 9_000.0);
        assert_eq!(cfg.rotation_multiplier(), 1.0);
        assert!(cfg.auto_spawn);
        assert_eq!(cfg.manual_selection, "Tabby");
    }

    #[test]
    fn setters_clamp_out_of_range_writes() {
        let mut cfg = SimConfig::default();

        cfg.set_spawn_interval_ms(10.0);
        assert_eq!(cfg.spawn_interval_ms(), 500.0);
        cfg.set_spawn_interval_ms(1e9);
        assert_eq!(cfg.spawn_interval_ms(), 10_000.0);

        cfg.set_despawn_timeout_ms(-5.0);
        assert_eq!(cfg.despawn_timeout_ms(), 2_000.0);
        cfg.set_despawn_timeout_ms(45_000.0);
        assert_eq!(cfg.despawn_timeout_ms(), 30_000.0);

        cfg.set_rotation_multiplier(0.0);
        assert_eq!(cfg.rotation_multiplier(), 0.1);
        cfg.set_rotation_multiplier(99.0);
        assert_eq!(cfg.rotation_multiplier(), 10.0);
    }

    #[test]
    fn nan_writes_are_ignored() {
        let mut cfg = SimConfig::default();
        cfg.set_spawn_interval_ms(f64::NAN);
        cfg.set_despawn_timeout_ms(f64::NAN);
        cfg.set_rotation_multiplier(f32::NAN);
        assert_eq!(cfg.spawn_interval_ms(), 3_000.0);
        assert_eq!(cfg.despawn_timeout_ms(), 9_000.0);
        assert_eq!(cfg.rotation_multiplier(), 1.0);
    }
}
