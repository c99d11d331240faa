/// Linear RGB color in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    /// Build from a packed `0xRRGGBB` hex value.
    pub const fn from_hex(hex: u32) -> Self {
        Self([
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
        ])
    }

    pub const BLACK: Rgb = Rgb([0.0, 0.0, 0.0]);
}

/// A named breed style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variant {
    pub name: &'static str,
    pub body: Rgb,
    pub eyes: Rgb,
}

const fn variant(name: &'static str, body: u32, eyes: u32) -> Variant {
    Variant {
        name,
        body: Rgb::from_hex(body),
        eyes: Rgb::from_hex(eyes),
    }
}

/// Built-in breeds. The first entry is the fallback for unknown names.
pub const VARIANTS: [Variant; 10] = [
    variant("Tabby", 0xA0522D, 0x00FF00),
    variant("Siamese", 0xFDF5E6, 0x0000FF),
    variant("Persian", 0xFFFFFF, 0xFFA500),
    variant("Bengal", 0xD2691E, 0xFFD700),
    variant("Sphynx", 0xFFC0CB, 0x00FFFF),
    variant("Scottish Fold", 0x808080, 0xFFFF00),
    variant("Maine Coon", 0x8B4513, 0x8B4513),
    variant("Russian Blue", 0x4682B4, 0x00FF00),
    variant("Ragdoll", 0xF0F8FF, 0x0000FF),
    variant("British Shorthair", 0x708090, 0xFFA500),
];

const NAMES: &[&str] = &[
    "Whiskers", "Shadow", "Ginger", "Smokey", "Tiger", "Mittens", "Leo", "Bella",
    "Luna", "Oliver", "Cleo", "Simba", "Lucy", "Max", "Nala", "Charlie", "Chloe",
    "Milo", "Sophie", "Oscar", "Zoe", "Jasper", "Lily", "Rocky", "Gracie", "Coco",
    "Bandit", "Sadie", "Gizmo", "Ruby", "Thor",
];

/// Look up a breed by name. Unknown names (including user-registered ones)
/// fall back to the first built-in breed.
pub fn lookup(name: &str) -> &'static Variant {
    VARIANTS
        .iter()
        .find(|v| v.name == name)
        .unwrap_or(&VARIANTS[0])
}

/// Pick a flavor name for a freshly spawned cat.
pub fn random_name(rng: &mut fastrand::Rng) -> &'static str {
    NAMES[rng.usize(0..NAMES.len())]
}

/// Ordered set of breed names the spawner picks from.
///
/// Starts with every built-in breed; user registrations are appended and
/// never removed.
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    available: Vec<String>,
}

impl VariantCatalog {
    pub fn new() -> Self {
        Self {
            available: VARIANTS.iter().map(|v| v.name.to_string()).collect(),
        }
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn contains(&self, name: &str) -> bool {
        self.available.iter().any(|n| n == name)
    }

    /// Append a breed name. Blank and duplicate names are ignored.
    /// Returns true if the list grew.
    pub fn register(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.available.push(name.to_string());
        true
    }

    /// Uniformly pick one of the available names.
    pub fn pick(&self, rng: &mut fastrand::Rng) -> &str {
        &self.available[rng.usize(0..self.available.len())]
    }
}

impl Default for VariantCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        let c = Rgb::from_hex(0xFF8000);
        assert_eq!(c.0[0], 1.0);
        assert!((c.0[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.0[2], 0.0);
    }

    #[test]
    fn lookup_falls_back_to_first_breed() {
        assert_eq!(lookup("Bengal").name, "Bengal");
        assert_eq!(lookup("Calico").name, "Tabby");
        assert_eq!(lookup("").name, "Tabby");
    }

    #[test]
    fn register_is_idempotent() {
        let mut catalog = VariantCatalog::new();
        let before = catalog.available().len();

        assert!(catalog.register("Calico"));
        assert!(!catalog.register("Calico"));
        assert!(!catalog.register("  Calico "));

        let count = catalog.available().iter().filter(|n| *n == "Calico").count();
        assert_eq!(count, 1);
        assert_eq!(catalog.available().len(), before + 1);
    }

    #[test]
    fn register_ignores_blank_and_builtin_names() {
        let mut catalog = VariantCatalog::new();
        assert!(!catalog.register(""));
        assert!(!catalog.register("   "));
        assert!(!catalog.register("Sphynx"));
        assert_eq!(catalog.available().len(), VARIANTS.len());
    }

    #[test]
    fn pick_only_returns_available_names() {
        let mut catalog = VariantCatalog::new();
        catalog.register("Calico");
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..200 {
            let name = catalog.pick(&mut rng).to_string();
            assert!(catalog.contains(&name));
        }
    }
}
