use glam::{Mat4, Quat, Vec3};

use crate::catalog::Rgb;

/// One ellipsoid of a cat model, in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub offset: Vec3,
    pub radii: Vec3,
    pub color: Rgb,
}

impl Part {
    /// Unit sphere -> this ellipsoid in model space.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.radii, Quat::IDENTITY, self.offset)
    }
}

/// Renderable + pickable shape of one cat: a bag of ellipsoids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatModel {
    pub parts: Vec<Part>,
}

/// Builds the visual for a breed. Swappable so tests and alternative
/// styles can plug in their own geometry.
pub trait ModelFactory {
    fn build(&mut self, body: Rgb, eyes: Rgb, size: f32) -> CatModel;
}

/// Default factory: a chubby cat facing +X built from spheres.
#[derive(Debug, Default)]
pub struct ProceduralCat;

impl ModelFactory for ProceduralCat {
    fn build(&mut self, body: Rgb, eyes: Rgb, size: f32) -> CatModel {
        let s = size;
        let mut parts = Vec::with_capacity(20);
        let mut push = |offset: Vec3, radii: Vec3, color: Rgb| {
            parts.push(Part { offset, radii, color });
        };

        // Torso and head
        push(Vec3::ZERO, Vec3::new(1.0, 0.8, 1.2) * 0.5 * s, body);
        push(
            Vec3::new(0.5, 0.3, 0.0) * s,
            Vec3::new(1.0, 0.9, 0.9) * 0.3 * s,
            body,
        );

        // Eyes keep a fixed radius, pupils sit just in front of them
        for side in [1.0, -1.0] {
            push(
                Vec3::new(0.75, 0.35, 0.12 * side) * s,
                Vec3::splat(0.05),
                eyes,
            );
            push(
                Vec3::new(0.78, 0.35, 0.12 * side) * s,
                Vec3::splat(0.02),
                Rgb::BLACK,
            );
        }

        // Ears: squashed spheres standing in for cones
        for side in [1.0, -1.0] {
            push(
                Vec3::new(0.6, 0.5, 0.15 * side) * s,
                Vec3::new(0.07, 0.1, 0.07) * s,
                body,
            );
        }

        // Tail: beads along the curl
        let tail = [
            Vec3::new(-0.5, 0.0, 0.0),
            Vec3::new(-0.6, 0.1, 0.0),
            Vec3::new(-0.7, 0.2, 0.0),
            Vec3::new(-0.8, 0.25, 0.0),
            Vec3::new(-0.9, 0.3, 0.0),
            Vec3::new(-0.85, 0.35, 0.0),
            Vec3::new(-0.8, 0.4, 0.0),
        ];
        for point in tail {
            push(point * s, Vec3::splat(0.04 * s), body);
        }

        // Paws
        for (x, z) in [(-0.3, 0.2), (-0.3, -0.2), (0.3, 0.2), (0.3, -0.2)] {
            push(Vec3::new(x, -0.5, z) * s, Vec3::splat(0.08 * s), body);
        }

        CatModel { parts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_first_and_centered() {
        let model = ProceduralCat.build(Rgb::from_hex(0xA0522D), Rgb::from_hex(0x00FF00), 2.0);
        let body = model.parts[0];
        assert_eq!(body.offset, Vec3::ZERO);
        assert_eq!(body.radii, Vec3::new(1.0, 0.8, 1.2));
    }

    #[test]
    fn eye_color_only_on_eyes() {
        let eyes = Rgb::from_hex(0x0000FF);
        let model = ProceduralCat.build(Rgb::from_hex(0xFFFFFF), eyes, 1.0);
        let eye_parts = model.parts.iter().filter(|p| p.color == eyes).count();
        assert_eq!(eye_parts, 2);
    }

    #[test]
    fn size_scales_layout() {
        let small = ProceduralCat.build(Rgb::BLACK, Rgb::BLACK, 1.0);
        let big = ProceduralCat.build(Rgb::BLACK, Rgb::BLACK, 2.0);
        assert_eq!(small.parts.len(), big.parts.len());
        let head_small = small.parts[1].offset;
        let head_big = big.parts[1].offset;
        assert!((head_big - head_small * 2.0).length() < 1e-6);
    }
}
