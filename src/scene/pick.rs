use glam::{Mat4, Vec3};

use super::graph::{SceneGraph, VisualHandle};

/// Node scales below this are treated as invisible and never hit.
const MIN_PICK_SCALE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Always unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersection with a plane, if the plane is in front of the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = -(plane.normal.dot(self.origin) + plane.constant) / denom;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Ray parameter of the first hit with a unit sphere deformed by
    /// `shape` (model -> world), or None.
    pub fn intersect_ellipsoid(&self, shape: &Mat4) -> Option<f32> {
        let inv = shape.inverse();
        if !inv.is_finite() {
            return None;
        }
        let o = inv.transform_point3(self.origin);
        let d = inv.transform_vector3(self.direction);

        let a = d.dot(d);
        let b = 2.0 * o.dot(d);
        let c = o.dot(o) - 1.0;
        let disc = b * b - 4.0 * a * c;
        if a <= 0.0 || disc < 0.0 {
            return None;
        }
        let sqrt = disc.sqrt();
        let near = (-b - sqrt) / (2.0 * a);
        let far = (-b + sqrt) / (2.0 * a);
        // Affine maps preserve the ray parameter, so t is in world units.
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }
}

/// Plane `normal . p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            constant: -normal.dot(point),
        }
    }

    #[cfg(test)]
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

/// Nearest visual part hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub visual: VisualHandle,
    pub owner: Option<hecs::Entity>,
    pub t: f32,
}

/// Cast against every part of every attached node. Smallest `t` wins.
pub fn raycast(graph: &SceneGraph, ray: &Ray) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for (handle, node) in graph.nodes() {
        if node.transform.scale.abs() < MIN_PICK_SCALE {
            continue;
        }
        let node_m = node.transform.matrix();
        for part in &node.model.parts {
            let shape = node_m * part.local_matrix();
            if let Some(t) = ray.intersect_ellipsoid(&shape) {
                if best.map_or(true, |b| t < b.t) {
                    best = Some(Hit {
                        visual: handle,
                        owner: node.owner,
                        t,
                    });
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cat::{CatModel, Part};
    use crate::catalog::Rgb;
    use crate::scene::graph::Transform;

    fn ball(radius: f32) -> CatModel {
        CatModel {
            parts: vec![Part {
                offset: Vec3::ZERO,
                radii: Vec3::splat(radius),
                color: Rgb::BLACK,
            }],
        }
    }

    fn at(pos: Vec3, scale: f32) -> Transform {
        Transform {
            position: pos,
            rotation: Vec3::ZERO,
            scale,
        }
    }

    #[test]
    fn plane_intersection_in_front_only() {
        let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::new(0.0, 0.0, -5.0));
        let forward = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = forward.intersect_plane(&plane).expect("hits");
        assert!((hit - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
        assert!(plane.distance_to(hit).abs() < 1e-5);

        let backward = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(backward.intersect_plane(&plane).is_none());

        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(parallel.intersect_plane(&plane).is_none());
    }

    #[test]
    fn ellipsoid_hit_distance_is_in_world_units() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let shape = Mat4::from_scale(Vec3::new(1.0, 1.0, 2.0));
        let t = ray.intersect_ellipsoid(&shape).expect("hits");
        assert!((t - 8.0).abs() < 1e-4);
    }

    #[test]
    fn nearest_hit_wins() {
        let mut graph = SceneGraph::new();
        let far = graph.attach(ball(1.0), at(Vec3::new(0.0, 0.0, -4.0), 1.0), None);
        let near = graph.attach(ball(1.0), at(Vec3::new(0.0, 0.0, 0.0), 1.0), None);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = raycast(&graph, &ray).expect("hits");
        assert_eq!(hit.visual, near);
        assert_ne!(hit.visual, far);
        assert!((hit.t - 9.0).abs() < 1e-4);
    }

    #[test]
    fn zero_scale_nodes_are_not_hit() {
        let mut graph = SceneGraph::new();
        graph.attach(ball(1.0), at(Vec3::ZERO, 0.0), None);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(raycast(&graph, &ray).is_none());
    }

    #[test]
    fn miss_returns_none() {
        let mut graph = SceneGraph::new();
        graph.attach(ball(1.0), at(Vec3::ZERO, 1.0), None);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(raycast(&graph, &ray).is_none());
    }
}
