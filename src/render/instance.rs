use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};

use crate::cat::Part;
use crate::scene::graph::SceneGraph;

/// Per-instance data uploaded to GPU each frame: one ellipsoid part.
/// Stride = 128 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PartInstance {
    /// Unit sphere -> world, columns.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3x3, padded to vec4 columns.
    pub normal: [[f32; 4]; 3],
    /// Linear RGB, alpha unused.
    pub color: [f32; 4],
}

impl PartInstance {
    pub fn new(node_matrix: Mat4, part: &Part) -> Self {
        let model = node_matrix * part.local_matrix();
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let [r, g, b] = part.color.0;
        Self {
            model: model.to_cols_array_2d(),
            normal: [
                normal.x_axis.extend(0.0).into(),
                normal.y_axis.extend(0.0).into(),
                normal.z_axis.extend(0.0).into(),
            ],
            color: [r, g, b, 1.0],
        }
    }
}

/// Flatten every visible node into part instances. Nodes at (near) zero
/// scale are skipped since their normal matrix is degenerate.
pub fn collect(graph: &SceneGraph, out: &mut Vec<PartInstance>) {
    out.clear();
    for (_, node) in graph.nodes() {
        if node.transform.scale <= 1e-4 {
            continue;
        }
        let matrix = node.transform.matrix();
        out.extend(node.model.parts.iter().map(|part| PartInstance::new(matrix, part)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cat::{ModelFactory, ProceduralCat};
    use crate::catalog::Rgb;
    use crate::scene::graph::Transform;
    use glam::Vec3;

    fn transform(scale: f32) -> Transform {
        Transform {
            position: Vec3::new(1.0, 2.0, -3.0),
            rotation: Vec3::ZERO,
            scale,
        }
    }

    #[test]
    fn stride_is_stable() {
        assert_eq!(std::mem::size_of::<PartInstance>(), 128);
    }

    #[test]
    fn hidden_nodes_emit_nothing() {
        let mut graph = SceneGraph::new();
        let model = ProceduralCat.build(Rgb::BLACK, Rgb::BLACK, 2.0);
        let parts = model.parts.len();
        graph.attach(model.clone(), transform(0.0), None);
        graph.attach(model, transform(1.0), None);

        let mut out = Vec::new();
        collect(&graph, &mut out);
        assert_eq!(out.len(), parts);
    }

    #[test]
    fn body_instance_sits_at_node_position() {
        let mut graph = SceneGraph::new();
        let model = ProceduralCat.build(Rgb::from_hex(0xff0000), Rgb::BLACK, 2.0);
        graph.attach(model, transform(1.0), None);

        let mut out = Vec::new();
        collect(&graph, &mut out);
        let body = out[0];
        assert_eq!(body.model[3][..3], [1.0, 2.0, -3.0]);
        assert_eq!(body.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
