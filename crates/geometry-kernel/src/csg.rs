//! Constructive solid geometry expression trees.
//!
//! The mock kernel stores every solid as a `CsgNode` and answers
//! membership queries by walking the tree, the way a signed-distance
//! DAG is evaluated point by point.

use nalgebra::Point3;
use optic_types::Placement;

use crate::types::BoundingBox;

/// Character advance used to size text slabs, as a fraction of the text height.
pub const TEXT_ADVANCE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub enum CsgNode {
    /// Corner at the origin, extending to `size`.
    Box { size: [f64; 3] },
    /// Base disc centered at the origin, extruded along +z.
    Cylinder { radius: f64, height: f64 },
    /// Truncated cone along +z.
    Cone {
        base_radius: f64,
        top_radius: f64,
        height: f64,
    },
    /// Text slab: advance along +x, height along +y, depth along +z.
    Text { text: String, size: f64, depth: f64 },
    /// Box with its edges along `axis` rounded by `radius`.
    FilletedBox {
        size: [f64; 3],
        axis: usize,
        radius: f64,
    },
    Transformed {
        node: Box<CsgNode>,
        placement: Placement,
        inverse: Placement,
    },
    Union(Box<CsgNode>, Box<CsgNode>),
    Difference(Box<CsgNode>, Box<CsgNode>),
}

impl CsgNode {
    pub fn transformed(node: CsgNode, placement: Placement) -> CsgNode {
        CsgNode::Transformed {
            node: Box::new(node),
            inverse: placement.inverse(),
            placement,
        }
    }

    /// Point membership, boundary inclusive.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        match self {
            CsgNode::Box { size } => in_box(p, size),
            CsgNode::Cylinder { radius, height } => {
                p.z >= 0.0 && p.z <= *height && p.x * p.x + p.y * p.y <= radius * radius
            }
            CsgNode::Cone {
                base_radius,
                top_radius,
                height,
            } => {
                if p.z < 0.0 || p.z > *height {
                    return false;
                }
                let r = base_radius + (top_radius - base_radius) * p.z / height;
                p.x * p.x + p.y * p.y <= r * r
            }
            CsgNode::Text { text, size, depth } => in_box(p, &text_extent(text, *size, *depth)),
            CsgNode::FilletedBox { size, axis, radius } => {
                if !in_box(p, size) {
                    return false;
                }
                let (i, j) = ((axis + 1) % 3, (axis + 2) % 3);
                let ci = p[i].clamp(*radius, (size[i] - radius).max(*radius));
                let cj = p[j].clamp(*radius, (size[j] - radius).max(*radius));
                let (di, dj) = (p[i] - ci, p[j] - cj);
                di * di + dj * dj <= radius * radius
            }
            CsgNode::Transformed { node, inverse, .. } => node.contains(&inverse.apply_point(p)),
            CsgNode::Union(a, b) => a.contains(p) || b.contains(p),
            CsgNode::Difference(a, b) => a.contains(p) && !b.contains(p),
        }
    }

    /// Conservative axis-aligned bounds.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            CsgNode::Box { size } | CsgNode::FilletedBox { size, .. } => {
                BoundingBox::new([0.0; 3], *size)
            }
            CsgNode::Cylinder { radius, height } => {
                BoundingBox::new([-radius, -radius, 0.0], [*radius, *radius, *height])
            }
            CsgNode::Cone {
                base_radius,
                top_radius,
                height,
            } => {
                let r = base_radius.max(*top_radius);
                BoundingBox::new([-r, -r, 0.0], [r, r, *height])
            }
            CsgNode::Text { text, size, depth } => {
                BoundingBox::new([0.0; 3], text_extent(text, *size, *depth))
            }
            CsgNode::Transformed {
                node, placement, ..
            } => node.bounds().transformed(placement),
            CsgNode::Union(a, b) => a.bounds().union(&b.bounds()),
            CsgNode::Difference(a, _) => a.bounds(),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            CsgNode::Transformed { node, .. } => 1 + node.node_count(),
            CsgNode::Union(a, b) | CsgNode::Difference(a, b) => {
                1 + a.node_count() + b.node_count()
            }
            _ => 1,
        }
    }
}

fn in_box(p: &Point3<f64>, size: &[f64; 3]) -> bool {
    p.x >= 0.0 && p.x <= size[0] && p.y >= 0.0 && p.y <= size[1] && p.z >= 0.0 && p.z <= size[2]
}

fn text_extent(text: &str, size: f64, depth: f64) -> [f64; 3] {
    let chars = text.chars().count().max(1) as f64;
    [TEXT_ADVANCE * size * chars, size, depth]
}
