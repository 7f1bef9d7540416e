//! STL export of machined baseplates, binary and ASCII.

use std::fmt::Write as _;

use geometry_kernel::{GeometryKernel, RenderMesh};
use layout_engine::{ComponentId, Layout};
use tracing::{debug, instrument};

use crate::errors::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Binary,
    Ascii,
}

/// Tessellate the last aggregated solid of `plate` and write it as STL.
///
/// The layout must have been redrawn; the mesh is in the plate frame.
#[instrument(skip(layout, kernel))]
pub fn export_baseplate_stl(
    layout: &Layout,
    kernel: &dyn GeometryKernel,
    plate: ComponentId,
    format: StlFormat,
) -> Result<Vec<u8>, ExportError> {
    let solid = layout
        .baseplate_solid(plate)
        .map_err(|e| ExportError::NoSolid(e.to_string()))?;
    let name = layout
        .graph()
        .get(plate)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    let mesh = kernel
        .tessellate(solid, layout.config().tessellation_tolerance)
        .map_err(|e| ExportError::TessellationFailed(e.to_string()))?;
    debug!(%name, triangles = mesh.triangle_count(), "baseplate tessellated");
    match format {
        StlFormat::Binary => export_binary_stl(&mesh, &name),
        StlFormat::Ascii => export_ascii_stl(&mesh, &name).map(String::into_bytes),
    }
}

/// Export a mesh as binary STL.
///
/// Layout: 80-byte header, u32 triangle count, then 50 bytes per
/// triangle (normal, three vertices, u16 attribute).
pub fn export_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let facets = facets(mesh)?;

    let mut buf = Vec::with_capacity(84 + facets.len() * 50);
    let header = format!("binary STL: {name}");
    let header = header.as_bytes();
    buf.extend_from_slice(&header[..header.len().min(80)]);
    buf.resize(80, 0u8);
    buf.extend_from_slice(&(facets.len() as u32).to_le_bytes());

    for facet in &facets {
        for v in std::iter::once(&facet.normal).chain(facet.vertices.iter()) {
            for c in v {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    Ok(buf)
}

/// Export a mesh as an ASCII STL string.
pub fn export_ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, ExportError> {
    let facets = facets(mesh)?;

    let mut out = String::with_capacity(facets.len() * 300);
    let _ = writeln!(out, "solid {name}");
    for facet in &facets {
        let [nx, ny, nz] = facet.normal;
        let _ = writeln!(out, "  facet normal {nx} {ny} {nz}");
        out.push_str("    outer loop\n");
        for [x, y, z] in facet.vertices {
            let _ = writeln!(out, "      vertex {x} {y} {z}");
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    let _ = writeln!(out, "endsolid {name}");
    Ok(out)
}

// ── Facets ──────────────────────────────────────────────────────────────

struct Facet {
    normal: [f32; 3],
    vertices: [[f32; 3]; 3],
}

/// Validate the mesh and split it into facets with face normals.
fn facets(mesh: &RenderMesh) -> Result<Vec<Facet>, ExportError> {
    if mesh.triangle_count() == 0 {
        return Err(ExportError::StlFailed {
            reason: "mesh has no triangles".to_string(),
        });
    }
    let vertex_count = mesh.vertices.len() / 3;
    if let Some(&idx) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ExportError::StlFailed {
            reason: format!("index {idx} out of range (vertex count = {vertex_count})"),
        });
    }

    let vertex = |i: u32| {
        let i = i as usize * 3;
        [mesh.vertices[i], mesh.vertices[i + 1], mesh.vertices[i + 2]]
    };
    Ok(mesh
        .indices
        .chunks_exact(3)
        .map(|tri| {
            let vertices = [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])];
            Facet {
                normal: face_normal(&vertices),
                vertices,
            }
        })
        .collect())
}

fn face_normal([p0, p1, p2]: &[[f32; 3]; 3]) -> [f32; 3] {
    let a = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let b = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
    let n = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-12 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RenderMesh {
        RenderMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_face_normal_points_up() {
        let facets = facets(&triangle()).unwrap();
        assert_eq!(facets[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut mesh = triangle();
        mesh.indices[2] = 7;
        assert!(matches!(
            export_binary_stl(&mesh, "bad"),
            Err(ExportError::StlFailed { .. })
        ));
    }

    #[test]
    fn test_ascii_closes_solid() {
        let text = export_ascii_stl(&triangle(), "tri").unwrap();
        assert!(text.starts_with("solid tri\n"));
        assert!(text.trim_end().ends_with("endsolid tri"));
        assert_eq!(text.matches("facet normal").count(), 1);
    }
}
