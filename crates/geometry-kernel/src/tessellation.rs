//! Tessellation of truck solids into export meshes.

use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::MeshableShape;

use crate::types::*;

type TruckSolid = truck_modeling::Solid;

/// Tessellate a truck Solid face by face into one RenderMesh.
pub fn tessellate_solid(
    solid: &TruckSolid,
    tolerance: f64,
) -> std::result::Result<RenderMesh, KernelError> {
    if tolerance.is_nan() || tolerance <= 0.0 {
        return Err(KernelError::InvalidParameter {
            reason: format!("tessellation tolerance must be positive, got {tolerance}"),
        });
    }
    let meshed_solid = solid.triangulation(tolerance);
    let mut mesh = RenderMesh::default();

    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(face_mesh) = maybe_mesh else {
                continue;
            };
            // inverted faces carry inverted meshes
            let face_mesh = if !face.orientation() {
                let mut m = face_mesh;
                m.invert();
                m
            } else {
                face_mesh
            };

            let base_vertex = (mesh.vertices.len() / 3) as u32;
            let positions = face_mesh.positions();
            let normals = face_mesh.normals();

            for pos in positions {
                mesh.vertices
                    .extend_from_slice(&[pos[0] as f32, pos[1] as f32, pos[2] as f32]);
            }
            if normals.len() == positions.len() {
                for n in normals {
                    mesh.normals
                        .extend_from_slice(&[n[0] as f32, n[1] as f32, n[2] as f32]);
                }
            } else {
                for _ in positions {
                    mesh.normals.extend_from_slice(&[0.0, 0.0, 1.0]);
                }
            }
            for tri in face_mesh.tri_faces() {
                for v in tri.iter() {
                    mesh.indices.push(v.pos as u32 + base_vertex);
                }
            }
        }
    }

    if mesh.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid produced no triangles".to_string(),
        });
    }
    Ok(mesh)
}
