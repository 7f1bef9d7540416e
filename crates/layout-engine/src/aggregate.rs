//! Drill aggregation.
//!
//! Every drill footprint on a baseplate is moved into the plate frame,
//! the footprints are unioned, and the union is subtracted from the
//! stock. The label is engraved last.

use geometry_kernel::{GeometryKernel, SolidHandle};
use optic_types::{Placement, INCH};
use part_ops::{combine, union_all, BooleanKind, OpError};
use scene_graph::{BaseplateSpec, ComponentId, SceneGraph};
use tracing::{debug, info, instrument};

use crate::types::AggregateError;

/// Height of engraved label text (mm).
pub const LABEL_SIZE: f64 = 4.0;
/// Depth of the engraving into the front face (mm).
pub const LABEL_DEPTH: f64 = 0.5;
/// Distance of the label from the left edge of the stock (mm).
pub const LABEL_INSET: f64 = 5.0;

/// A drill footprint already in plate coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    pub component: String,
    pub solid: SolidHandle,
}

/// Machined solid for `plate`, in the plate frame.
#[instrument(skip(kernel, graph))]
pub fn aggregate(
    kernel: &mut dyn GeometryKernel,
    graph: &SceneGraph,
    plate: ComponentId,
) -> Result<SolidHandle, AggregateError> {
    let p = graph.component(plate)?;
    let Some(spec) = p.baseplate_spec() else {
        return Err(AggregateError::NotABaseplate {
            name: p.name.clone(),
        });
    };
    let cuts = if spec.drill {
        collect_cuts(kernel, graph, plate)?
    } else {
        Vec::new()
    };
    let solid = cut_stock(kernel, &p.name, spec, &cuts)?;
    info!(plate = %p.name, cuts = cuts.len(), "baseplate aggregated");
    Ok(solid)
}

/// Drill footprints of every drilling component transitively anchored to
/// `plate`, in scene order, moved into the plate frame.
pub fn collect_cuts(
    kernel: &mut dyn GeometryKernel,
    graph: &SceneGraph,
    plate: ComponentId,
) -> Result<Vec<Cut>, AggregateError> {
    let p = graph.component(plate)?;
    let to_plate = p.world.inverse();
    // Parts attached under the plate itself, then free parts anchored to it.
    let tops: Vec<ComponentId> = p
        .children
        .iter()
        .copied()
        .chain(graph.members_of(plate))
        .collect();
    let mut cuts = Vec::new();
    for top in tops {
        for id in graph.walk(top) {
            let c = graph.component(id)?;
            let Some(drill) = c.drill.as_ref().filter(|_| c.drill_enabled) else {
                continue;
            };
            let frame = to_plate.compose(&c.world);
            let solid = kernel
                .transform(drill, &frame)
                .map_err(|e| AggregateError::Geometry {
                    component: c.name.clone(),
                    source: e.into(),
                })?;
            debug!(component = %c.name, "drill collected");
            cuts.push(Cut {
                component: c.name.clone(),
                solid,
            });
        }
    }
    Ok(cuts)
}

/// Stock minus the union of `cuts`, then the label engraving.
pub fn cut_stock(
    kernel: &mut dyn GeometryKernel,
    plate_name: &str,
    spec: &BaseplateSpec,
    cuts: &[Cut],
) -> Result<SolidHandle, AggregateError> {
    let fail = |source: OpError| AggregateError::Geometry {
        component: plate_name.to_string(),
        source,
    };
    let mut part = spec.build_stock(kernel).map_err(fail)?;
    let solids: Vec<SolidHandle> = cuts.iter().map(|c| c.solid.clone()).collect();
    if let Some(tool) = union_all(kernel, &solids).map_err(fail)? {
        part = combine(kernel, &part, &tool, BooleanKind::Subtract).map_err(fail)?;
    }
    if let Some(label) = spec.label.as_deref().filter(|l| !l.is_empty()) {
        let text = engraving(kernel, spec, label).map_err(fail)?;
        part = combine(kernel, &part, &text, BooleanKind::Subtract).map_err(fail)?;
    }
    Ok(part)
}

/// Text standing on the front face of the stock, sunk `LABEL_DEPTH` into it.
fn engraving(
    kernel: &mut dyn GeometryKernel,
    spec: &BaseplateSpec,
    label: &str,
) -> Result<SolidHandle, OpError> {
    let text = kernel.make_text(label, LABEL_SIZE, LABEL_DEPTH)?;
    let [x, y, z] = spec.stock_origin();
    let lift = ((spec.size[2] - LABEL_SIZE) / 2.0).clamp(0.0, INCH);
    // Quarter turn about x stands the slab up with its depth running along -y.
    let frame = Placement::from_euler_deg(
        [x + LABEL_INSET, y + LABEL_DEPTH, z + lift],
        [90.0, 0.0, 0.0],
    );
    Ok(kernel.transform(&text, &frame)?)
}
