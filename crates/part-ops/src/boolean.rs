use geometry_kernel::{GeometryKernel, SolidHandle};

use crate::types::OpError;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanKind {
    Union,
    Subtract,
}

/// Execute a boolean operation between two solids.
pub fn combine(
    kernel: &mut dyn GeometryKernel,
    a: &SolidHandle,
    b: &SolidHandle,
    kind: BooleanKind,
) -> Result<SolidHandle, OpError> {
    let handle = match kind {
        BooleanKind::Union => kernel.boolean_union(a, b)?,
        BooleanKind::Subtract => kernel.boolean_subtract(a, b)?,
    };
    Ok(handle)
}

/// Left fold of unions over `solids`; `None` when the slice is empty.
pub fn union_all(
    kernel: &mut dyn GeometryKernel,
    solids: &[SolidHandle],
) -> Result<Option<SolidHandle>, OpError> {
    let Some((first, rest)) = solids.split_first() else {
        return Ok(None);
    };
    let mut acc = first.clone();
    for s in rest {
        acc = combine(kernel, &acc, s, BooleanKind::Union)?;
    }
    Ok(Some(acc))
}
