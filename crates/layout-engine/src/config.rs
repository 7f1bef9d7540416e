//! Layout-wide settings.

use beam_path::ResolverConfig;
use mount_catalog::BuildContext;
use optic_types::{BranchKey, DEFAULT_OPTICS_DZ, DRILL_DEPTH, INCH};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of the beam plane above the baseplate working surface (mm).
    pub optics_dz: f64,
    /// Depth of through holes (mm).
    pub drill_depth: f64,
    /// Key given to the root branch of every new beam path.
    pub root_branch_key: BranchKey,
    pub resolver: ResolverConfig,
    /// Chordal tolerance used when tessellating for export (mm).
    pub tessellation_tolerance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            optics_dz: DEFAULT_OPTICS_DZ,
            drill_depth: DRILL_DEPTH,
            root_branch_key: BranchKey::ROOT,
            resolver: ResolverConfig::default(),
            tessellation_tolerance: 0.05,
        }
    }
}

impl LayoutConfig {
    /// Optics held 1.5 inch above an optical table.
    pub fn table_mount() -> Self {
        Self {
            optics_dz: 1.5 * INCH,
            ..Self::default()
        }
    }

    pub fn build_context(&self) -> BuildContext {
        BuildContext::new(self.optics_dz, self.drill_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_mount_raises_optics() {
        let c = LayoutConfig::table_mount();
        assert!((c.optics_dz - 38.1).abs() < 1e-12);
        assert_eq!(c.drill_depth, LayoutConfig::default().drill_depth);
    }

    #[test]
    fn test_build_context_uses_heights() {
        let ctx = LayoutConfig::table_mount().build_context();
        assert!((ctx.surface_z() + 38.1).abs() < 1e-12);
    }
}
