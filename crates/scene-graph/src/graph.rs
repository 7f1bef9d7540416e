use std::collections::HashSet;

use mount_catalog::{BuildContext, PartModel};
use optic_types::Placement;
use slotmap::SlotMap;
use tracing::{debug, info};

use crate::types::*;

/// Owner of every component in a layout session.
#[derive(Debug)]
pub struct SceneGraph {
    components: SlotMap<ComponentId, Component>,
    /// Parentless components in creation order.
    roots: Vec<ComponentId>,
    /// Relative anchors in insertion order.
    anchors: Vec<RelativeAnchor>,
    /// Build context for components not anchored to a baseplate.
    context: BuildContext,
}

impl SceneGraph {
    pub fn new(context: BuildContext) -> Self {
        Self {
            components: SlotMap::with_key(),
            roots: Vec::new(),
            anchors: Vec::new(),
            context,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn component(&self, id: ComponentId) -> Result<&Component, GraphError> {
        self.components
            .get(id)
            .ok_or(GraphError::ComponentNotFound { id })
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component, GraphError> {
        self.components
            .get_mut(id)
            .ok_or(GraphError::ComponentNotFound { id })
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn roots(&self) -> &[ComponentId] {
        &self.roots
    }

    pub fn anchors(&self) -> &[RelativeAnchor] {
        &self.anchors
    }

    pub fn find_by_name(&self, name: &str) -> Option<ComponentId> {
        self.walk_all().into_iter().find(|&id| self.components[id].name == name)
    }

    /// Pre-order walk of the subtree under `root`, siblings in insertion order.
    pub fn walk(&self, root: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(c) = self.components.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(c.children.iter().rev().copied());
        }
        out
    }

    /// Every component, roots in creation order, each followed by its subtree.
    pub fn walk_all(&self) -> Vec<ComponentId> {
        self.roots.iter().flat_map(|&r| self.walk(r)).collect()
    }

    /// Baseplates in creation order.
    pub fn baseplates(&self) -> Vec<ComponentId> {
        self.roots
            .iter()
            .copied()
            .filter(|&id| self.components[id].is_baseplate())
            .collect()
    }

    /// Parentless components anchored to `plate`, in creation order.
    pub fn members_of(&self, plate: ComponentId) -> Vec<ComponentId> {
        self.roots
            .iter()
            .copied()
            .filter(|&id| self.components[id].baseplate == Some(plate))
            .collect()
    }

    /// Whether `id` lies in the subtree under `ancestor` (inclusive).
    pub fn is_descendant(&self, id: ComponentId, ancestor: ComponentId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            if c == ancestor {
                return true;
            }
            cursor = self.components.get(c).and_then(|comp| comp.parent);
        }
        false
    }

    /// Context a component is built in: its baseplate's optics height and
    /// its placement relative to that plate's frame.
    pub fn context_for(&self, id: ComponentId) -> Result<BuildContext, GraphError> {
        let c = self.component(id)?;
        let Some(plate_id) = c.baseplate else {
            return Ok(self.context.at(c.world));
        };
        let plate = self.component(plate_id)?;
        let mut ctx = self.context.at(plate.world.inverse().compose(&c.world));
        if let Some(spec) = plate.baseplate_spec() {
            ctx.optics_dz = spec.optics_dz;
        }
        Ok(ctx)
    }

    // ── Creation ────────────────────────────────────────────────────────

    pub fn add_baseplate(
        &mut self,
        name: impl Into<String>,
        spec: BaseplateSpec,
        placement: Placement,
    ) -> ComponentId {
        let mut c = Component::new(name.into(), ComponentKind::Baseplate(spec));
        c.world = placement;
        let id = self.components.insert(c);
        self.roots.push(id);
        info!(name = %self.components[id].name, "baseplate created");
        id
    }

    /// Create a root part, together with the sub-parts its model carries.
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        model: PartModel,
        baseplate: Option<ComponentId>,
    ) -> Result<ComponentId, GraphError> {
        if let Some(plate) = baseplate {
            let p = self.component(plate)?;
            if !p.is_baseplate() {
                return Err(GraphError::NotABaseplate {
                    name: p.name.clone(),
                });
            }
        }
        let name = name.into();
        self.check_names_free(&name, &model)?;
        let mut c = Component::new(name, ComponentKind::Part(model));
        c.baseplate = baseplate;
        let id = self.components.insert(c);
        self.roots.push(id);
        self.spawn_children(id)?;
        debug!(name = %self.components[id].name, "part created");
        Ok(id)
    }

    /// Create a part directly under `parent`.
    pub fn add_child(
        &mut self,
        parent: ComponentId,
        name: impl Into<String>,
        model: PartModel,
        relative: Placement,
        drill: Option<bool>,
    ) -> Result<ComponentId, GraphError> {
        self.component(parent)?;
        let name = name.into();
        self.check_names_free(&name, &model)?;
        let mut c = Component::new(name, ComponentKind::Part(model));
        if let Some(drill) = drill {
            c.drill_enabled = drill;
        }
        let id = self.components.insert(c);
        self.roots.push(id);
        self.attach(id, parent, relative)?;
        self.spawn_children(id)?;
        Ok(id)
    }

    fn spawn_children(&mut self, id: ComponentId) -> Result<(), GraphError> {
        let c = self.component(id)?;
        let Some(model) = c.model() else {
            return Ok(());
        };
        let ctx = self.context_for(id)?;
        let specs = model.children(&ctx);
        let base = c.name.clone();
        for child in specs {
            self.add_child(id, format!("{base}{}", child.suffix), child.model, child.relative, child.drill)?;
        }
        Ok(())
    }

    /// Rejects `name`, or any name its model's sub-parts would take, if a
    /// live component already holds it.
    fn check_names_free(&self, name: &str, model: &PartModel) -> Result<(), GraphError> {
        let mut names = vec![name.to_string()];
        self.spawned_names(name, model, &mut names);
        match names.into_iter().find(|n| self.find_by_name(n).is_some()) {
            Some(name) => Err(GraphError::DuplicateName { name }),
            None => Ok(()),
        }
    }

    fn spawned_names(&self, base: &str, model: &PartModel, out: &mut Vec<String>) {
        for child in model.children(&self.context) {
            let name = format!("{base}{}", child.suffix);
            self.spawned_names(&name, &child.model, out);
            out.push(name);
        }
    }

    // ── Structure edits ─────────────────────────────────────────────────

    /// Move `child` under `anchor` at `relative`.
    ///
    /// The child takes the anchor's baseplate. Rejected without mutation
    /// if `anchor` lies in `child`'s subtree.
    pub fn attach(
        &mut self,
        child: ComponentId,
        anchor: ComponentId,
        relative: Placement,
    ) -> Result<(), GraphError> {
        let child_name = self.component(child)?.name.clone();
        let anchor_comp = self.component(anchor)?;
        if self.is_descendant(anchor, child) {
            return Err(GraphError::Cycle {
                child: child_name,
                anchor: anchor_comp.name.clone(),
            });
        }
        let plate = if anchor_comp.is_baseplate() {
            Some(anchor)
        } else {
            anchor_comp.baseplate
        };

        if let Some(old) = self.component(child)?.parent {
            if let Some(old_parent) = self.components.get_mut(old) {
                old_parent.children.retain(|&c| c != child);
            }
        }
        self.roots.retain(|&r| r != child);
        self.component_mut(anchor)?.children.push(child);
        {
            let c = self.component_mut(child)?;
            c.parent = Some(anchor);
            c.relative = relative;
        }
        for id in self.walk(child) {
            let c = &mut self.components[id];
            c.baseplate = plate;
            c.dirty = true;
        }
        debug!(child = %child_name, "attached");
        Ok(())
    }

    /// Replace a child's offset from its parent; marks its subtree dirty.
    pub fn set_relative(&mut self, id: ComponentId, relative: Placement) -> Result<(), GraphError> {
        self.component_mut(id)?.relative = relative;
        self.mark_dirty(id);
        Ok(())
    }

    /// Set the world placement of a root; rejected for parented components.
    pub fn place_root(&mut self, id: ComponentId, world: Placement) -> Result<(), GraphError> {
        let c = self.component_mut(id)?;
        if c.parent.is_some() {
            return Err(GraphError::ParentedPlacement {
                name: c.name.clone(),
            });
        }
        c.world = world;
        self.mark_dirty(id);
        Ok(())
    }

    pub fn set_drill(&mut self, id: ComponentId, enabled: bool) -> Result<(), GraphError> {
        self.component_mut(id)?.drill_enabled = enabled;
        Ok(())
    }

    /// Flag a component whose placement could not be resolved, together
    /// with the subtree that derives its placement from it.
    pub fn flag_stale(&mut self, id: ComponentId) {
        for d in self.walk(id) {
            self.components[d].stale = true;
        }
    }

    /// Flag only `id`, whose own solid could not be rebuilt.
    pub fn flag_solid_stale(&mut self, id: ComponentId) {
        if let Some(c) = self.components.get_mut(id) {
            c.stale = true;
        }
    }

    fn mark_dirty(&mut self, id: ComponentId) {
        for d in self.walk(id) {
            self.components[d].dirty = true;
        }
    }

    /// Bind a root's placement to another component's placement.
    pub fn add_anchor(&mut self, anchor: RelativeAnchor) -> Result<(), GraphError> {
        let c = self.component(anchor.component)?;
        if c.parent.is_some() {
            return Err(GraphError::ParentedPlacement {
                name: c.name.clone(),
            });
        }
        let r = self.component(anchor.reference)?;
        if anchor.component == anchor.reference {
            return Err(GraphError::Cycle {
                child: c.name.clone(),
                anchor: r.name.clone(),
            });
        }
        self.anchors.push(anchor);
        Ok(())
    }

    // ── Deletion ────────────────────────────────────────────────────────

    /// Delete a component and its subtree; a baseplate also takes every
    /// component anchored to it.
    ///
    /// Rejected without mutation if a surviving relative anchor still
    /// references a deleted component. Returns the deleted ids.
    pub fn delete(&mut self, id: ComponentId) -> Result<Vec<ComponentId>, GraphError> {
        let target = self.component(id)?;
        let mut doomed = self.walk(id);
        if target.is_baseplate() {
            for member in self.members_of(id) {
                doomed.extend(self.walk(member));
            }
        }
        let doomed_set: HashSet<ComponentId> = doomed.iter().copied().collect();

        if let Some(anchor) = self
            .anchors
            .iter()
            .find(|a| doomed_set.contains(&a.reference) && !doomed_set.contains(&a.component))
        {
            return Err(GraphError::DanglingReference {
                target: self.components[anchor.reference].name.clone(),
                holder: self.components[anchor.component].name.clone(),
            });
        }

        if let Some(parent) = target.parent {
            if let Some(p) = self.components.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }
        self.anchors.retain(|a| !doomed_set.contains(&a.component));
        self.roots.retain(|r| !doomed_set.contains(r));
        for d in &doomed {
            self.components.remove(*d);
        }
        info!(count = doomed.len(), "components deleted");
        Ok(doomed)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(BuildContext::default())
    }
}
