use std::collections::BTreeMap;

use scene_graph::SceneGraph;

/// Part-number counts over every live component, sorted by part number.
pub fn bill_of_materials(graph: &SceneGraph) -> BTreeMap<String, usize> {
    let mut bom = BTreeMap::new();
    for id in graph.walk_all() {
        let Some(c) = graph.get(id) else { continue };
        for part in c.part_numbers() {
            *bom.entry(part).or_insert(0) += 1;
        }
    }
    bom
}
