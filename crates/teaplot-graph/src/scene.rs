//! Retained scenes read by the renderer every frame.
//!
//! Nodes are identified by a monotonically increasing [`NodeId`] and carry a
//! revision that bumps on every geometry change, so the renderer uploads
//! vertex data only when it differs from what the GPU already holds.
//! Plot uniforms are not part of the revision; they are rewritten each frame.

use std::collections::BTreeMap;
use std::fmt;

use teaplot_render::{LineInstance, MeshVertex, PlotInstance, PlotUniform, SpriteLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Line segments. Translucent sets are drawn without depth writes.
    Lines {
        segments: Vec<LineInstance>,
        translucent: bool,
    },
    PointCloud {
        instances: Vec<PlotInstance>,
        uniform: PlotUniform,
    },
    /// A translucent triangle mesh.
    Mesh(Vec<MeshVertex>),
    Sprites(Vec<SpriteLabel>),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Lines { .. } => "lines",
            NodeKind::PointCloud { .. } => "point cloud",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::Sprites(_) => "sprites",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    revision: u64,
    visible: bool,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn into_kind(self) -> NodeKind {
        self.kind
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
    next_revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let revision = self.bump();
        tracing::trace!("Adding {} node {}", kind.name(), id);
        self.nodes.insert(
            id,
            Node {
                kind,
                revision,
                visible: true,
            },
        );
        id
    }

    /// Remove a node. Removing an absent node is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    /// Remove `id` if it is `Some`, leaving `None` behind.
    pub fn remove_slot(&mut self, id: &mut Option<NodeId>) -> Option<Node> {
        id.take().and_then(|id| self.remove(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Replace a node's geometry and bump its revision.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) -> bool {
        let revision = self.bump();
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.kind = kind;
                node.revision = revision;
                true
            }
            None => false,
        }
    }

    /// Replace the node in `slot`, or add one when the slot is empty or
    /// stale.
    pub fn upsert(&mut self, slot: &mut Option<NodeId>, kind: NodeKind) -> NodeId {
        if let Some(id) = *slot {
            if self.contains(id) {
                self.replace(id, kind);
                return id;
            }
        }
        let id = self.add(kind);
        *slot = Some(id);
        id
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Mutable access to a point cloud's uniform without bumping the
    /// revision.
    pub fn plot_uniform_mut(&mut self, id: NodeId) -> Option<&mut PlotUniform> {
        match self.nodes.get_mut(&id).map(|node| &mut node.kind) {
            Some(NodeKind::PointCloud { uniform, .. }) => Some(uniform),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total sprites across every sprite node.
    pub fn sprite_count(&self) -> usize {
        self.nodes
            .values()
            .map(|node| match &node.kind {
                NodeKind::Sprites(sprites) => sprites.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// The 3D scene and the sprite overlay drawn after a depth clear.
#[derive(Debug, Default)]
pub struct Scenes {
    pub main: Scene,
    pub sprites: Scene,
}

impl Scenes {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mutable view of both scenes plus the projection the geometry is built
/// for. Graphs and plots write their nodes through this.
pub struct SceneContext<'a> {
    pub main: &'a mut Scene,
    pub sprites: &'a mut Scene,
    pub perspective: bool,
}

impl<'a> SceneContext<'a> {
    pub fn new(scenes: &'a mut Scenes, perspective: bool) -> Self {
        Self {
            main: &mut scenes.main,
            sprites: &mut scenes.sprites,
            perspective,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use teaplot_render::Color;

    fn lines() -> NodeKind {
        NodeKind::Lines {
            segments: vec![LineInstance::new(Vec3::ZERO, Vec3::X, 1.0, Color::BLACK)],
            translucent: false,
        }
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut scene = Scene::new();
        let a = scene.add(lines());
        let b = scene.add(lines());
        scene.remove(a);
        let c = scene.add(lines());
        assert!(a < b && b < c);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_replace_bumps_revision() {
        let mut scene = Scene::new();
        let id = scene.add(lines());
        let before = scene.get(id).unwrap().revision();
        assert!(scene.replace(id, NodeKind::Mesh(Vec::new())));
        assert!(scene.get(id).unwrap().revision() > before);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut scene = Scene::new();
        let id = scene.add(lines());
        assert!(scene.remove(id).is_some());
        assert!(scene.remove(id).is_none());

        let mut slot = None;
        assert!(scene.remove_slot(&mut slot).is_none());
    }

    #[test]
    fn test_upsert_reuses_slot() {
        let mut scene = Scene::new();
        let mut slot = None;
        let first = scene.upsert(&mut slot, lines());
        let second = scene.upsert(&mut slot, NodeKind::Sprites(Vec::new()));
        assert_eq!(first, second);
        assert_eq!(scene.len(), 1);

        scene.remove(first);
        let third = scene.upsert(&mut slot, lines());
        assert_ne!(third, first);
        assert_eq!(slot, Some(third));
    }

    #[test]
    fn test_sprite_count() {
        let mut scene = Scene::new();
        scene.add(NodeKind::Sprites(vec![
            SpriteLabel::new("a", 45.0, Vec3::ZERO),
            SpriteLabel::new("b", 45.0, Vec3::ZERO),
        ]));
        scene.add(lines());
        assert_eq!(scene.sprite_count(), 2);
    }
}
