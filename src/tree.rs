use crate::adapter::{
    components_of, component_display_name, node_children, node_uuid, EngineAdapter,
};
use crate::object::{field_object, field_str, field_bool, ObjectRef};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uuid::Uuid;

/// Closed classification of a node by its attached components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Button,
    Label,
    Sprite,
    Editbox,
    Scrollview,
    Pageview,
    Toggle,
    Progressbar,
    Slider,
    Layout,
    Widget,
    Mask,
    Particle,
    Tilemap,
    Spine,
    Dragonbones,
    Graphics,
    Audio,
    Camera,
    Light,
    Animation,
    Canvas,
    Node,
}

/// One node of the serializable scene projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTreeEntry {
    pub uuid: String,
    pub name: String,
    pub active: bool,
    pub node_type: NodeType,
    pub children: Vec<NodeTreeEntry>,
}

/// One sprite-bearing node, as listed for the texture picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteNodeEntry {
    pub uuid: String,
    pub name: String,
    pub sprite_frame: String,
}

// Priority ladder: earlier rules win over later ones no matter which component
// position matched.
const CLASSIFY_RULES: &[(&[&str], NodeType)] = &[
    (&["Button"], NodeType::Button),
    (&["Label", "RichText"], NodeType::Label),
    (&["Sprite"], NodeType::Sprite),
    (&["EditBox"], NodeType::Editbox),
    (&["ScrollView"], NodeType::Scrollview),
    (&["PageView"], NodeType::Pageview),
    (&["Toggle"], NodeType::Toggle),
    (&["ProgressBar"], NodeType::Progressbar),
    (&["Slider"], NodeType::Slider),
    (&["Layout"], NodeType::Layout),
    (&["Widget"], NodeType::Widget),
    (&["Mask"], NodeType::Mask),
    (&["ParticleSystem"], NodeType::Particle),
    (&["TiledMap"], NodeType::Tilemap),
    (&["Spine", "sp.Skeleton"], NodeType::Spine),
    (&["DragonBones"], NodeType::Dragonbones),
    (&["Graphics"], NodeType::Graphics),
    (&["AudioSource"], NodeType::Audio),
    (&["Camera"], NodeType::Camera),
    (&["Light"], NodeType::Light),
    (&["Animation"], NodeType::Animation),
    (&["Canvas"], NodeType::Canvas),
];

/// Classifies a single class/display name against the ladder.
pub fn classify_name(name: &str) -> Option<NodeType> {
    for (fragments, node_type) in CLASSIFY_RULES {
        if fragments.iter().any(|fragment| name.contains(fragment)) {
            return Some(*node_type);
        }
    }
    None
}

/// Classifies a node by its components. The highest-priority rule matching any
/// component wins; a node without matching components is a plain `node`.
pub fn classify_node(node: &ObjectRef) -> NodeType {
    let names: Vec<String> = components_of(node).iter().map(component_display_name).collect();
    for (fragments, node_type) in CLASSIFY_RULES {
        for name in &names {
            if fragments.iter().any(|fragment| name.contains(fragment)) {
                return *node_type;
            }
        }
    }
    NodeType::Node
}

/// True when the object looks like a scene node rather than a component or
/// asset.
pub fn is_node_like(obj: &ObjectRef) -> bool {
    let obj = obj.borrow();
    obj.has("children") || obj.has("_children") || obj.has("components") || obj.has("_components")
}

/// Projects a node into a serializable entry. Total over any object: a missing
/// uuid gets a random placeholder, a missing name becomes "unnamed", and only an
/// explicit false counts as inactive.
pub fn build_tree(node: &ObjectRef) -> NodeTreeEntry {
    let uuid = node_uuid(node).unwrap_or_else(|| Uuid::new_v4().to_string());
    let name = field_str(node, "name").filter(|s| !s.is_empty()).unwrap_or_else(|| "unnamed".to_string());
    let active = field_bool(node, "active") != Some(false)
        && field_bool(node, "activeInHierarchy") != Some(false);
    let children = node_children(node).iter().map(build_tree).collect();
    NodeTreeEntry { uuid, name, active, node_type: classify_node(node), children }
}

/// Pre-order scan for sprite-bearing nodes, preserving declaration order.
pub fn find_sprite_nodes(node: &ObjectRef) -> Vec<SpriteNodeEntry> {
    let mut result = Vec::new();
    collect_sprite_nodes(node, &mut result);
    result
}

fn collect_sprite_nodes(node: &ObjectRef, result: &mut Vec<SpriteNodeEntry>) {
    if let Some(sprite) = crate::adapter::find_component(node, "Sprite") {
        let sprite_frame = field_object(&sprite, "spriteFrame")
            .and_then(|frame| {
                field_str(&frame, "name")
                    .filter(|s| !s.is_empty())
                    .or_else(|| field_str(&frame, "_name").filter(|s| !s.is_empty()))
            })
            .unwrap_or_default();
        result.push(SpriteNodeEntry {
            uuid: node_uuid(node).unwrap_or_default(),
            name: field_str(node, "name")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "unnamed".to_string()),
            sprite_frame,
        });
    }
    for child in node_children(node) {
        collect_sprite_nodes(&child, result);
    }
}

/// Scene-tree projection bound to a live adapter.
pub struct TreeBuilder {
    adapter: Rc<EngineAdapter>,
}

impl TreeBuilder {
    pub fn new(adapter: Rc<EngineAdapter>) -> Self {
        Self { adapter }
    }

    /// Current scene as a single-root projection, or `None` while no engine or
    /// scene is up.
    pub fn scene_tree(&self) -> Option<NodeTreeEntry> {
        let handle = self.adapter.detect()?;
        let scene = self.adapter.current_scene(&handle)?;
        Some(build_tree(&scene))
    }

    /// All sprite-bearing nodes of the current scene in declaration order.
    pub fn sprite_nodes(&self) -> Vec<SpriteNodeEntry> {
        let Some(handle) = self.adapter.detect() else { return Vec::new() };
        let Some(scene) = self.adapter.current_scene(&handle) else { return Vec::new() };
        find_sprite_nodes(&scene)
    }
}
