use crate::object::{
    call_method, class_of, field, field_array, field_object, field_str, ObjectRef, Value,
};
use crate::page::PageHost;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// The two supported engine generations. Everything version-dependent in the
/// inspector branches on this, never on type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFamily {
    V2,
    V3,
}

/// A detected engine: discovery root plus resolved version. Handles are cheap
/// and rediscovered on every call path; the engine may appear or vanish between
/// polls.
#[derive(Clone)]
pub struct EngineHandle {
    pub root: ObjectRef,
    pub version: String,
    pub family: VersionFamily,
}

/// One entry of an engine enum table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOption {
    pub name: String,
    pub value: f64,
}

const LAYER_FALLBACK: &[(&str, f64)] = &[
    ("NONE", 0.0),
    ("IGNORE_RAYCAST", (1u32 << 20) as f64),
    ("GIZMOS", (1u32 << 21) as f64),
    ("EDITOR", (1u32 << 22) as f64),
    ("UI_3D", (1u32 << 23) as f64),
    ("SCENE_GIZMO", (1u32 << 24) as f64),
    ("UI_2D", (1u32 << 25) as f64),
    ("PROFILER", (1u32 << 28) as f64),
    ("DEFAULT", (1u32 << 30) as f64),
    ("ALL", u32::MAX as f64),
];

const SPRITE_TYPE_FALLBACK: &[(&str, f64)] =
    &[("SIMPLE", 0.0), ("SLICED", 1.0), ("TILED", 2.0), ("FILLED", 3.0)];

const SPRITE_SIZE_MODE_FALLBACK: &[(&str, f64)] = &[("CUSTOM", 0.0), ("TRIMMED", 1.0), ("RAW", 2.0)];

const SPRITE_FILL_TYPE_FALLBACK: &[(&str, f64)] =
    &[("HORIZONTAL", 0.0), ("VERTICAL", 1.0), ("RADIAL", 2.0)];

const LABEL_H_ALIGN_FALLBACK: &[(&str, f64)] = &[("LEFT", 0.0), ("CENTER", 1.0), ("RIGHT", 2.0)];

const LABEL_V_ALIGN_FALLBACK: &[(&str, f64)] = &[("TOP", 0.0), ("CENTER", 1.0), ("BOTTOM", 2.0)];

const LABEL_OVERFLOW_FALLBACK: &[(&str, f64)] =
    &[("NONE", 0.0), ("CLAMP", 1.0), ("SHRINK", 2.0), ("RESIZE_HEIGHT", 3.0)];

/// Capability-probing access to whichever engine the page carries. Holds the
/// page seam; every other inspector component receives a shared adapter at
/// construction.
pub struct EngineAdapter {
    page: Rc<dyn PageHost>,
}

impl EngineAdapter {
    pub fn new(page: Rc<dyn PageHost>) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Rc<dyn PageHost> {
        &self.page
    }

    /// Probes the page globals for an engine root. The primary location is the
    /// lowercase namespace; the uppercase one only counts when it carries a
    /// running game.
    pub fn detect(&self) -> Option<EngineHandle> {
        let globals = self.page.globals();
        let root = field_object(&globals, "cc").or_else(|| {
            let upper = field_object(&globals, "CC")?;
            let game_present = match field(&upper, "game") {
                None | Some(Value::Null) | Some(Value::Bool(false)) => false,
                Some(_) => true,
            };
            game_present.then_some(upper)
        })?;
        let version = field_str(&root, "ENGINE_VERSION")
            .or_else(|| field_str(&root, "version"))
            .unwrap_or_else(|| "unknown".to_string());
        let family = if version.starts_with("3.") || version.starts_with("4.") {
            VersionFamily::V3
        } else {
            VersionFamily::V2
        };
        Some(EngineHandle { root, version, family })
    }

    /// Active scene root. Newer engines expose an accessor method, older ones a
    /// private field; an accessor that yields nothing wins over the field.
    pub fn current_scene(&self, handle: &EngineHandle) -> Option<ObjectRef> {
        let director = field_object(&handle.root, "director")?;
        if director.borrow().has_method("getScene") {
            call_method(&director, "getScene", &[]).and_then(|v| v.as_object().cloned())
        } else {
            field_object(&director, "_scene")
        }
    }

    /// Detects the engine and resolves a node by uuid in one step.
    pub fn locate_node(&self, uuid: &str) -> Option<(EngineHandle, ObjectRef)> {
        let handle = self.detect()?;
        let scene = self.current_scene(&handle)?;
        let node = find_by_uuid(&scene, uuid)?;
        Some((handle, node))
    }

    pub fn layer_options(&self, handle: &EngineHandle) -> Vec<EnumOption> {
        self.enum_options(handle, &[&["Layers", "Enum"], &["Layers", "BitMask"], &["Layers"]], LAYER_FALLBACK)
    }

    pub fn sprite_type_options(&self, handle: &EngineHandle) -> Vec<EnumOption> {
        self.enum_options(handle, &[&["Sprite", "Type"]], SPRITE_TYPE_FALLBACK)
    }

    pub fn sprite_size_mode_options(&self, handle: &EngineHandle) -> Vec<EnumOption> {
        self.enum_options(handle, &[&["Sprite", "SizeMode"]], SPRITE_SIZE_MODE_FALLBACK)
    }

    pub fn sprite_fill_type_options(&self, handle: &EngineHandle) -> Vec<EnumOption> {
        self.enum_options(handle, &[&["Sprite", "FillType"]], SPRITE_FILL_TYPE_FALLBACK)
    }

    pub fn label_horizontal_align_options(&self, handle: &EngineHandle) -> Vec<EnumOption> {
        self.enum_options(handle, &[&["Label", "HorizontalAlign"]], LABEL_H_ALIGN_FALLBACK)
    }

    pub fn label_vertical_align_options(&self, handle: &EngineHandle) -> Vec<EnumOption> {
        self.enum_options(handle, &[&["Label", "VerticalAlign"]], LABEL_V_ALIGN_FALLBACK)
    }

    pub fn label_overflow_options(&self, handle: &EngineHandle) -> Vec<EnumOption> {
        self.enum_options(handle, &[&["Label", "Overflow"]], LABEL_OVERFLOW_FALLBACK)
    }

    /// Collects a live enum table from the first probe path that holds one,
    /// sorted by numeric value. Falls back to the documented table so callers
    /// always get a non-empty, deterministically ordered list.
    fn enum_options(
        &self,
        handle: &EngineHandle,
        probes: &[&[&str]],
        fallback: &[(&str, f64)],
    ) -> Vec<EnumOption> {
        for path in probes {
            let Some(table) = resolve_object_path(&handle.root, path) else { continue };
            let mut options: Vec<EnumOption> = Vec::new();
            for key in table.borrow().keys() {
                if let Some(value) = table.borrow().get(&key).and_then(|v| v.as_f64()) {
                    options.push(EnumOption { name: key, value });
                }
            }
            if !options.is_empty() {
                options.sort_by(|a, b| a.value.total_cmp(&b.value));
                return options;
            }
        }
        fallback.iter().map(|(name, value)| EnumOption { name: name.to_string(), value: *value }).collect()
    }
}

fn resolve_object_path(root: &ObjectRef, path: &[&str]) -> Option<ObjectRef> {
    let mut current = root.clone();
    for hop in path {
        current = field_object(&current, hop)?;
    }
    Some(current)
}

/// Uuid of a node, preferring the public field over the legacy private one.
pub fn node_uuid(node: &ObjectRef) -> Option<String> {
    field_str(node, "uuid")
        .filter(|s| !s.is_empty())
        .or_else(|| field_str(node, "_id").filter(|s| !s.is_empty()))
}

/// Child nodes in declared order. Non-object entries are skipped.
pub fn node_children(node: &ObjectRef) -> Vec<ObjectRef> {
    let Some(children) = field_array(node, "children").or_else(|| field_array(node, "_children")) else {
        return Vec::new();
    };
    let children = children.borrow();
    children.iter().filter_map(|child| child.as_object().cloned()).collect()
}

/// Depth-first uuid lookup, first match wins. Duplicate uuids are a source-data
/// defect the inspector does not try to repair.
pub fn find_by_uuid(node: &ObjectRef, uuid: &str) -> Option<ObjectRef> {
    if node_uuid(node).as_deref() == Some(uuid) {
        return Some(node.clone());
    }
    for child in node_children(node) {
        if let Some(found) = find_by_uuid(&child, uuid) {
            return Some(found);
        }
    }
    None
}

/// The node itself plus all descendants.
pub fn count_nodes(node: &ObjectRef) -> usize {
    1 + node_children(node).iter().map(count_nodes).sum::<usize>()
}

/// Attached components in attachment order.
pub fn components_of(node: &ObjectRef) -> Vec<ObjectRef> {
    let Some(components) =
        field_array(node, "components").or_else(|| field_array(node, "_components"))
    else {
        return Vec::new();
    };
    let components = components.borrow();
    components.iter().filter_map(|comp| comp.as_object().cloned()).collect()
}

/// Display name of a component: serialized class tag, then runtime class name,
/// then empty.
pub fn component_display_name(comp: &ObjectRef) -> String {
    field_str(comp, "__classname__")
        .filter(|s| !s.is_empty())
        .or_else(|| class_of(comp))
        .unwrap_or_default()
}

/// First component whose display name contains the given fragment.
pub fn find_component(node: &ObjectRef, type_name: &str) -> Option<ObjectRef> {
    components_of(node).into_iter().find(|comp| component_display_name(comp).contains(type_name))
}
