use crate::adapter::{
    component_display_name, components_of, find_component, EngineAdapter, EngineHandle, EnumOption,
    VersionFamily,
};
use crate::object::{
    call_method, class_of, field, field_bool, field_f64, field_object, field_str, set_field,
    ObjectRef, Value,
};
use crate::tree::{classify_name, classify_node, is_node_like, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;

/// One group of the property projection: the node itself or one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyGroup {
    pub name: String,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub editable: bool,
    #[serde(flatten)]
    pub value: PropertyValue,
}

/// Closed value union of the projection. Everything the reflector cannot express
/// here is omitted rather than approximated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyValue {
    Number { value: f64 },
    String { value: String },
    Boolean { value: bool },
    Vec2 { x: f64, y: f64 },
    Vec3 { x: f64, y: f64, z: f64 },
    Size { width: f64, height: f64 },
    Color { r: f64, g: f64, b: f64, a: f64 },
    Enum { value: f64, options: Vec<EnumOption> },
    #[serde(rename_all = "camelCase")]
    NodeRef { uuid: Option<String>, node_type: NodeType, display: String },
}

/// Vector payload of a typed edit. `z` is absent for vec2 targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VecInput {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeInput {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorInput {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "ColorInput::default_alpha")]
    pub a: f64,
}

impl ColorInput {
    fn default_alpha() -> f64 {
        255.0
    }
}

impl Property {
    fn number(name: &str, value: f64) -> Self {
        Self { name: name.to_string(), editable: true, value: PropertyValue::Number { value } }
    }

    fn string(name: &str, value: String) -> Self {
        Self { name: name.to_string(), editable: true, value: PropertyValue::String { value } }
    }

    fn read_only_string(name: &str, value: String) -> Self {
        Self { name: name.to_string(), editable: false, value: PropertyValue::String { value } }
    }

    fn boolean(name: &str, value: bool) -> Self {
        Self { name: name.to_string(), editable: true, value: PropertyValue::Boolean { value } }
    }

    fn vec2(name: &str, obj: &ObjectRef) -> Self {
        let x = field_f64(obj, "x").unwrap_or(0.0);
        let y = field_f64(obj, "y").unwrap_or(0.0);
        Self { name: name.to_string(), editable: true, value: PropertyValue::Vec2 { x, y } }
    }

    fn vec3(name: &str, obj: &ObjectRef) -> Self {
        let x = field_f64(obj, "x").unwrap_or(0.0);
        let y = field_f64(obj, "y").unwrap_or(0.0);
        let z = field_f64(obj, "z").unwrap_or(0.0);
        Self { name: name.to_string(), editable: true, value: PropertyValue::Vec3 { x, y, z } }
    }

    fn size(name: &str, obj: &ObjectRef) -> Self {
        let width = field_f64(obj, "width").unwrap_or(0.0);
        let height = field_f64(obj, "height").unwrap_or(0.0);
        Self { name: name.to_string(), editable: true, value: PropertyValue::Size { width, height } }
    }

    fn color(name: &str, obj: &ObjectRef) -> Self {
        let r = field_f64(obj, "r").unwrap_or(0.0);
        let g = field_f64(obj, "g").unwrap_or(0.0);
        let b = field_f64(obj, "b").unwrap_or(0.0);
        let a = field_f64(obj, "a").unwrap_or(255.0);
        Self { name: name.to_string(), editable: true, value: PropertyValue::Color { r, g, b, a } }
    }

    fn enumerated(name: &str, value: f64, options: Vec<EnumOption>) -> Self {
        Self { name: name.to_string(), editable: true, value: PropertyValue::Enum { value, options } }
    }

    fn node_ref(name: &str, target: &ObjectRef) -> Self {
        let (uuid, node_type) = if is_node_like(target) {
            (crate::adapter::node_uuid(target), classify_node(target))
        } else {
            let display = component_display_name(target);
            (crate::adapter::node_uuid(target), classify_name(&display).unwrap_or(NodeType::Node))
        };
        let display = field_str(target, "name")
            .filter(|s| !s.is_empty())
            .or_else(|| field_str(target, "_name").filter(|s| !s.is_empty()))
            .or_else(|| class_of(target))
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            editable: false,
            value: PropertyValue::NodeRef { uuid, node_type, display },
        }
    }
}

// Keys the generic scan never surfaces: back-references and identities the
// fixed phases own.
const RESERVED_KEYS: &[&str] = &["node", "children", "parent", "components", "enabled", "uuid"];

/// Bidirectional property access for one node at a time. Extraction is
/// per-property fault tolerant; writes on unresolvable targets are silent
/// no-ops.
pub struct PropertyReflector {
    adapter: Rc<EngineAdapter>,
}

impl PropertyReflector {
    pub fn new(adapter: Rc<EngineAdapter>) -> Self {
        Self { adapter }
    }

    /// Property groups for a node by uuid, or `None` while the engine, scene or
    /// node is missing.
    pub fn props_for(&self, uuid: &str) -> Option<Vec<PropertyGroup>> {
        let (handle, node) = self.adapter.locate_node(uuid)?;
        Some(self.get_props(&handle, &node))
    }

    pub fn get_props(&self, handle: &EngineHandle, node: &ObjectRef) -> Vec<PropertyGroup> {
        // The node group is always present; only component groups are dropped
        // when empty.
        let mut groups = vec![self.node_group(handle, node)];
        for comp in components_of(node) {
            if let Some(group) = self.component_group(handle, &comp) {
                groups.push(group);
            }
        }
        groups
    }

    fn node_group(&self, handle: &EngineHandle, node: &ObjectRef) -> PropertyGroup {
        let mut props = Vec::new();
        let mut emitted: HashSet<String> = HashSet::new();

        if let Some(name) = field_str(node, "name") {
            props.push(Property::string("name", name));
            emitted.insert("name".into());
        }
        if let Some(active) = field_bool(node, "active") {
            props.push(Property::boolean("active", active));
            emitted.insert("active".into());
        }

        if let Some(position) = field_object(node, "position") {
            props.push(Property::vec3("position", &position));
            emitted.insert("position".into());
        } else {
            for axis in ["x", "y", "z"] {
                if let Some(value) = field_f64(node, axis) {
                    props.push(Property::number(axis, value));
                    emitted.insert(axis.into());
                }
            }
        }

        if let Some(angle) = field_f64(node, "angle") {
            props.push(Property::number("angle", angle));
            emitted.insert("angle".into());
        }
        if let Some(euler) = field_object(node, "eulerAngles") {
            props.push(Property::vec3("eulerAngles", &euler));
            emitted.insert("eulerAngles".into());
        }

        if let Some(scale) = field_object(node, "scale") {
            props.push(Property::vec3("scale", &scale));
            emitted.insert("scale".into());
        } else {
            for axis in ["scaleX", "scaleY", "scaleZ"] {
                if let Some(value) = field_f64(node, axis) {
                    props.push(Property::number(axis, value));
                    emitted.insert(axis.into());
                }
            }
        }

        self.node_anchor(handle, node, &mut props, &mut emitted);
        self.node_size(handle, node, &mut props, &mut emitted);

        if let Some(opacity) = field_f64(node, "opacity") {
            props.push(Property::number("opacity", opacity));
            emitted.insert("opacity".into());
        }
        if let Some(color) = field_object(node, "color") {
            props.push(Property::color("color", &color));
            emitted.insert("color".into());
        }
        if let Some(z_index) = field_f64(node, "zIndex") {
            props.push(Property::number("zIndex", z_index));
            emitted.insert("zIndex".into());
        }
        if let Some(layer) = field_f64(node, "layer") {
            props.push(Property::enumerated("layer", layer, self.adapter.layer_options(handle)));
            emitted.insert("layer".into());
        }
        if let Some(uuid) = crate::adapter::node_uuid(node) {
            props.push(Property::read_only_string("uuid", uuid));
        }

        self.generic_scan(node, &mut props, &mut emitted);
        PropertyGroup { name: "Node".to_string(), properties: props }
    }

    /// Anchor lives on a transform sub-component in the newer family and inline
    /// on the node in the older one.
    fn node_anchor(
        &self,
        handle: &EngineHandle,
        node: &ObjectRef,
        props: &mut Vec<Property>,
        emitted: &mut HashSet<String>,
    ) {
        if handle.family == VersionFamily::V3 {
            if let Some(anchor) =
                find_component(node, "UITransform").and_then(|ui| field_object(&ui, "anchorPoint"))
            {
                props.push(Property::vec2("anchor", &anchor));
                emitted.insert("anchor".into());
                return;
            }
        }
        let node_ref = node.borrow();
        if node_ref.has("anchorX") || node_ref.has("anchorY") {
            drop(node_ref);
            let x = field_f64(node, "anchorX").unwrap_or(0.0);
            let y = field_f64(node, "anchorY").unwrap_or(0.0);
            props.push(Property {
                name: "anchor".to_string(),
                editable: true,
                value: PropertyValue::Vec2 { x, y },
            });
            emitted.insert("anchor".into());
            emitted.insert("anchorX".into());
            emitted.insert("anchorY".into());
        }
    }

    fn node_size(
        &self,
        handle: &EngineHandle,
        node: &ObjectRef,
        props: &mut Vec<Property>,
        emitted: &mut HashSet<String>,
    ) {
        if handle.family == VersionFamily::V3 {
            if let Some(size) =
                find_component(node, "UITransform").and_then(|ui| field_object(&ui, "contentSize"))
            {
                props.push(Property::size("contentSize", &size));
                emitted.insert("contentSize".into());
                return;
            }
        }
        if let Some(size) = field_object(node, "contentSize") {
            props.push(Property::size("contentSize", &size));
            emitted.insert("contentSize".into());
            return;
        }
        let node_ref = node.borrow();
        if node_ref.has("width") || node_ref.has("height") {
            drop(node_ref);
            let width = field_f64(node, "width").unwrap_or(0.0);
            let height = field_f64(node, "height").unwrap_or(0.0);
            props.push(Property {
                name: "size".to_string(),
                editable: true,
                value: PropertyValue::Size { width, height },
            });
            emitted.insert("size".into());
            emitted.insert("width".into());
            emitted.insert("height".into());
        }
    }

    fn component_group(&self, handle: &EngineHandle, comp: &ObjectRef) -> Option<PropertyGroup> {
        let raw_name = component_display_name(comp);
        let name = if raw_name.is_empty() { "Component".to_string() } else { raw_name };
        let mut props = Vec::new();
        let mut emitted: HashSet<String> = HashSet::new();

        if let Some(enabled) = field_bool(comp, "enabled") {
            props.push(Property::boolean("enabled", enabled));
        }

        if name.contains("Sprite") {
            self.sprite_props(handle, comp, &mut props, &mut emitted);
        } else if name.contains("Label") {
            self.label_props(handle, comp, &mut props, &mut emitted);
        } else if name.contains("Button") {
            button_props(comp, &mut props, &mut emitted);
        } else if name.contains("UITransform") {
            ui_transform_props(comp, &mut props, &mut emitted);
        } else if name.contains("Widget") {
            widget_props(comp, &mut props, &mut emitted);
        } else if name.contains("ProgressBar") {
            progress_bar_props(comp, &mut props, &mut emitted);
        } else if name.contains("Toggle") {
            toggle_props(comp, &mut props, &mut emitted);
        }

        self.generic_scan(comp, &mut props, &mut emitted);

        if let Some(uuid) = field_str(comp, "uuid").filter(|s| !s.is_empty()) {
            props.push(Property::read_only_string("uuid", uuid));
        }

        (!props.is_empty()).then_some(PropertyGroup { name, properties: props })
    }

    fn sprite_props(
        &self,
        handle: &EngineHandle,
        comp: &ObjectRef,
        props: &mut Vec<Property>,
        emitted: &mut HashSet<String>,
    ) {
        if let Some(frame) = field_object(comp, "spriteFrame") {
            let frame_name = field_str(&frame, "name")
                .filter(|s| !s.is_empty())
                .or_else(|| field_str(&frame, "_name").filter(|s| !s.is_empty()))
                .unwrap_or_else(|| "SpriteFrame".to_string());
            props.push(Property::read_only_string("spriteFrame", frame_name));
            emitted.insert("spriteFrame".into());
        }
        if let Some(value) = field_f64(comp, "type") {
            props.push(Property::enumerated("type", value, self.adapter.sprite_type_options(handle)));
            emitted.insert("type".into());
        }
        if let Some(value) = field_f64(comp, "sizeMode") {
            props.push(Property::enumerated(
                "sizeMode",
                value,
                self.adapter.sprite_size_mode_options(handle),
            ));
            emitted.insert("sizeMode".into());
        }
        if let Some(value) = field_f64(comp, "fillType") {
            props.push(Property::enumerated(
                "fillType",
                value,
                self.adapter.sprite_fill_type_options(handle),
            ));
            emitted.insert("fillType".into());
        }
        push_number(comp, "fillStart", props, emitted);
        push_number(comp, "fillRange", props, emitted);
        push_vec2(comp, "fillCenter", props, emitted);
        push_bool(comp, "trim", props, emitted);
        push_bool(comp, "grayscale", props, emitted);
        push_color(comp, "color", props, emitted);
    }

    fn label_props(
        &self,
        handle: &EngineHandle,
        comp: &ObjectRef,
        props: &mut Vec<Property>,
        emitted: &mut HashSet<String>,
    ) {
        push_string(comp, "string", props, emitted);
        push_number(comp, "fontSize", props, emitted);
        push_number(comp, "lineHeight", props, emitted);
        if let Some(value) = field_f64(comp, "horizontalAlign") {
            props.push(Property::enumerated(
                "horizontalAlign",
                value,
                self.adapter.label_horizontal_align_options(handle),
            ));
            emitted.insert("horizontalAlign".into());
        }
        if let Some(value) = field_f64(comp, "verticalAlign") {
            props.push(Property::enumerated(
                "verticalAlign",
                value,
                self.adapter.label_vertical_align_options(handle),
            ));
            emitted.insert("verticalAlign".into());
        }
        if let Some(value) = field_f64(comp, "overflow") {
            props.push(Property::enumerated(
                "overflow",
                value,
                self.adapter.label_overflow_options(handle),
            ));
            emitted.insert("overflow".into());
        }
        push_bool(comp, "enableWrapText", props, emitted);
        push_number(comp, "spacingX", props, emitted);
        push_color(comp, "color", props, emitted);
        push_bool(comp, "isBold", props, emitted);
        push_bool(comp, "isItalic", props, emitted);
        push_bool(comp, "isUnderline", props, emitted);
        push_number(comp, "cacheMode", props, emitted);
    }

    /// Shape-classified scan over whatever the fixed phases left behind.
    fn generic_scan(&self, obj: &ObjectRef, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
        for key in obj.borrow().keys() {
            if key.starts_with('_')
                || RESERVED_KEYS.contains(&key.as_str())
                || emitted.contains(&key)
            {
                continue;
            }
            let Some(value) = field(obj, &key) else { continue };
            let prop = match value {
                Value::Null => Some(Property::read_only_string(&key, "null".to_string())),
                Value::Number(n) => Some(Property::number(&key, n)),
                Value::Str(s) => Some(Property::string(&key, s)),
                Value::Bool(b) => Some(Property::boolean(&key, b)),
                Value::Object(inner) => classify_object(&key, &inner),
                Value::Array(_) | Value::Bytes(_) => None,
            };
            if let Some(prop) = prop {
                props.push(prop);
                emitted.insert(key);
            }
        }
    }

    pub fn set_prop(&self, uuid: &str, comp: &str, prop: &str, raw: &str) {
        let Some((_, node)) = self.adapter.locate_node(uuid) else { return };
        let Some(target) = resolve_target(&node, comp) else { return };
        set_field(&target, prop, coerce_scalar(raw));
    }

    pub fn set_vec(&self, uuid: &str, comp: &str, prop: &str, value: VecInput) {
        let Some((handle, node)) = self.adapter.locate_node(uuid) else { return };
        let Some(target) = resolve_target(&node, comp) else { return };
        if let Some(sub) = field_object(&target, prop) {
            set_field(&sub, "x", value.x);
            set_field(&sub, "y", value.y);
            if let Some(z) = value.z {
                set_field(&sub, "z", z);
            }
            return;
        }
        match prop {
            "position" if target.borrow().has_method("setPosition") => {
                let args = [
                    Value::Number(value.x),
                    Value::Number(value.y),
                    Value::Number(value.z.unwrap_or(0.0)),
                ];
                call_method(&target, "setPosition", &args);
            }
            "scale" if target.borrow().has_method("setScale") => {
                let args = [
                    Value::Number(value.x),
                    Value::Number(value.y),
                    Value::Number(value.z.unwrap_or(1.0)),
                ];
                call_method(&target, "setScale", &args);
            }
            "anchor" => {
                if handle.family == VersionFamily::V3 {
                    if let Some(anchor) = find_component(&node, "UITransform")
                        .and_then(|ui| field_object(&ui, "anchorPoint"))
                    {
                        set_field(&anchor, "x", value.x);
                        set_field(&anchor, "y", value.y);
                        return;
                    }
                }
                set_field(&target, "anchorX", value.x);
                set_field(&target, "anchorY", value.y);
            }
            _ => {}
        }
    }

    pub fn set_size(&self, uuid: &str, comp: &str, prop: &str, value: SizeInput) {
        let Some((handle, node)) = self.adapter.locate_node(uuid) else { return };
        let Some(target) = resolve_target(&node, comp) else { return };
        if let Some(sub) = field_object(&target, prop) {
            set_field(&sub, "width", value.width);
            set_field(&sub, "height", value.height);
            return;
        }
        if prop != "size" && prop != "contentSize" {
            return;
        }
        if target.borrow().has_method("setContentSize") {
            call_method(
                &target,
                "setContentSize",
                &[Value::Number(value.width), Value::Number(value.height)],
            );
            return;
        }
        if handle.family == VersionFamily::V3 {
            if let Some(size) =
                find_component(&node, "UITransform").and_then(|ui| field_object(&ui, "contentSize"))
            {
                set_field(&size, "width", value.width);
                set_field(&size, "height", value.height);
                return;
            }
        }
        set_field(&target, "width", value.width);
        set_field(&target, "height", value.height);
    }

    pub fn set_color(&self, uuid: &str, comp: &str, prop: &str, value: ColorInput) {
        let Some((_, node)) = self.adapter.locate_node(uuid) else { return };
        let Some(target) = resolve_target(&node, comp) else { return };
        let Some(sub) = field_object(&target, prop) else { return };
        set_field(&sub, "r", value.r);
        set_field(&sub, "g", value.g);
        set_field(&sub, "b", value.b);
        set_field(&sub, "a", value.a);
    }
}

fn button_props(comp: &ObjectRef, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    push_bool(comp, "interactable", props, emitted);
    push_number(comp, "transition", props, emitted);
    push_color(comp, "normalColor", props, emitted);
    push_color(comp, "pressedColor", props, emitted);
    push_color(comp, "hoverColor", props, emitted);
    push_color(comp, "disabledColor", props, emitted);
    push_number(comp, "duration", props, emitted);
    push_number(comp, "zoomScale", props, emitted);
}

fn ui_transform_props(comp: &ObjectRef, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    push_size(comp, "contentSize", props, emitted);
    push_vec2(comp, "anchorPoint", props, emitted);
    push_number(comp, "priority", props, emitted);
}

fn widget_props(comp: &ObjectRef, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    push_bool(comp, "isAlignTop", props, emitted);
    push_bool(comp, "isAlignBottom", props, emitted);
    push_bool(comp, "isAlignLeft", props, emitted);
    push_bool(comp, "isAlignRight", props, emitted);
    push_number(comp, "top", props, emitted);
    push_number(comp, "bottom", props, emitted);
    push_number(comp, "left", props, emitted);
    push_number(comp, "right", props, emitted);
    push_bool(comp, "isAlignHorizontalCenter", props, emitted);
    push_bool(comp, "isAlignVerticalCenter", props, emitted);
}

fn progress_bar_props(comp: &ObjectRef, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    push_number(comp, "progress", props, emitted);
    push_number(comp, "mode", props, emitted);
    push_number(comp, "totalLength", props, emitted);
    push_bool(comp, "reverse", props, emitted);
}

fn toggle_props(comp: &ObjectRef, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    push_bool(comp, "isChecked", props, emitted);
    push_bool(comp, "interactable", props, emitted);
}

fn push_number(obj: &ObjectRef, key: &str, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    if let Some(value) = field_f64(obj, key) {
        props.push(Property::number(key, value));
        emitted.insert(key.to_string());
    }
}

fn push_string(obj: &ObjectRef, key: &str, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    if let Some(value) = field_str(obj, key) {
        props.push(Property::string(key, value));
        emitted.insert(key.to_string());
    }
}

fn push_bool(obj: &ObjectRef, key: &str, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    if let Some(value) = field_bool(obj, key) {
        props.push(Property::boolean(key, value));
        emitted.insert(key.to_string());
    }
}

fn push_vec2(obj: &ObjectRef, key: &str, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    if let Some(sub) = field_object(obj, key) {
        props.push(Property::vec2(key, &sub));
        emitted.insert(key.to_string());
    }
}

fn push_size(obj: &ObjectRef, key: &str, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    if let Some(sub) = field_object(obj, key) {
        props.push(Property::size(key, &sub));
        emitted.insert(key.to_string());
    }
}

fn push_color(obj: &ObjectRef, key: &str, props: &mut Vec<Property>, emitted: &mut HashSet<String>) {
    if let Some(sub) = field_object(obj, key) {
        props.push(Property::color(key, &sub));
        emitted.insert(key.to_string());
    }
}

/// Shape rules for unknown object values, most specific first. Unclassifiable
/// objects are omitted.
fn classify_object(key: &str, inner: &ObjectRef) -> Option<Property> {
    let shape = inner.borrow();
    let color_like = shape.class_name() == Some("Color")
        || (shape.has("r") && shape.has("g") && shape.has("b"));
    if color_like {
        drop(shape);
        return Some(Property::color(key, inner));
    }
    if shape.has("x") && shape.has("y") && shape.has("z") {
        drop(shape);
        return Some(Property::vec3(key, inner));
    }
    if shape.has("x") && shape.has("y") {
        drop(shape);
        return Some(Property::vec2(key, inner));
    }
    if shape.has("width") && shape.has("height") {
        drop(shape);
        return Some(Property::size(key, inner));
    }
    let referent = shape.has("uuid") || shape.has("_id") || shape.class_name().is_some();
    drop(shape);
    if is_node_like(inner) || referent {
        return Some(Property::node_ref(key, inner));
    }
    None
}

fn resolve_target(node: &ObjectRef, comp: &str) -> Option<ObjectRef> {
    if comp == "Node" {
        Some(node.clone())
    } else {
        find_component(node, comp)
    }
}

/// Edit coercion: boolean words, then numbers, then the raw string.
fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Str(raw.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{new_object, object_with_class, set_field};
    use crate::page::PageHost;

    struct BareHost {
        globals: ObjectRef,
    }

    impl PageHost for BareHost {
        fn globals(&self) -> ObjectRef {
            self.globals.clone()
        }
    }

    fn reflector_with_scene(version: &str, scene: ObjectRef) -> PropertyReflector {
        let director = new_object();
        set_field(&director, "_scene", scene);
        let root = new_object();
        set_field(&root, "ENGINE_VERSION", version);
        set_field(&root, "director", director);
        let globals = new_object();
        set_field(&globals, "cc", root);
        let adapter = Rc::new(EngineAdapter::new(Rc::new(BareHost { globals })));
        PropertyReflector::new(adapter)
    }

    fn handle_of(reflector: &PropertyReflector) -> EngineHandle {
        reflector.adapter.detect().expect("engine detected")
    }

    fn vec3_object(x: f64, y: f64, z: f64) -> ObjectRef {
        let v = new_object();
        set_field(&v, "x", x);
        set_field(&v, "y", y);
        set_field(&v, "z", z);
        v
    }

    fn find<'a>(group: &'a PropertyGroup, name: &str) -> &'a Property {
        group
            .properties
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("property {name} missing from {:?}", group.name))
    }

    #[test]
    fn coercion_covers_booleans_numbers_and_strings() {
        assert_eq!(coerce_scalar("true"), Value::Bool(true));
        assert_eq!(coerce_scalar("false"), Value::Bool(false));
        assert_eq!(coerce_scalar("3.5"), Value::Number(3.5));
        assert_eq!(coerce_scalar("-12"), Value::Number(-12.0));
        assert_eq!(coerce_scalar("hello"), Value::Str("hello".to_string()));
        assert_eq!(coerce_scalar(""), Value::Str(String::new()));
    }

    #[test]
    fn legacy_node_uses_inline_fields() {
        let node = new_object();
        set_field(&node, "uuid", "n1");
        set_field(&node, "name", "player");
        set_field(&node, "x", 10.0);
        set_field(&node, "y", 20.0);
        set_field(&node, "anchorX", 0.5);
        set_field(&node, "width", 64.0);
        set_field(&node, "height", 32.0);
        let scene = new_object();
        set_field(&scene, "uuid", "scene");
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let reflector = reflector_with_scene("2.4.13", scene);
        let handle = handle_of(&reflector);

        let groups = reflector.get_props(&handle, &node);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.name, "Node");
        assert_eq!(find(group, "x").value, PropertyValue::Number { value: 10.0 });
        assert_eq!(find(group, "anchor").value, PropertyValue::Vec2 { x: 0.5, y: 0.0 });
        assert_eq!(find(group, "size").value, PropertyValue::Size { width: 64.0, height: 32.0 });
        let uuid = find(group, "uuid");
        assert!(!uuid.editable);
    }

    #[test]
    fn id_only_node_still_gets_a_node_group() {
        let node = new_object();
        set_field(&node, "_id", "bare-1");
        let scene = new_object();
        set_field(&scene, "uuid", "scene");
        set_field(&scene, "children", Value::array(vec![Value::Object(node)]));
        let reflector = reflector_with_scene("2.4.13", scene);

        let groups = reflector.props_for("bare-1").expect("node resolved by its private id");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Node");
        let uuid = find(&groups[0], "uuid");
        assert!(!uuid.editable);
        assert_eq!(uuid.value, PropertyValue::String { value: "bare-1".to_string() });
    }

    #[test]
    fn modern_node_reads_transform_component() {
        let ui = object_with_class("cc.UITransform");
        let size = new_object();
        set_field(&size, "width", 200.0);
        set_field(&size, "height", 100.0);
        let anchor = new_object();
        set_field(&anchor, "x", 0.5);
        set_field(&anchor, "y", 0.5);
        set_field(&ui, "contentSize", size);
        set_field(&ui, "anchorPoint", anchor);

        let node = new_object();
        set_field(&node, "uuid", "n1");
        set_field(&node, "name", "hud");
        set_field(&node, "position", vec3_object(1.0, 2.0, 3.0));
        set_field(&node, "components", Value::array(vec![Value::Object(ui)]));
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let reflector = reflector_with_scene("3.8.0", scene);
        let handle = handle_of(&reflector);

        let groups = reflector.get_props(&handle, &node);
        let node_group = &groups[0];
        assert_eq!(find(node_group, "position").value, PropertyValue::Vec3 { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(find(node_group, "anchor").value, PropertyValue::Vec2 { x: 0.5, y: 0.5 });
        assert_eq!(
            find(node_group, "contentSize").value,
            PropertyValue::Size { width: 200.0, height: 100.0 }
        );
        // The transform component surfaces as its own group as well.
        let ui_group = groups.iter().find(|g| g.name.contains("UITransform")).expect("transform group");
        assert_eq!(find(ui_group, "anchorPoint").value, PropertyValue::Vec2 { x: 0.5, y: 0.5 });
    }

    #[test]
    fn sprite_group_reports_read_only_frame_and_enum_fallbacks() {
        let frame = object_with_class("SpriteFrame");
        set_field(&frame, "name", "icon.png");
        let sprite = object_with_class("cc.Sprite");
        set_field(&sprite, "enabled", true);
        set_field(&sprite, "spriteFrame", frame);
        set_field(&sprite, "type", 1.0);
        let node = new_object();
        set_field(&node, "uuid", "n1");
        set_field(&node, "components", Value::array(vec![Value::Object(sprite)]));
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let reflector = reflector_with_scene("3.8.0", scene);
        let handle = handle_of(&reflector);

        let groups = reflector.get_props(&handle, &node);
        let sprite_group = groups.iter().find(|g| g.name.contains("Sprite")).expect("sprite group");
        let frame_prop = find(sprite_group, "spriteFrame");
        assert!(!frame_prop.editable);
        assert_eq!(frame_prop.value, PropertyValue::String { value: "icon.png".to_string() });
        match &find(sprite_group, "type").value {
            PropertyValue::Enum { value, options } => {
                assert_eq!(*value, 1.0);
                assert_eq!(options.len(), 4, "fallback sprite types expected");
            }
            other => panic!("unexpected property shape: {other:?}"),
        }
    }

    #[test]
    fn generic_scan_classifies_shapes_and_references() {
        let comp = object_with_class("GameLogic");
        set_field(&comp, "enabled", true);
        set_field(&comp, "speed", 4.0);
        set_field(&comp, "label", "boss");
        set_field(&comp, "_private", 1.0);
        set_field(&comp, "missing", Value::Null);
        let tint = new_object();
        set_field(&tint, "r", 255.0);
        set_field(&tint, "g", 0.0);
        set_field(&tint, "b", 0.0);
        set_field(&comp, "tint", tint);
        let target = new_object();
        set_field(&target, "uuid", "other-node");
        set_field(&target, "name", "Target");
        set_field(&target, "children", Value::array(vec![]));
        set_field(&comp, "target", target);

        let node = new_object();
        set_field(&node, "uuid", "n1");
        set_field(&node, "components", Value::array(vec![Value::Object(comp)]));
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let reflector = reflector_with_scene("3.8.0", scene);
        let handle = handle_of(&reflector);

        let groups = reflector.get_props(&handle, &node);
        let group = groups.iter().find(|g| g.name == "GameLogic").expect("generic group");
        assert_eq!(find(group, "speed").value, PropertyValue::Number { value: 4.0 });
        let missing = find(group, "missing");
        assert!(!missing.editable);
        assert_eq!(missing.value, PropertyValue::String { value: "null".to_string() });
        assert_eq!(
            find(group, "tint").value,
            PropertyValue::Color { r: 255.0, g: 0.0, b: 0.0, a: 255.0 }
        );
        match &find(group, "target").value {
            PropertyValue::NodeRef { uuid, display, .. } => {
                assert_eq!(uuid.as_deref(), Some("other-node"));
                assert_eq!(display, "Target");
            }
            other => panic!("unexpected property shape: {other:?}"),
        }
        assert!(group.properties.iter().all(|p| p.name != "_private"));
    }

    #[test]
    fn set_prop_coerces_and_assigns() {
        let node = new_object();
        set_field(&node, "uuid", "n1");
        set_field(&node, "active", true);
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let reflector = reflector_with_scene("3.8.0", scene);

        reflector.set_prop("n1", "Node", "active", "false");
        assert_eq!(field(&node, "active"), Some(Value::Bool(false)));
        reflector.set_prop("n1", "Node", "opacity", "128");
        assert_eq!(field(&node, "opacity"), Some(Value::Number(128.0)));
        // Unresolvable targets are silent no-ops.
        reflector.set_prop("missing", "Node", "active", "true");
        reflector.set_prop("n1", "Slider", "progress", "1");
        assert_eq!(field(&node, "active"), Some(Value::Bool(false)));
    }

    #[test]
    fn set_vec_prefers_in_place_then_setter() {
        let node = new_object();
        set_field(&node, "uuid", "n1");
        set_field(&node, "position", vec3_object(0.0, 0.0, 0.0));
        node.borrow_mut().define_method("setScale", |owner, args| {
            let scale = vec3_object(
                args.first().and_then(|v| v.as_f64()).unwrap_or(0.0),
                args.get(1).and_then(|v| v.as_f64()).unwrap_or(0.0),
                args.get(2).and_then(|v| v.as_f64()).unwrap_or(0.0),
            );
            set_field(owner, "scale", scale);
            Value::Null
        });
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let reflector = reflector_with_scene("2.4.13", scene);

        reflector.set_vec("n1", "Node", "position", VecInput { x: 5.0, y: 6.0, z: Some(7.0) });
        let position = field_object(&node, "position").expect("position object");
        assert_eq!(field_f64(&position, "z"), Some(7.0));

        reflector.set_vec("n1", "Node", "scale", VecInput { x: 2.0, y: 2.0, z: None });
        let scale = field_object(&node, "scale").expect("scale set through method");
        assert_eq!(field_f64(&scale, "x"), Some(2.0));
        assert_eq!(field_f64(&scale, "z"), Some(1.0), "scale z defaults to 1");

        reflector.set_vec("n1", "Node", "anchor", VecInput { x: 0.0, y: 1.0, z: None });
        assert_eq!(field_f64(&node, "anchorX"), Some(0.0));
        assert_eq!(field_f64(&node, "anchorY"), Some(1.0));
    }

    #[test]
    fn set_size_and_color_edit_in_place() {
        let size = new_object();
        set_field(&size, "width", 10.0);
        set_field(&size, "height", 10.0);
        let color = new_object();
        set_field(&color, "r", 0.0);
        set_field(&color, "g", 0.0);
        set_field(&color, "b", 0.0);
        set_field(&color, "a", 255.0);
        let node = new_object();
        set_field(&node, "uuid", "n1");
        set_field(&node, "contentSize", size);
        set_field(&node, "color", color.clone());
        let scene = new_object();
        set_field(&scene, "children", Value::array(vec![Value::Object(node.clone())]));
        let reflector = reflector_with_scene("2.4.13", scene);

        reflector.set_size("n1", "Node", "contentSize", SizeInput { width: 300.0, height: 150.0 });
        let after = field_object(&node, "contentSize").expect("size object");
        assert_eq!(field_f64(&after, "width"), Some(300.0));

        reflector.set_color("n1", "Node", "color", ColorInput { r: 10.0, g: 20.0, b: 30.0, a: 40.0 });
        assert_eq!(field_f64(&color, "a"), Some(40.0));
        // No color object for this name: nothing happens.
        reflector.set_color("n1", "Node", "tint", ColorInput { r: 1.0, g: 2.0, b: 3.0, a: 4.0 });
        assert!(field_object(&node, "tint").is_none());
    }
}
