use crate::adapter::{find_component, EngineAdapter, EngineHandle, VersionFamily};
use crate::object::{call_method, field_f64, field_object, new_object, set_field, ObjectRef, Value};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Screen-space overlay rectangle in page pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned box in engine world space, origin bottom-left.
struct WorldBounds {
    origin: DVec2,
    size: DVec2,
}

/// Projects a node's world-space bounding box onto the page canvas. The
/// projector owns the single overlay rectangle; a failed projection keeps
/// whatever was shown before.
pub struct HighlightProjector {
    adapter: Rc<EngineAdapter>,
    overlay: Option<HighlightRect>,
}

impl HighlightProjector {
    pub fn new(adapter: Rc<EngineAdapter>) -> Self {
        Self { adapter, overlay: None }
    }

    /// Computes and shows the overlay for a node. Returns `None` without
    /// touching the current overlay when the engine, the node or the canvas
    /// cannot be resolved.
    pub fn highlight(&mut self, uuid: &str) -> Option<HighlightRect> {
        let (handle, node) = self.adapter.locate_node(uuid)?;
        let bounds = self.world_bounds(&handle, &node)?;
        let rect = self.world_to_screen(&handle, &bounds)?;
        self.overlay = Some(rect);
        Some(rect)
    }

    pub fn clear(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<HighlightRect> {
        self.overlay
    }

    fn world_bounds(&self, handle: &EngineHandle, node: &ObjectRef) -> Option<WorldBounds> {
        let ui_transform = if handle.family == VersionFamily::V3 {
            find_component(node, "UITransform")
        } else {
            None
        };

        let (dims, anchor) = if let Some(ui) = ui_transform {
            // Both sub-objects must exist on a transform component; a
            // malformed one aborts the projection.
            let size = field_object(&ui, "contentSize")?;
            let anchor = field_object(&ui, "anchorPoint")?;
            (wh(&size), xy(&anchor, 0.0))
        } else if handle.family == VersionFamily::V2 && has_inline_size(node) {
            (
                wh(node),
                DVec2::new(
                    field_f64(node, "anchorX").unwrap_or(0.5),
                    field_f64(node, "anchorY").unwrap_or(0.5),
                ),
            )
        } else if handle.family == VersionFamily::V2 {
            match field_object(node, "contentSize") {
                Some(size) => (
                    wh(&size),
                    DVec2::new(
                        field_f64(node, "anchorX").unwrap_or(0.5),
                        field_f64(node, "anchorY").unwrap_or(0.5),
                    ),
                ),
                None => (DVec2::new(100.0, 100.0), DVec2::splat(0.5)),
            }
        } else {
            (DVec2::new(100.0, 100.0), DVec2::splat(0.5))
        };

        let world = world_position(node)?;
        let size = dims * node_scale(node).abs();
        Some(WorldBounds { origin: world - size * anchor, size })
    }

    /// World space has its origin bottom-left with y up; the page has it
    /// top-left with y down, so the vertical axis flips around the visible
    /// height.
    fn world_to_screen(&self, handle: &EngineHandle, bounds: &WorldBounds) -> Option<HighlightRect> {
        let canvas = self.adapter.page().canvas_rect()?;
        let canvas_size = DVec2::new(canvas.width, canvas.height);
        let visible = visible_size(handle, canvas_size);
        let ratio = canvas_size / visible;
        let world_top = bounds.origin.y + bounds.size.y;
        let screen = DVec2::new(canvas.left, canvas.top)
            + DVec2::new(bounds.origin.x, visible.y - world_top) * ratio;
        let size = bounds.size * ratio;
        Some(HighlightRect { x: screen.x, y: screen.y, width: size.x, height: size.y })
    }
}

fn has_inline_size(node: &ObjectRef) -> bool {
    let node_ref = node.borrow();
    node_ref.has("width") && node_ref.has("height")
}

/// An exposed position accessor is authoritative: a return that is not a
/// point aborts the projection instead of degrading to the origin.
fn world_position(node: &ObjectRef) -> Option<DVec2> {
    if let Some(world) = field_object(node, "worldPosition") {
        return Some(xy(&world, 0.0));
    }
    if node.borrow().has_method("getWorldPosition") {
        let world = call_method(node, "getWorldPosition", &[])?.as_object().cloned()?;
        return Some(xy(&world, 0.0));
    }
    if node.borrow().has_method("convertToWorldSpaceAR") {
        let origin = new_object();
        set_field(&origin, "x", 0.0);
        set_field(&origin, "y", 0.0);
        let world = call_method(node, "convertToWorldSpaceAR", &[Value::Object(origin)])?
            .as_object()
            .cloned()?;
        return Some(xy(&world, 0.0));
    }
    Some(DVec2::new(
        field_f64(node, "x").unwrap_or(0.0),
        field_f64(node, "y").unwrap_or(0.0),
    ))
}

fn node_scale(node: &ObjectRef) -> DVec2 {
    if let Some(scale) = field_object(node, "scale") {
        return xy(&scale, 1.0);
    }
    DVec2::new(
        field_f64(node, "scaleX").unwrap_or(1.0),
        field_f64(node, "scaleY").unwrap_or(1.0),
    )
}

/// First usable source wins: a `getVisibleSize` method, the `winSize` object,
/// then the design resolution, finally the canvas itself.
fn visible_size(handle: &EngineHandle, canvas: DVec2) -> DVec2 {
    let view = field_object(&handle.root, "view");
    if let Some(view) = &view {
        if view.borrow().has_method("getVisibleSize") {
            let size = call_method(view, "getVisibleSize", &[]).and_then(|v| v.as_object().cloned());
            return size.map(|s| wh(&s)).unwrap_or(DVec2::ZERO);
        }
    }
    if let Some(win) = field_object(&handle.root, "winSize") {
        return wh(&win);
    }
    if let Some(view) = &view {
        if view.borrow().has_method("getDesignResolutionSize") {
            let size = call_method(view, "getDesignResolutionSize", &[]).and_then(|v| v.as_object().cloned());
            return size.map(|s| wh(&s)).unwrap_or(DVec2::ZERO);
        }
    }
    canvas
}

fn xy(point: &ObjectRef, default: f64) -> DVec2 {
    DVec2::new(
        field_f64(point, "x").unwrap_or(default),
        field_f64(point, "y").unwrap_or(default),
    )
}

fn wh(size: &ObjectRef) -> DVec2 {
    DVec2::new(
        field_f64(size, "width").unwrap_or(0.0),
        field_f64(size, "height").unwrap_or(0.0),
    )
}
