use crate::object::ObjectRef;

/// Bounding box of the rendering surface in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Script heap usage as reported by the page, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

/// Everything the inspector may read from the page it runs inside. The global
/// object is where engine discovery starts; the rest of the surface is optional
/// and absent on headless hosts.
pub trait PageHost {
    /// Root of the page's global object graph.
    fn globals(&self) -> ObjectRef;

    /// Bounding box of the engine's canvas, if one is mounted.
    fn canvas_rect(&self) -> Option<PageRect> {
        None
    }

    /// Script heap statistics, when the host exposes them.
    fn heap_stats(&self) -> Option<HeapStats> {
        None
    }

    /// Raw text of an on-page debug overlay, when one is visible.
    fn stats_overlay_text(&self) -> Option<String> {
        None
    }
}
