use crate::perf::PerfSnapshot;
use crate::protocol::{EngineStatus, InspectorRequest, InspectorResponse};
use crate::relay::{InspectorTransport, Relay};
use crate::tree::SpriteNodeEntry;

/// Traffic-light classification for a perf reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Good,
    Warning,
    Bad,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Good => "good",
            Rating::Warning => "warning",
            Rating::Bad => "bad",
        }
    }
}

pub fn fps_rating(fps: f64) -> Rating {
    if fps >= 55.0 {
        Rating::Good
    } else if fps >= 30.0 {
        Rating::Warning
    } else {
        Rating::Bad
    }
}

pub fn draw_call_rating(draw_calls: f64) -> Rating {
    if draw_calls < 100.0 {
        Rating::Good
    } else if draw_calls < 300.0 {
        Rating::Warning
    } else {
        Rating::Bad
    }
}

/// State behind the on-page quick panel: perf readout, sprite picker, and
/// texture swap controls. Rendering stays with the embedder; this type holds
/// what the widgets display and the rules for when the buttons work.
///
/// The panel does not activate until the engine shows up. The embedder keeps
/// calling [`FloatPanel::poll_engine`] on its timer until it returns true or
/// the retry budget runs out, matching the bounded wait the panel performs
/// before it first draws itself.
pub struct FloatPanel<T: InspectorTransport> {
    relay: Relay<T>,
    engine_ready: bool,
    wait_retries_left: u32,
    perf: PerfSnapshot,
    nodes: Vec<SpriteNodeEntry>,
    filter: String,
    selection: Option<String>,
    pending_image: Option<Vec<u8>>,
    last_outcome: Option<String>,
}

impl<T: InspectorTransport> FloatPanel<T> {
    pub fn new(relay: Relay<T>, wait_retries: u32) -> Self {
        Self {
            relay,
            engine_ready: false,
            wait_retries_left: wait_retries,
            perf: PerfSnapshot::default(),
            nodes: Vec::new(),
            filter: String::new(),
            selection: None,
            pending_image: None,
            last_outcome: None,
        }
    }

    /// One step of the wait-for-engine gate. Burns a retry per call until the
    /// engine is seen; once ready it stays ready.
    pub fn poll_engine(&mut self) -> bool {
        if self.engine_ready {
            return true;
        }
        if self.wait_retries_left == 0 {
            return false;
        }
        self.wait_retries_left -= 1;
        if let Some(update) = self.relay.poll_status() {
            if update.status == EngineStatus::Detected {
                self.engine_ready = true;
            }
        }
        self.engine_ready
    }

    /// True once the retry budget is exhausted without a detection. The panel
    /// never activates after this.
    pub fn gave_up(&self) -> bool {
        !self.engine_ready && self.wait_retries_left == 0
    }

    pub fn engine_ready(&self) -> bool {
        self.engine_ready
    }

    /// Pulls a fresh perf snapshot. Called on the panel's own 500ms cadence
    /// while the perf readout is open; every reply repaints all rows.
    pub fn refresh_perf(&mut self) -> &PerfSnapshot {
        if let Some(InspectorResponse::Perf { data }) = self.relay.query(InspectorRequest::GetPerf) {
            self.perf = data;
        }
        &self.perf
    }

    pub fn perf(&self) -> &PerfSnapshot {
        &self.perf
    }

    /// Re-reads the sprite-bearing node list from the scene.
    pub fn refresh_nodes(&mut self) {
        if let Some(InspectorResponse::SpriteNodes { nodes }) =
            self.relay.query(InspectorRequest::GetSpriteNodes)
        {
            self.nodes = nodes;
        }
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    /// The node list after the search filter, scene order preserved. Matching
    /// is a case-insensitive substring test on the node name.
    pub fn visible_nodes(&self) -> Vec<&SpriteNodeEntry> {
        let needle = self.filter.to_lowercase();
        self.nodes
            .iter()
            .filter(|node| needle.is_empty() || node.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Picks a node and immediately asks the page to outline it.
    pub fn select(&mut self, uuid: impl Into<String>) {
        let uuid = uuid.into();
        self.relay.send(InspectorRequest::HighlightNode { uuid: uuid.clone() });
        self.selection = Some(uuid);
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Raw bytes of the user-picked replacement image.
    pub fn set_pending_image(&mut self, bytes: Vec<u8>) {
        self.pending_image = Some(bytes);
    }

    /// The apply button lights up only with both a node and an image picked.
    pub fn can_apply(&self) -> bool {
        self.selection.is_some() && self.pending_image.is_some()
    }

    /// Swaps the selected sprite's texture for the pending image. No-op while
    /// [`FloatPanel::can_apply`] is false. The image stays pending so the same
    /// file can be applied to another node.
    pub fn apply_replacement(&mut self) {
        let (Some(uuid), Some(image)) = (self.selection.clone(), self.pending_image.clone()) else {
            return;
        };
        if let Some(InspectorResponse::ReplaceResult { outcome }) =
            self.relay.query(InspectorRequest::ReplaceSpriteTexture { uuid, image })
        {
            self.last_outcome = Some(if outcome.success {
                "texture replaced".to_string()
            } else {
                format!("replace failed: {}", outcome.error.as_deref().unwrap_or("unknown error"))
            });
        }
    }

    /// Restores the selected sprite's original texture. Needs a selection but
    /// no pending image.
    pub fn reset_replacement(&mut self) {
        let Some(uuid) = self.selection.clone() else { return };
        if let Some(InspectorResponse::ResetResult { outcome }) =
            self.relay.query(InspectorRequest::ResetSpriteTexture { uuid })
        {
            self.last_outcome = Some(if outcome.success {
                "texture reset".to_string()
            } else {
                format!("reset failed: {}", outcome.error.as_deref().unwrap_or("unknown error"))
            });
        }
    }

    /// Text of the most recent replace or reset toast.
    pub fn last_outcome(&self) -> Option<&str> {
        self.last_outcome.as_deref()
    }

    pub fn relay(&self) -> &Relay<T> {
        &self.relay
    }
}
