use crate::props::{ColorInput, PropertyGroup, SizeInput, VecInput};
use crate::protocol::{InspectorRequest, InspectorResponse, StatusUpdate};
use crate::relay::{InspectorTransport, Relay};
use crate::tree::NodeTreeEntry;
use serde::Serialize;

/// Receives whole payloads whenever their content actually changed. There is
/// no delta form; consumers replace what they had.
pub trait PanelObserver {
    fn tree_changed(&mut self, tree: &[NodeTreeEntry], version: Option<&str>);
    fn props_changed(&mut self, uuid: &str, props: &[PropertyGroup]);
    fn status_changed(&mut self, status: &StatusUpdate);
}

/// The devtools-side polling loop. The embedder calls [`PanelDriver::tick`] on
/// its timer; each tick asks for the tree, then for the selected node's
/// properties, and pushes to the observer only when the serialized payload
/// hash moved.
pub struct PanelDriver<T: InspectorTransport> {
    relay: Relay<T>,
    selection: Option<String>,
    tree_hash: Option<blake3::Hash>,
    props_hash: Option<blake3::Hash>,
}

impl<T: InspectorTransport> PanelDriver<T> {
    pub fn new(relay: Relay<T>) -> Self {
        Self { relay, selection: None, tree_hash: None, props_hash: None }
    }

    pub fn select(&mut self, uuid: impl Into<String>) {
        self.selection = Some(uuid.into());
        // A fresh selection always pushes, even if the bytes happen to match.
        self.props_hash = None;
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.props_hash = None;
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Drops both hashes so the next tick pushes unconditionally.
    pub fn force_refresh(&mut self) {
        self.tree_hash = None;
        self.props_hash = None;
    }

    pub fn tick(&mut self, observer: &mut dyn PanelObserver) {
        if let Some(status) = self.relay.poll_status() {
            observer.status_changed(&status);
        }

        if let Some(InspectorResponse::Tree { tree: Some(tree), version }) =
            self.relay.query(InspectorRequest::GetTree)
        {
            if let Some(hash) = payload_hash(&(&tree, &version)) {
                if self.tree_hash != Some(hash) {
                    self.tree_hash = Some(hash);
                    observer.tree_changed(&tree, version.as_deref());
                }
            }
        }

        let Some(uuid) = self.selection.clone() else { return };
        if let Some(InspectorResponse::Props { props: Some(props) }) =
            self.relay.query(InspectorRequest::GetProps { uuid: uuid.clone() })
        {
            if let Some(hash) = payload_hash(&props) {
                if self.props_hash != Some(hash) {
                    self.props_hash = Some(hash);
                    observer.props_changed(&uuid, &props);
                }
            }
        }
    }

    pub fn set_prop(&mut self, uuid: &str, comp: &str, prop: &str, value: &str) {
        self.relay.send(InspectorRequest::SetProp {
            uuid: uuid.to_string(),
            comp: comp.to_string(),
            prop: prop.to_string(),
            value: value.to_string(),
        });
    }

    pub fn set_vec(&mut self, uuid: &str, comp: &str, prop: &str, value: VecInput) {
        self.relay.send(InspectorRequest::SetVec {
            uuid: uuid.to_string(),
            comp: comp.to_string(),
            prop: prop.to_string(),
            value,
        });
    }

    pub fn set_size(&mut self, uuid: &str, comp: &str, prop: &str, value: SizeInput) {
        self.relay.send(InspectorRequest::SetSize {
            uuid: uuid.to_string(),
            comp: comp.to_string(),
            prop: prop.to_string(),
            value,
        });
    }

    pub fn set_color(&mut self, uuid: &str, comp: &str, prop: &str, value: ColorInput) {
        self.relay.send(InspectorRequest::SetColor {
            uuid: uuid.to_string(),
            comp: comp.to_string(),
            prop: prop.to_string(),
            value,
        });
    }

    pub fn highlight(&mut self, uuid: &str) {
        self.relay.send(InspectorRequest::HighlightNode { uuid: uuid.to_string() });
    }

    pub fn clear_highlight(&mut self) {
        self.relay.send(InspectorRequest::ClearHighlight);
    }

    pub fn relay(&self) -> &Relay<T> {
        &self.relay
    }
}

fn payload_hash<T: Serialize>(payload: &T) -> Option<blake3::Hash> {
    serde_json::to_vec(payload).ok().map(|bytes| blake3::hash(&bytes))
}
