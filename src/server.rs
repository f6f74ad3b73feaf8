use crate::adapter::EngineAdapter;
use crate::highlight::{HighlightProjector, HighlightRect};
use crate::page::PageHost;
use crate::perf::PerfSampler;
use crate::props::PropertyReflector;
use crate::protocol::{EngineStatus, InspectorRequest, InspectorResponse, StatusUpdate};
use crate::texture::TextureReplacer;
use crate::tree::TreeBuilder;
use std::rc::Rc;

/// The page-side half of the inspector: owns every component and turns
/// requests into graph work. One server per inspected page.
pub struct InspectorServer {
    adapter: Rc<EngineAdapter>,
    tree: TreeBuilder,
    props: PropertyReflector,
    highlight: HighlightProjector,
    texture: TextureReplacer,
    perf: PerfSampler,
    last_status: Option<EngineStatus>,
}

impl InspectorServer {
    pub fn new(page: Rc<dyn PageHost>) -> Self {
        let adapter = Rc::new(EngineAdapter::new(page));
        Self {
            tree: TreeBuilder::new(adapter.clone()),
            props: PropertyReflector::new(adapter.clone()),
            highlight: HighlightProjector::new(adapter.clone()),
            texture: TextureReplacer::new(adapter.clone()),
            perf: PerfSampler::new(adapter.clone()),
            adapter,
            last_status: None,
        }
    }

    /// Dispatches one request. Fire-and-forget requests and requests the
    /// original page handler answers with silence return `None`; the relay
    /// turns that silence into timeout placeholders for the caller.
    pub fn handle(&mut self, request: InspectorRequest) -> Option<InspectorResponse> {
        match request {
            InspectorRequest::GetTree => {
                let Some(handle) = self.adapter.detect() else {
                    return Some(InspectorResponse::Error { msg: "no engine".to_string() });
                };
                let tree = self.tree.scene_tree().map(|root| vec![root]).unwrap_or_default();
                Some(InspectorResponse::Tree { tree: Some(tree), version: Some(handle.version) })
            }
            InspectorRequest::GetProps { uuid } => {
                if self.adapter.detect().is_none() {
                    return Some(InspectorResponse::Error { msg: "no engine".to_string() });
                }
                let props = self.props.props_for(&uuid).unwrap_or_default();
                Some(InspectorResponse::Props { props: Some(props) })
            }
            InspectorRequest::SetProp { uuid, comp, prop, value } => {
                if self.adapter.detect().is_none() {
                    return Some(InspectorResponse::Error { msg: "no engine".to_string() });
                }
                self.props.set_prop(&uuid, &comp, &prop, &value);
                None
            }
            InspectorRequest::SetVec { uuid, comp, prop, value } => {
                if self.adapter.detect().is_none() {
                    return Some(InspectorResponse::Error { msg: "no engine".to_string() });
                }
                self.props.set_vec(&uuid, &comp, &prop, value);
                None
            }
            InspectorRequest::SetSize { uuid, comp, prop, value } => {
                if self.adapter.detect().is_none() {
                    return Some(InspectorResponse::Error { msg: "no engine".to_string() });
                }
                self.props.set_size(&uuid, &comp, &prop, value);
                None
            }
            InspectorRequest::SetColor { uuid, comp, prop, value } => {
                if self.adapter.detect().is_none() {
                    return Some(InspectorResponse::Error { msg: "no engine".to_string() });
                }
                self.props.set_color(&uuid, &comp, &prop, value);
                None
            }
            InspectorRequest::HighlightNode { uuid } => {
                self.highlight.highlight(&uuid);
                None
            }
            InspectorRequest::ClearHighlight => {
                self.highlight.clear();
                None
            }
            InspectorRequest::GetPerf => {
                self.adapter.detect()?;
                Some(InspectorResponse::Perf { data: self.perf.sample() })
            }
            InspectorRequest::GetSpriteNodes => {
                self.adapter.detect()?;
                Some(InspectorResponse::SpriteNodes { nodes: self.tree.sprite_nodes() })
            }
            InspectorRequest::ReplaceSpriteTexture { uuid, image } => {
                self.adapter.detect()?;
                let outcome =
                    pollster::block_on(self.texture.replace_sprite_texture(&uuid, &image));
                Some(InspectorResponse::ReplaceResult { outcome })
            }
            InspectorRequest::ResetSpriteTexture { uuid } => {
                self.adapter.detect()?;
                let outcome = self.texture.reset_sprite_texture(&uuid);
                Some(InspectorResponse::ResetResult { outcome })
            }
        }
    }

    /// Re-probes engine presence and reports it when it differs from the last
    /// observation. The first call always reports.
    pub fn poll_status(&mut self) -> Option<StatusUpdate> {
        let handle = self.adapter.detect();
        let status = match handle {
            Some(_) => EngineStatus::Detected,
            None => EngineStatus::NotDetected,
        };
        if self.last_status == Some(status) {
            return None;
        }
        self.last_status = Some(status);
        Some(StatusUpdate { status, version: handle.map(|h| h.version) })
    }

    /// Current overlay, for embedders that render the highlight themselves.
    pub fn overlay(&self) -> Option<HighlightRect> {
        self.highlight.overlay()
    }
}
