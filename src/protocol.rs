use crate::perf::PerfSnapshot;
use crate::props::{ColorInput, PropertyGroup, SizeInput, VecInput};
use crate::texture::ReplaceOutcome;
use crate::tree::{NodeTreeEntry, SpriteNodeEntry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

const FRAME_LEN_BYTES: usize = std::mem::size_of::<u32>();

/// Everything a panel can ask of the inspected page. Tag strings are the wire
/// contract; embedders on the other side of a frame boundary match on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InspectorRequest {
    GetTree,
    GetProps { uuid: String },
    SetProp { uuid: String, comp: String, prop: String, value: String },
    SetVec { uuid: String, comp: String, prop: String, value: VecInput },
    SetSize { uuid: String, comp: String, prop: String, value: SizeInput },
    SetColor { uuid: String, comp: String, prop: String, value: ColorInput },
    HighlightNode { uuid: String },
    ClearHighlight,
    GetPerf,
    GetSpriteNodes,
    ReplaceSpriteTexture { uuid: String, image: Vec<u8> },
    ResetSpriteTexture { uuid: String },
}

impl InspectorRequest {
    /// Edits and highlight commands are fire-and-forget; everything else gets
    /// a reply (or a timeout placeholder).
    pub fn expects_reply(&self) -> bool {
        !matches!(
            self,
            Self::SetProp { .. }
                | Self::SetVec { .. }
                | Self::SetSize { .. }
                | Self::SetColor { .. }
                | Self::HighlightNode { .. }
                | Self::ClearHighlight
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InspectorResponse {
    Tree {
        tree: Option<Vec<NodeTreeEntry>>,
        version: Option<String>,
    },
    Props {
        props: Option<Vec<PropertyGroup>>,
    },
    Perf {
        data: PerfSnapshot,
    },
    SpriteNodes {
        nodes: Vec<SpriteNodeEntry>,
    },
    ReplaceResult {
        #[serde(flatten)]
        outcome: ReplaceOutcome,
    },
    ResetResult {
        #[serde(flatten)]
        outcome: ReplaceOutcome,
    },
    Error {
        msg: String,
    },
}

impl InspectorResponse {
    /// The null placeholder a reply window collapses to when the page never
    /// answers. Fire-and-forget requests have no placeholder.
    pub fn timed_out(request: &InspectorRequest) -> Option<InspectorResponse> {
        match request {
            InspectorRequest::GetTree => Some(Self::Tree { tree: None, version: None }),
            InspectorRequest::GetProps { .. } => Some(Self::Props { props: None }),
            InspectorRequest::GetPerf => Some(Self::Perf { data: PerfSnapshot::default() }),
            InspectorRequest::GetSpriteNodes => Some(Self::SpriteNodes { nodes: Vec::new() }),
            InspectorRequest::ReplaceSpriteTexture { .. } => {
                Some(Self::ReplaceResult { outcome: ReplaceOutcome::fail("no response from page") })
            }
            InspectorRequest::ResetSpriteTexture { .. } => {
                Some(Self::ResetResult { outcome: ReplaceOutcome::fail("no response from page") })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineStatus {
    Detected,
    NotDetected,
}

/// Pushed spontaneously when engine presence flips, independent of polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: EngineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

pub fn send_frame<W, T>(writer: &mut W, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    let payload = serde_json::to_vec(value).map_err(to_io_error)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "frame too large"))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()
}

pub fn recv_frame<R, T>(reader: &mut R) -> io::Result<T>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; FRAME_LEN_BYTES];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    serde_json::from_slice(&payload).map_err(to_io_error)
}

fn to_io_error(err: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}
