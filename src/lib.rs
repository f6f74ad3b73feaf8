pub mod adapter;
pub mod cli;
pub mod config;
pub mod fixture;
pub mod float;
pub mod highlight;
pub mod object;
pub mod page;
pub mod panel;
pub mod perf;
pub mod props;
pub mod protocol;
pub mod relay;
pub mod server;
pub mod texture;
pub mod tree;

pub use panel::{PanelDriver, PanelObserver};
pub use relay::{InProcessTransport, Relay};
pub use server::InspectorServer;
