//! Pipeline scheduling: bounded byte bridges and concurrent stage
//! execution.

mod bridge;
mod pipeline;

pub use bridge::{bridge, BridgeReader, BridgeWriter, BRIDGE_CAPACITY};
pub(crate) use pipeline::PipelineRunner;
