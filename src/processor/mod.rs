pub mod engine;
mod flow;
mod table;

pub use engine::build_flows;
pub use flow::{DecodedPacket, Endpoint, Flow, FlowKey, PacketRecord, Transport};
pub use table::FlowTable;
