mod reader;

pub use reader::{decode_frame, LinkLayer, PacketReader};
