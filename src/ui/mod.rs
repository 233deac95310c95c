pub mod icons;
pub mod render;

pub use render::{conversation_block, message_header, relative_time};
