pub mod raw;
pub mod video;

pub use raw::{Count, RawChannelInfo, RawRecord};
pub use video::{ChannelInfo, Links, Video};
