pub mod checksum;
pub mod codec;
pub mod dispatch;
pub mod objects;
