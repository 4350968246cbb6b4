mod base;
mod memory;
mod redis;

pub use base::CheckpointStore;
pub use memory::MemoryCheckpointStore;
pub use self::redis::RedisCheckpointStore;
