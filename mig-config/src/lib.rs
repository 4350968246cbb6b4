mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::Environment;
pub use load::{AppConfig, load_config};
pub use secret::Password;
