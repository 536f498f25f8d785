pub mod assets;
pub mod services;
