// Platform-specific code module

pub mod sensors;
