// ABOUTME: Root module for fencecall - runs tool directives embedded in generated text.
// ABOUTME: Re-exports all public types from submodules.

pub mod config;
pub mod directive;
pub mod error;
pub mod orchestrator;
pub mod plugin;
pub mod prelude;
pub mod render;
pub mod tool;
pub mod tools;

pub use error::FencecallError;
