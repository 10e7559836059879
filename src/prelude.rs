// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use fencecall::prelude::*;` to get started quickly.

pub use crate::config::Config;
pub use crate::directive::{Directive, Directives, parse as parse_directives};
pub use crate::error::{ErrorKind, FencecallError, RegistryError, ToolError, TurnError};
pub use crate::orchestrator::{Advisory, Generator, Orchestrator, Processed};
pub use crate::plugin::{CommandTool, PluginManifest, configured_registry};
pub use crate::render::Renderer;
pub use crate::tool::{
    ExecutionResult, ParamKind, ParameterSpec, Registry, Tool, ToolDescriptor, decode_params,
};
pub use crate::tools::{
    BashTool, CreateFileTool, DeleteFileTool, EditFileTool, FileSearchTool, GrepSearchTool,
    ListDirTool, ReadFileTool, ShellRunner, builtin_registry,
};
