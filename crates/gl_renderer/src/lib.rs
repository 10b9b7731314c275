//! # GL Renderer
//!
//! A small OpenGL frame renderer with a testable device abstraction.
//!
//! ## Features
//!
//! - **OpenGL 3.3 Core**: Shader-based pipeline driven through `glow`
//! - **Testable by Construction**: All GPU work goes through a device
//!   trait, with a call-recording implementation for headless tests
//! - **Deterministic Teardown**: Every GPU resource is released on every
//!   exit path, shutdown or drop
//! - **Config Files**: Window, clear color, and shader sources load from
//!   TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gl_renderer::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::default();
//!     let mut window = Window::new(&config.window)?;
//!     let mut renderer = FrameRenderer::from_window(&mut window, &config.renderer)?;
//!
//!     renderer.load_shaders(&config.shaders)?;
//!     renderer.upload_mesh(vec![[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]])?;
//!
//!     renderer.run(&mut window);
//!     renderer.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_possible_truncation
)]

pub mod config;
pub mod device;
pub mod logging;
pub mod mesh;
pub mod renderer;
pub mod shader;
pub mod window;

#[cfg(test)]
mod pipeline_tests;

pub use config::{AppConfig, Config, ConfigError, RendererConfig, ShaderSources, WindowConfig};
pub use renderer::{FrameRenderer, RenderError, RenderResult, RendererState};
pub use window::{ContextError, Window};

/// Common imports for renderer users
pub mod prelude {
    pub use crate::config::{AppConfig, Config, RendererConfig, ShaderSources, WindowConfig};
    pub use crate::device::{GraphicsDevice, ShaderStage};
    pub use crate::mesh::Mesh;
    pub use crate::renderer::{FrameRenderer, RenderError, RenderResult, RendererState};
    pub use crate::shader::ShaderProgram;
    pub use crate::window::Window;
}
