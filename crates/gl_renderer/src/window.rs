//! Window and context management using GLFW
//!
//! Provides window creation with an OpenGL 3.3 core context, plus the
//! event plumbing the render loop needs.

use glfw::Context;
use thiserror::Error;

use crate::config::WindowConfig;

/// Window and context errors
#[derive(Error, Debug)]
pub enum ContextError {
    /// The window configuration failed validation
    #[error("Invalid window configuration: {0}")]
    InvalidConfig(String),

    /// The windowing system could not be initialized
    #[error("Window system initialization failed: {0}")]
    InitializationFailed(String),

    /// The platform refused to create the window or its context
    #[error("Window creation failed")]
    CreationFailed,
}

/// Result type for window operations
pub type ContextResult<T> = Result<T, ContextError>;

/// GLFW window wrapper owning the GL context and event queue
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    /// Create the window and make its GL context current.
    pub fn new(config: &WindowConfig) -> ContextResult<Self> {
        config.validate().map_err(ContextError::InvalidConfig)?;

        let mut glfw = glfw::init(glfw::log_errors)
            .map_err(|e| ContextError::InitializationFailed(format!("{:?}", e)))?;

        // Request a 3.3 core context
        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
            glfw::OpenGlProfileHint::Core,
        ));
        #[cfg(target_os = "macos")]
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or(ContextError::CreationFailed)?;

        window.make_current();

        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);

        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        log::info!(
            "Created {}x{} window \"{}\"",
            config.width,
            config.height,
            config.title
        );

        Ok(Self {
            glfw,
            window,
            events,
        })
    }

    /// Whether a close has been requested.
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel window close.
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Pump the platform event queue without blocking.
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    /// Drain buffered events.
    ///
    /// Collected into a Vec so callers can react to events while still
    /// holding the window mutably.
    pub fn flush_events(&self) -> Vec<(f64, glfw::WindowEvent)> {
        glfw::flush_messages(&self.events).collect()
    }

    /// Present the back buffer.
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Current framebuffer size in pixels.
    pub fn framebuffer_size(&self) -> (i32, i32) {
        self.window.get_framebuffer_size()
    }

    /// Resolve a GL symbol through this window's context.
    ///
    /// The context must be current, which [`Self::new`] guarantees.
    pub fn get_proc_address(&mut self, name: &str) -> *const std::ffi::c_void {
        self.window.get_proc_address(name) as *const _
    }
}
