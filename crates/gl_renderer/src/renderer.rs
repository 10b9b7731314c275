//! # Frame Renderer
//!
//! High-level rendering coordinator. Owns the graphics device, the
//! shader program, and the mesh list, and drives the per-frame sequence:
//! clear, bind program, draw each mesh, present.
//!
//! ## Architecture
//!
//! The renderer talks to the GPU only through the [`GraphicsDevice`]
//! trait, so the same loop runs against a live OpenGL context or a
//! recording device in tests. Resource creation happens up front;
//! the loop itself never allocates.
//!
//! ## Resource Lifecycle
//!
//! Everything the renderer creates it also releases, exactly once, in
//! [`FrameRenderer::shutdown`]: vertex arrays, then vertex buffers,
//! then the program. Dropping the renderer runs the same teardown if
//! shutdown was never called, so early-return paths cannot leak.

use glfw::{Action, Key, WindowEvent};
use thiserror::Error;

use crate::config::{RendererConfig, ShaderSources};
use crate::device::gl::GlDevice;
use crate::device::GraphicsDevice;
use crate::mesh::Mesh;
use crate::shader::ShaderProgram;
use crate::window::Window;

/// Lifecycle states of a [`FrameRenderer`]
///
/// Construction yields `Ready`; the loop runs in `Running`; shutdown
/// moves to `Terminated` and releases every GPU resource. There is no
/// way back out of `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Constructed; resources may be created and frames rendered
    Ready,
    /// Inside the render loop
    Running,
    /// Shut down; all GPU resources released
    Terminated,
}

/// High-level rendering error types
///
/// Abstracted from device-level error details so applications handle a
/// small, stable set of failures. The underlying diagnostics are kept
/// in the message text and the log.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    ///
    /// Occurs when the GPU function loader cannot resolve entry points,
    /// typically because no context is current or drivers are missing.
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// Resource creation or management failed
    ///
    /// Occurs when GPU objects (shaders, programs, buffers) cannot be
    /// created by the driver.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// # Frame Renderer
///
/// Coordinates frame rendering over an abstract graphics device.
///
/// ## Responsibilities
///
/// - **Resource Ownership**: Holds the shader program and meshes and
///   guarantees their release
/// - **Frame Sequencing**: Clear, bind, draw in mesh order, every frame
/// - **Loop Control**: Polls input, reacts to Escape/close/resize, and
///   presents through the window
pub struct FrameRenderer {
    /// Device abstraction the renderer issues all GPU calls through
    device: Box<dyn GraphicsDevice>,

    /// Program built by `load_shaders`, possibly unlinked
    program: Option<ShaderProgram>,

    /// Meshes in upload order, which is also draw order
    meshes: Vec<Mesh>,

    /// Color the framebuffer is cleared to each frame
    clear_color: [f32; 4],

    /// Lifecycle state
    state: RendererState,

    /// Frames rendered since construction
    frame_count: u64,
}

impl FrameRenderer {
    /// Create a renderer over an explicit device.
    ///
    /// Useful for headless operation and tests; applications drawing to
    /// a window normally go through [`Self::from_window`].
    pub fn new(device: Box<dyn GraphicsDevice>, config: &RendererConfig) -> Self {
        Self {
            device,
            program: None,
            meshes: Vec::new(),
            clear_color: config.clear_color,
            state: RendererState::Ready,
            frame_count: 0,
        }
    }

    /// Create a renderer whose device drives the window's GL context.
    ///
    /// The window's context must be current, which [`Window::new`]
    /// guarantees. Fails when GPU entry points cannot be resolved.
    pub fn from_window(window: &mut Window, config: &RendererConfig) -> RenderResult<Self> {
        let device = GlDevice::new(|name| window.get_proc_address(name))
            .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;
        Ok(Self::new(Box::new(device), config))
    }

    /// Compile and link the shader pair this renderer draws with.
    ///
    /// Compile and link failures are logged and leave the program
    /// unlinked rather than failing the call; check
    /// [`ShaderProgram::is_linked`] on [`Self::program`] to tell. A
    /// previously loaded program is released.
    pub fn load_shaders(&mut self, sources: &ShaderSources) -> RenderResult<()> {
        let program = ShaderProgram::build(self.device.as_mut(), sources)
            .map_err(|e| RenderError::ResourceCreationFailed(e.to_string()))?;
        if program.is_linked() {
            log::info!("Shader program {:?} linked", program.handle());
        }
        if let Some(old) = self.program.replace(program) {
            self.device.delete_program(old.handle());
        }
        Ok(())
    }

    /// Upload a mesh and append it to the draw list.
    pub fn upload_mesh(&mut self, positions: Vec<[f32; 3]>) -> RenderResult<&Mesh> {
        let mesh = Mesh::upload(self.device.as_mut(), positions)
            .map_err(|e| RenderError::ResourceCreationFailed(e.to_string()))?;
        log::debug!(
            "Uploaded mesh {} ({} vertices)",
            self.meshes.len(),
            mesh.vertex_count()
        );
        let index = self.meshes.len();
        self.meshes.push(mesh);
        Ok(&self.meshes[index])
    }

    /// Render one frame: clear, bind the program, draw each mesh in
    /// upload order.
    ///
    /// With no program loaded the frame still clears, so the fixed
    /// background stays visible whatever happened to the shaders.
    pub fn render_frame(&mut self) {
        self.device.clear(self.clear_color);

        match &self.program {
            Some(program) => {
                self.device.use_program(program.handle());
                for mesh in &self.meshes {
                    self.device
                        .draw_triangles(mesh.vertex_array(), 0, mesh.vertex_count() as i32);
                }
            }
            None => {
                if !self.meshes.is_empty() {
                    log::warn!(
                        "Skipping {} mesh draw(s): no shader program loaded",
                        self.meshes.len()
                    );
                }
            }
        }

        self.frame_count += 1;
        log::trace!("Rendered frame {}", self.frame_count);
    }

    /// Match the viewport to a new framebuffer size.
    pub fn resize(&mut self, width: i32, height: i32) {
        log::debug!("Framebuffer resized to {}x{}", width, height);
        self.device.set_viewport(0, 0, width, height);
    }

    /// Drive the render loop until the window requests close.
    ///
    /// Escape and the window close button both request close, observed
    /// at the top of the next iteration; framebuffer size changes update
    /// the viewport. Events are polled once per iteration and never
    /// block.
    pub fn run(&mut self, window: &mut Window) {
        self.state = RendererState::Running;
        log::info!("Entering render loop");

        while !window.should_close() {
            window.poll_events();
            for (_, event) in window.flush_events() {
                match event {
                    WindowEvent::Key(Key::Escape, _, Action::Press, _) | WindowEvent::Close => {
                        window.set_should_close(true);
                    }
                    WindowEvent::FramebufferSize(width, height) => {
                        self.resize(width, height);
                    }
                    _ => {}
                }
            }

            self.render_frame();
            window.swap_buffers();
        }

        log::info!("Render loop exited after {} frames", self.frame_count);
    }

    /// Release every GPU resource this renderer owns.
    ///
    /// Teardown order: all vertex arrays, then all vertex buffers, then
    /// the program. Subsequent calls, including the one from `Drop`,
    /// are no-ops.
    pub fn shutdown(&mut self) {
        if self.state == RendererState::Terminated {
            return;
        }
        log::info!("Shutting down renderer after {} frames", self.frame_count);

        for mesh in &self.meshes {
            self.device.delete_vertex_array(mesh.vertex_array());
        }
        for mesh in &self.meshes {
            self.device.delete_buffer(mesh.vertex_buffer());
        }
        self.meshes.clear();

        if let Some(program) = self.program.take() {
            self.device.delete_program(program.handle());
        }

        self.state = RendererState::Terminated;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Frames rendered since construction.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The program built by [`Self::load_shaders`], if any.
    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    /// Meshes in upload (and draw) order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// The device this renderer issues calls through.
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
