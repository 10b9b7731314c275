//! Graphics device abstraction
//!
//! This module defines the trait that GPU backends implement to provide
//! a consistent interface for the renderer. Two implementations exist:
//! [`gl::GlDevice`] drives a real OpenGL context, and
//! [`recording::RecordingDevice`] records every call for headless use
//! and tests.
//!
//! Resources are identified by opaque integer handles minted by the
//! device. Handles are plain values: copying one never duplicates the
//! GPU object behind it, and the owner is responsible for an eventual
//! matching delete.

pub mod gl;
pub mod recording;

pub use gl::GlDevice;
pub use recording::{CallLog, DeviceCall, RecordingDevice};

use thiserror::Error;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors reported by a graphics device
#[derive(Error, Debug)]
pub enum DeviceError {
    /// A GPU entry point could not be resolved
    ///
    /// Happens when no context is current or the driver does not expose
    /// the requested profile. Fatal for the device being constructed.
    #[error("GPU function loading failed: {0}")]
    LoaderFailed(String),

    /// The driver refused to create a GPU object
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),
}

/// Handle to a compiled shader stage stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Handle to a linked shader program stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Handle to a vertex buffer stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a vertex array object stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u64);

/// Shader stage kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Per-vertex stage
    Vertex,
    /// Per-fragment stage
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Vertex attribute layout for a mesh
///
/// Describes a single float attribute within an interleaved (or, as
/// here, tightly packed) vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexLayout {
    /// Attribute location the shader binds to
    pub location: u32,
    /// Number of float components per vertex
    pub components: i32,
    /// Byte distance between consecutive vertices
    pub stride: i32,
    /// Byte offset of the attribute within a vertex
    pub offset: i32,
}

impl VertexLayout {
    /// Layout for plain 3D positions at attribute location 0.
    pub fn position_3d() -> Self {
        Self {
            location: 0,
            components: 3,
            stride: (3 * std::mem::size_of::<f32>()) as i32,
            offset: 0,
        }
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::position_3d()
    }
}

/// Main graphics device trait
///
/// Abstracts the GPU binding so the renderer can run against a real
/// OpenGL context or a recording substitute. All methods are infallible
/// except object creation, mirroring which driver calls actually report
/// failure.
pub trait GraphicsDevice {
    /// Compile one shader stage from source
    ///
    /// A compile failure is not an error: the returned handle reports
    /// `false` from [`Self::shader_compile_status`] and carries the
    /// diagnostic in [`Self::shader_info_log`]. Only failure to create
    /// the shader object itself is an `Err`.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> DeviceResult<ShaderHandle>;

    /// Whether the given shader stage compiled successfully
    fn shader_compile_status(&self, shader: ShaderHandle) -> bool;

    /// Diagnostic text from compiling the given shader stage
    fn shader_info_log(&self, shader: ShaderHandle) -> String;

    /// Delete a shader stage object
    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Link the given shader stages into a program
    ///
    /// The slice is explicit and ordered; every handle in it is
    /// attached. Link failures are reported through
    /// [`Self::program_link_status`] and [`Self::program_info_log`],
    /// not as an `Err`.
    fn link_program(&mut self, shaders: &[ShaderHandle]) -> DeviceResult<ProgramHandle>;

    /// Whether the given program linked successfully
    fn program_link_status(&self, program: ProgramHandle) -> bool;

    /// Diagnostic text from linking the given program
    fn program_info_log(&self, program: ProgramHandle) -> String;

    /// Delete a shader program
    fn delete_program(&mut self, program: ProgramHandle);

    /// Create an immutable vertex buffer holding `data`
    fn create_vertex_buffer(&mut self, data: &[u8]) -> DeviceResult<BufferHandle>;

    /// Create a vertex array object binding `buffer` with `layout`
    fn create_vertex_array(
        &mut self,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> DeviceResult<VertexArrayHandle>;

    /// Delete a vertex buffer
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Delete a vertex array object
    fn delete_vertex_array(&mut self, array: VertexArrayHandle);

    /// Clear the framebuffer to `color`
    fn clear(&mut self, color: [f32; 4]);

    /// Bind `program` for subsequent draws
    fn use_program(&mut self, program: ProgramHandle);

    /// Draw `count` vertices from `array` as triangles, starting at `first`
    fn draw_triangles(&mut self, array: VertexArrayHandle, first: i32, count: i32);

    /// Set the viewport rectangle in framebuffer pixels
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Downcast to the concrete device type
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to the mutable concrete device type
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_layout_is_tightly_packed() {
        let layout = VertexLayout::position_3d();
        assert_eq!(layout.location, 0, "Positions bind to location 0");
        assert_eq!(layout.components, 3, "Positions are 3 floats");
        assert_eq!(layout.stride, 12, "Three f32 components per vertex");
        assert_eq!(layout.offset, 0);
    }

    #[test]
    fn test_shader_stage_display() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
