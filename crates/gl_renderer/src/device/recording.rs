//! Call-recording device for headless runs and tests
//!
//! Stands in for [`super::gl::GlDevice`] wherever no GL context exists.
//! Every call is appended to a shared log with its arguments, so tests
//! can assert on exactly what the renderer asked the GPU to do. Compile
//! and link failures can be forced to exercise the diagnostic paths.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{
    BufferHandle, DeviceResult, GraphicsDevice, ProgramHandle, ShaderHandle, ShaderStage,
    VertexArrayHandle, VertexLayout,
};

/// One recorded device call with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// A shader stage was compiled
    CompileShader {
        /// Handle minted for the stage
        shader: ShaderHandle,
        /// Which stage was compiled
        stage: ShaderStage,
    },
    /// Shader stages were linked into a program
    LinkProgram {
        /// Handle minted for the program
        program: ProgramHandle,
        /// The stages attached, in argument order
        shaders: Vec<ShaderHandle>,
    },
    /// A shader stage was deleted
    DeleteShader {
        /// The deleted stage
        shader: ShaderHandle,
    },
    /// A program was deleted
    DeleteProgram {
        /// The deleted program
        program: ProgramHandle,
    },
    /// A vertex buffer was created and filled
    CreateVertexBuffer {
        /// Handle minted for the buffer
        buffer: BufferHandle,
        /// Size of the uploaded data in bytes
        byte_len: usize,
    },
    /// A vertex array was created over a buffer
    CreateVertexArray {
        /// Handle minted for the array
        array: VertexArrayHandle,
        /// The buffer the array reads from
        buffer: BufferHandle,
        /// Attribute layout configured on the array
        layout: VertexLayout,
    },
    /// A vertex buffer was deleted
    DeleteBuffer {
        /// The deleted buffer
        buffer: BufferHandle,
    },
    /// A vertex array was deleted
    DeleteVertexArray {
        /// The deleted array
        array: VertexArrayHandle,
    },
    /// The framebuffer was cleared
    Clear {
        /// Clear color as RGBA
        color: [f32; 4],
    },
    /// A program was bound for drawing
    UseProgram {
        /// The bound program
        program: ProgramHandle,
    },
    /// Triangles were drawn from a vertex array
    DrawTriangles {
        /// Source vertex array
        array: VertexArrayHandle,
        /// First vertex index
        first: i32,
        /// Number of vertices
        count: i32,
    },
    /// The viewport rectangle was set
    SetViewport {
        /// Left edge in pixels
        x: i32,
        /// Bottom edge in pixels
        y: i32,
        /// Width in pixels
        width: i32,
        /// Height in pixels
        height: i32,
    },
}

/// Shared view onto a [`RecordingDevice`]'s call log
///
/// Clones observe the same underlying log, so a test can keep one and
/// inspect calls made after the device itself moved into a renderer,
/// including calls made while the renderer was being dropped.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<DeviceCall>>>,
}

impl CallLog {
    fn push(&self, call: DeviceCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Copy of every call recorded so far, in issue order.
    pub fn snapshot(&self) -> Vec<DeviceCall> {
        self.calls.borrow().clone()
    }

    /// Number of calls recorded so far.
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Whether no calls have been recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// Number of triangle draws recorded so far.
    pub fn draw_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, DeviceCall::DrawTriangles { .. }))
            .count()
    }
}

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    compiled: bool,
    info_log: String,
}

#[derive(Debug)]
struct ProgramRecord {
    linked: bool,
    info_log: String,
}

/// A [`GraphicsDevice`] that records calls instead of touching a GPU
///
/// Compilation succeeds unless the stage has a forced failure or the
/// source is blank; linking succeeds unless forced to fail or one of
/// the attached stages failed to compile, mirroring how drivers treat
/// broken stages at link time.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    log: CallLog,
    shaders: HashMap<ShaderHandle, ShaderRecord>,
    programs: HashMap<ProgramHandle, ProgramRecord>,
    next_handle: u64,
    forced_compile_failures: HashMap<ShaderStage, String>,
    forced_link_failure: Option<String>,
}

impl RecordingDevice {
    /// Create a device that accepts and records everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force compilation of `stage` to fail with `diagnostic`.
    pub fn with_compile_failure(
        mut self,
        stage: ShaderStage,
        diagnostic: impl Into<String>,
    ) -> Self {
        self.forced_compile_failures.insert(stage, diagnostic.into());
        self
    }

    /// Force program linking to fail with `diagnostic`.
    pub fn with_link_failure(mut self, diagnostic: impl Into<String>) -> Self {
        self.forced_link_failure = Some(diagnostic.into());
        self
    }

    /// Shared view of the calls this device records.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Copy of every call recorded so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.log.snapshot()
    }

    fn allocate_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> DeviceResult<ShaderHandle> {
        let handle = ShaderHandle(self.allocate_handle());
        let (compiled, info_log) = match self.forced_compile_failures.get(&stage) {
            Some(diagnostic) => (false, diagnostic.clone()),
            None if source.trim().is_empty() => (false, "empty shader source".to_string()),
            None => (true, String::new()),
        };
        self.shaders.insert(
            handle,
            ShaderRecord {
                stage,
                compiled,
                info_log,
            },
        );
        self.log.push(DeviceCall::CompileShader {
            shader: handle,
            stage,
        });
        Ok(handle)
    }

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        self.shaders
            .get(&shader)
            .is_some_and(|record| record.compiled)
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shaders
            .get(&shader)
            .map(|record| record.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
        self.log.push(DeviceCall::DeleteShader { shader });
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> DeviceResult<ProgramHandle> {
        let handle = ProgramHandle(self.allocate_handle());

        let failed_stage = shaders.iter().find_map(|shader| {
            self.shaders
                .get(shader)
                .and_then(|record| (!record.compiled).then_some(record.stage))
        });
        let (linked, info_log) = if let Some(diagnostic) = &self.forced_link_failure {
            (false, diagnostic.clone())
        } else if let Some(stage) = failed_stage {
            (false, format!("attached {} shader was not compiled", stage))
        } else {
            (true, String::new())
        };

        self.programs.insert(handle, ProgramRecord { linked, info_log });
        self.log.push(DeviceCall::LinkProgram {
            program: handle,
            shaders: shaders.to_vec(),
        });
        Ok(handle)
    }

    fn program_link_status(&self, program: ProgramHandle) -> bool {
        self.programs
            .get(&program)
            .is_some_and(|record| record.linked)
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.programs
            .get(&program)
            .map(|record| record.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.log.push(DeviceCall::DeleteProgram { program });
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> DeviceResult<BufferHandle> {
        let handle = BufferHandle(self.allocate_handle());
        self.log.push(DeviceCall::CreateVertexBuffer {
            buffer: handle,
            byte_len: data.len(),
        });
        Ok(handle)
    }

    fn create_vertex_array(
        &mut self,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> DeviceResult<VertexArrayHandle> {
        let handle = VertexArrayHandle(self.allocate_handle());
        self.log.push(DeviceCall::CreateVertexArray {
            array: handle,
            buffer,
            layout: *layout,
        });
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.log.push(DeviceCall::DeleteBuffer { buffer });
    }

    fn delete_vertex_array(&mut self, array: VertexArrayHandle) {
        self.log.push(DeviceCall::DeleteVertexArray { array });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.log.push(DeviceCall::Clear { color });
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.log.push(DeviceCall::UseProgram { program });
    }

    fn draw_triangles(&mut self, array: VertexArrayHandle, first: i32, count: i32) {
        self.log.push(DeviceCall::DrawTriangles { array, first, count });
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.log.push(DeviceCall::SetViewport {
            x,
            y,
            width,
            height,
        });
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
