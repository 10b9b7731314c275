//! OpenGL device backed by the `glow` bindings
//!
//! Every GL entry point is resolved at runtime through a loader closure,
//! typically the context's `get_proc_address`. All calls into the driver
//! are unsafe and stay contained behind the safe [`GraphicsDevice`]
//! surface.

use std::collections::HashMap;

use glow::HasContext;
use log::{debug, info, warn};

use super::{
    BufferHandle, DeviceError, DeviceResult, GraphicsDevice, ProgramHandle, ShaderHandle,
    ShaderStage, VertexArrayHandle, VertexLayout,
};

/// OpenGL implementation of [`GraphicsDevice`]
///
/// Owns the `glow` context and maps opaque handles to the native GL
/// objects behind them. The context the device was created against must
/// stay current for the device's whole lifetime.
pub struct GlDevice {
    gl: glow::Context,
    shaders: HashMap<ShaderHandle, glow::Shader>,
    programs: HashMap<ProgramHandle, glow::Program>,
    buffers: HashMap<BufferHandle, glow::Buffer>,
    vertex_arrays: HashMap<VertexArrayHandle, glow::VertexArray>,
    next_handle: u64,
}

impl GlDevice {
    /// Create a device by resolving GL entry points through `loader`.
    ///
    /// Fails with [`DeviceError::LoaderFailed`] when the platform cannot
    /// resolve core symbols, which happens when no context is current or
    /// the driver does not provide the requested profile.
    pub fn new<F>(mut loader: F) -> DeviceResult<Self>
    where
        F: FnMut(&str) -> *const std::ffi::c_void,
    {
        // Probe a symbol present in every core profile before handing
        // the loader to glow; glow itself never reports resolution
        // failures.
        if loader("glCreateShader").is_null() {
            return Err(DeviceError::LoaderFailed(
                "could not resolve glCreateShader".to_string(),
            ));
        }

        let gl = unsafe { glow::Context::from_loader_function(|name| loader(name)) };
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        info!("OpenGL context ready: {}", version);

        Ok(Self {
            gl,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            next_handle: 1,
        })
    }

    fn allocate_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

fn stage_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

impl GraphicsDevice for GlDevice {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> DeviceResult<ShaderHandle> {
        let shader = unsafe {
            let shader = self
                .gl
                .create_shader(stage_type(stage))
                .map_err(DeviceError::ResourceCreationFailed)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            shader
        };

        let handle = ShaderHandle(self.allocate_handle());
        self.shaders.insert(handle, shader);
        debug!("Compiled {} shader as {:?}", stage, handle);
        Ok(handle)
    }

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        self.shaders
            .get(&shader)
            .is_some_and(|native| unsafe { self.gl.get_shader_compile_status(*native) })
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shaders
            .get(&shader)
            .map(|native| unsafe { self.gl.get_shader_info_log(*native) })
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if let Some(native) = self.shaders.remove(&shader) {
            unsafe { self.gl.delete_shader(native) };
        }
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> DeviceResult<ProgramHandle> {
        let program = unsafe {
            let program = self
                .gl
                .create_program()
                .map_err(DeviceError::ResourceCreationFailed)?;
            for handle in shaders {
                match self.shaders.get(handle) {
                    Some(native) => self.gl.attach_shader(program, *native),
                    None => warn!("Skipping unknown shader {:?} during link", handle),
                }
            }
            self.gl.link_program(program);
            program
        };

        let handle = ProgramHandle(self.allocate_handle());
        self.programs.insert(handle, program);
        debug!("Linked {} stage(s) into {:?}", shaders.len(), handle);
        Ok(handle)
    }

    fn program_link_status(&self, program: ProgramHandle) -> bool {
        self.programs
            .get(&program)
            .is_some_and(|native| unsafe { self.gl.get_program_link_status(*native) })
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.programs
            .get(&program)
            .map(|native| unsafe { self.gl.get_program_info_log(*native) })
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if let Some(native) = self.programs.remove(&program) {
            unsafe { self.gl.delete_program(native) };
        }
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> DeviceResult<BufferHandle> {
        let buffer = unsafe {
            let buffer = self
                .gl
                .create_buffer()
                .map_err(DeviceError::ResourceCreationFailed)?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            buffer
        };

        let handle = BufferHandle(self.allocate_handle());
        self.buffers.insert(handle, buffer);
        debug!("Uploaded {} bytes into {:?}", data.len(), handle);
        Ok(handle)
    }

    fn create_vertex_array(
        &mut self,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> DeviceResult<VertexArrayHandle> {
        let native_buffer = self.buffers.get(&buffer).copied().ok_or_else(|| {
            DeviceError::ResourceCreationFailed(format!("unknown buffer {:?}", buffer))
        })?;

        let array = unsafe {
            let array = self
                .gl
                .create_vertex_array()
                .map_err(DeviceError::ResourceCreationFailed)?;
            self.gl.bind_vertex_array(Some(array));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(native_buffer));
            self.gl.vertex_attrib_pointer_f32(
                layout.location,
                layout.components,
                glow::FLOAT,
                false,
                layout.stride,
                layout.offset,
            );
            self.gl.enable_vertex_attrib_array(layout.location);
            // Leave no bindings behind; the array records the attribute
            // setup and is rebound per draw.
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            self.gl.bind_vertex_array(None);
            array
        };

        let handle = VertexArrayHandle(self.allocate_handle());
        self.vertex_arrays.insert(handle, array);
        debug!("Created vertex array {:?} over {:?}", handle, buffer);
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(native) = self.buffers.remove(&buffer) {
            unsafe { self.gl.delete_buffer(native) };
        }
    }

    fn delete_vertex_array(&mut self, array: VertexArrayHandle) {
        if let Some(native) = self.vertex_arrays.remove(&array) {
            unsafe { self.gl.delete_vertex_array(native) };
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        match self.programs.get(&program) {
            Some(native) => unsafe { self.gl.use_program(Some(*native)) },
            None => warn!("Cannot bind unknown program {:?}", program),
        }
    }

    fn draw_triangles(&mut self, array: VertexArrayHandle, first: i32, count: i32) {
        match self.vertex_arrays.get(&array) {
            Some(native) => unsafe {
                self.gl.bind_vertex_array(Some(*native));
                self.gl.draw_arrays(glow::TRIANGLES, first, count);
            },
            None => warn!("Cannot draw unknown vertex array {:?}", array),
        }
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl Drop for GlDevice {
    fn drop(&mut self) {
        // The renderer deletes what it owns during shutdown; anything
        // still tracked here was abandoned on an early-exit path.
        unsafe {
            for (_, shader) in self.shaders.drain() {
                self.gl.delete_shader(shader);
            }
            for (_, program) in self.programs.drain() {
                self.gl.delete_program(program);
            }
            for (_, array) in self.vertex_arrays.drain() {
                self.gl.delete_vertex_array(array);
            }
            for (_, buffer) in self.buffers.drain() {
                self.gl.delete_buffer(buffer);
            }
        }
    }
}
