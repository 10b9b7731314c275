//! Shader program construction
//!
//! Compiles the vertex and fragment stages, links them into a program,
//! and keeps the link diagnostics around. Stage and link failures are
//! logged and deliberately not raised: the program handle stays usable
//! so callers can decide what to do with an unlinked program, matching
//! the permissive policy of classic GL tutorial flows.

use log::error;

use crate::config::ShaderSources;
use crate::device::{DeviceResult, GraphicsDevice, ProgramHandle, ShaderHandle, ShaderStage};

/// A compiled and linked (or failed-to-link) shader program
///
/// Check [`Self::is_linked`] before trusting draw output. The renderer
/// that built the program owns its handle and deletes it at shutdown.
#[derive(Debug)]
pub struct ShaderProgram {
    handle: ProgramHandle,
    linked: bool,
    link_log: String,
}

impl ShaderProgram {
    /// Compile both stages and link them into a program.
    ///
    /// Compile and link failures are logged and leave the program
    /// marked unlinked; only driver-side object-creation failures
    /// surface as errors. Stage objects are deleted once the link has
    /// run, whatever its outcome.
    pub fn build(device: &mut dyn GraphicsDevice, sources: &ShaderSources) -> DeviceResult<Self> {
        let vertex = compile_stage(device, ShaderStage::Vertex, &sources.vertex)?;
        let fragment = match compile_stage(device, ShaderStage::Fragment, &sources.fragment) {
            Ok(handle) => handle,
            Err(e) => {
                device.delete_shader(vertex);
                return Err(e);
            }
        };

        let handle = match device.link_program(&[vertex, fragment]) {
            Ok(handle) => handle,
            Err(e) => {
                device.delete_shader(vertex);
                device.delete_shader(fragment);
                return Err(e);
            }
        };
        let linked = device.program_link_status(handle);
        let link_log = device.program_info_log(handle);
        if !linked {
            error!("Program link failed: {}", link_log);
        }

        // The program keeps the linked binary; the stage objects are no
        // longer needed once the link has run.
        device.delete_shader(vertex);
        device.delete_shader(fragment);

        Ok(Self {
            handle,
            linked,
            link_log,
        })
    }

    /// Handle identifying this program on the device.
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Whether the driver reported a successful link.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Diagnostic text captured at link time; empty on success.
    pub fn link_log(&self) -> &str {
        &self.link_log
    }
}

fn compile_stage(
    device: &mut dyn GraphicsDevice,
    stage: ShaderStage,
    source: &str,
) -> DeviceResult<ShaderHandle> {
    let handle = device.compile_shader(stage, source)?;
    if !device.shader_compile_status(handle) {
        error!(
            "{} shader compilation failed: {}",
            stage,
            device.shader_info_log(handle)
        );
    }
    Ok(handle)
}
