//! Mesh data and GPU upload

use crate::device::{BufferHandle, DeviceResult, GraphicsDevice, VertexArrayHandle, VertexLayout};

/// Vertex positions plus the GPU buffer and array objects built from them
///
/// Uploaded once at startup and immutable afterwards. The renderer that
/// created a mesh owns its GPU objects and deletes them at shutdown.
#[derive(Debug)]
pub struct Mesh {
    vertex_array: VertexArrayHandle,
    vertex_buffer: BufferHandle,
    positions: Vec<[f32; 3]>,
}

impl Mesh {
    /// Upload `positions` to the device with the standard 3-float
    /// attribute layout at location 0.
    ///
    /// The buffer is filled once with static usage; if the vertex array
    /// cannot be created the buffer is released before returning.
    pub fn upload(
        device: &mut dyn GraphicsDevice,
        positions: Vec<[f32; 3]>,
    ) -> DeviceResult<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(&positions);
        let vertex_buffer = device.create_vertex_buffer(bytes)?;
        let vertex_array =
            match device.create_vertex_array(vertex_buffer, &VertexLayout::position_3d()) {
                Ok(array) => array,
                Err(e) => {
                    device.delete_buffer(vertex_buffer);
                    return Err(e);
                }
            };

        Ok(Self {
            vertex_array,
            vertex_buffer,
            positions,
        })
    }

    /// Vertex array object backing this mesh.
    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    /// Vertex buffer object backing this mesh.
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    /// The vertex positions this mesh was built from.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Number of vertices the mesh draws.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}
