//! End-to-end tests for the rendering pipeline
//!
//! These drive the full pipeline (shader build, mesh upload, frame loop,
//! shutdown) over a [`RecordingDevice`] and assert on the exact device
//! call sequence, so the behavior is pinned down without a GL context.

use approx::assert_relative_eq;

use crate::config::{RendererConfig, ShaderSources};
use crate::device::recording::{CallLog, DeviceCall, RecordingDevice};
use crate::device::{GraphicsDevice, ShaderStage};
use crate::renderer::{FrameRenderer, RendererState};

fn renderer_with_log(config: &RendererConfig) -> (FrameRenderer, CallLog) {
    let device = RecordingDevice::new();
    let log = device.log();
    (FrameRenderer::new(Box::new(device), config), log)
}

fn first_triangle() -> Vec<[f32; 3]> {
    vec![[-0.9, -0.8, 0.0], [0.1, -0.1, 0.0], [-0.4, 0.4, 0.0]]
}

fn second_triangle() -> Vec<[f32; 3]> {
    vec![[0.0, 0.4, 0.0], [0.8, 0.8, 0.0], [0.4, -0.6, 0.0]]
}

/// The default two-triangle scene, from setup through one frame.
///
/// Pins the frame down call by call: one clear in the configured color,
/// one program bind, then one draw per mesh against that mesh's vertex
/// array, in upload order.
#[test]
fn test_two_triangle_scene_renders_end_to_end() {
    let (mut renderer, log) = renderer_with_log(&RendererConfig::default());

    renderer
        .load_shaders(&ShaderSources::default())
        .expect("shader load failed");
    let first_array = renderer
        .upload_mesh(first_triangle())
        .expect("first upload failed")
        .vertex_array();
    let second_array = renderer
        .upload_mesh(second_triangle())
        .expect("second upload failed")
        .vertex_array();
    let program = renderer.program().expect("no program loaded").handle();
    assert!(renderer.program().expect("no program loaded").is_linked());

    let buffer_sizes: Vec<usize> = log
        .snapshot()
        .iter()
        .filter_map(|call| match call {
            DeviceCall::CreateVertexBuffer { byte_len, .. } => Some(*byte_len),
            _ => None,
        })
        .collect();
    assert_eq!(
        buffer_sizes,
        vec![36, 36],
        "Three vec3 positions occupy 36 bytes"
    );

    let setup_len = log.len();
    renderer.render_frame();

    let frame = log.snapshot().split_off(setup_len);
    assert_eq!(
        frame,
        vec![
            DeviceCall::Clear {
                color: [0.2, 0.3, 0.3, 1.0]
            },
            DeviceCall::UseProgram { program },
            DeviceCall::DrawTriangles {
                array: first_array,
                first: 0,
                count: 3
            },
            DeviceCall::DrawTriangles {
                array: second_array,
                first: 0,
                count: 3
            },
        ],
        "One frame is exactly clear, bind, draw, draw"
    );
}

#[test]
fn test_compile_failure_keeps_renderer_alive() {
    let device = RecordingDevice::new()
        .with_compile_failure(ShaderStage::Fragment, "0:2: 'vec4' : syntax error");
    let log = device.log();
    let mut renderer = FrameRenderer::new(Box::new(device), &RendererConfig::default());

    renderer
        .load_shaders(&ShaderSources::default())
        .expect("shader load failed");
    renderer
        .upload_mesh(first_triangle())
        .expect("upload failed");
    for _ in 0..3 {
        renderer.render_frame();
    }

    assert_eq!(renderer.state(), RendererState::Ready);
    assert_eq!(renderer.frame_count(), 3);
    assert_eq!(log.draw_count(), 3, "Frames keep drawing after the failure");
    let program = renderer.program().expect("program record missing");
    assert!(!program.is_linked());
    assert!(
        program.link_log().contains("fragment"),
        "Link log names the broken stage: {}",
        program.link_log()
    );
}

#[test]
fn test_link_failure_diagnostic_is_captured() {
    let device = RecordingDevice::new().with_link_failure("max varying vectors exceeded");
    let mut renderer = FrameRenderer::new(Box::new(device), &RendererConfig::default());

    renderer
        .load_shaders(&ShaderSources::default())
        .expect("shader load failed");

    let program = renderer.program().expect("program record missing");
    assert!(!program.is_linked());
    assert_eq!(program.link_log(), "max varying vectors exceeded");
}

#[test]
fn test_vertex_count_drives_draw_call() {
    let (mut renderer, log) = renderer_with_log(&RendererConfig::default());
    renderer
        .load_shaders(&ShaderSources::default())
        .expect("shader load failed");
    renderer
        .upload_mesh(vec![
            [0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [0.5, 0.5, 0.0],
            [0.0, 0.0, 0.0],
            [0.5, 0.5, 0.0],
        ])
        .expect("upload failed");

    renderer.render_frame();

    let calls = log.snapshot();
    assert!(
        calls
            .iter()
            .any(|call| matches!(call, DeviceCall::CreateVertexBuffer { byte_len: 60, .. })),
        "Five vec3 positions occupy 60 bytes"
    );
    assert!(
        calls
            .iter()
            .any(|call| matches!(call, DeviceCall::DrawTriangles { count: 5, first: 0, .. })),
        "The draw covers every uploaded vertex"
    );
}

#[test]
fn test_viewport_tracks_framebuffer_changes() {
    let (mut renderer, log) = renderer_with_log(&RendererConfig::default());

    renderer.resize(1280, 720);
    renderer.resize(640, 480);

    let viewports: Vec<(i32, i32, i32, i32)> = log
        .snapshot()
        .iter()
        .filter_map(|call| match call {
            DeviceCall::SetViewport {
                x,
                y,
                width,
                height,
            } => Some((*x, *y, *width, *height)),
            _ => None,
        })
        .collect();
    assert_eq!(viewports, vec![(0, 0, 1280, 720), (0, 0, 640, 480)]);
}

#[test]
fn test_clear_color_flows_from_config() {
    let config = RendererConfig::new().with_clear_color([0.05, 0.05, 0.1, 1.0]);
    let (mut renderer, log) = renderer_with_log(&config);

    renderer.render_frame();

    let color = log
        .snapshot()
        .iter()
        .find_map(|call| match call {
            DeviceCall::Clear { color } => Some(*color),
            _ => None,
        })
        .expect("no clear recorded");
    assert_relative_eq!(color[0], 0.05);
    assert_relative_eq!(color[1], 0.05);
    assert_relative_eq!(color[2], 0.1);
    assert_relative_eq!(color[3], 1.0);
}

/// Resource balance over a full lifecycle.
///
/// Every handle the pipeline creates must be deleted exactly once by the
/// time shutdown returns: stage objects after the link, meshes and the
/// program during shutdown.
#[test]
fn test_every_created_resource_is_released() {
    let (mut renderer, log) = renderer_with_log(&RendererConfig::default());

    renderer
        .load_shaders(&ShaderSources::default())
        .expect("shader load failed");
    renderer
        .upload_mesh(first_triangle())
        .expect("first upload failed");
    renderer
        .upload_mesh(second_triangle())
        .expect("second upload failed");
    renderer.render_frame();
    renderer.render_frame();
    renderer.shutdown();

    let mut created: Vec<u64> = Vec::new();
    let mut deleted: Vec<u64> = Vec::new();
    for call in log.snapshot() {
        match call {
            DeviceCall::CompileShader { shader, .. } => created.push(shader.0),
            DeviceCall::LinkProgram { program, .. } => created.push(program.0),
            DeviceCall::CreateVertexBuffer { buffer, .. } => created.push(buffer.0),
            DeviceCall::CreateVertexArray { array, .. } => created.push(array.0),
            DeviceCall::DeleteShader { shader } => deleted.push(shader.0),
            DeviceCall::DeleteProgram { program } => deleted.push(program.0),
            DeviceCall::DeleteBuffer { buffer } => deleted.push(buffer.0),
            DeviceCall::DeleteVertexArray { array } => deleted.push(array.0),
            _ => {}
        }
    }

    created.sort_unstable();
    deleted.sort_unstable();
    assert_eq!(
        created, deleted,
        "Everything created must be released exactly once"
    );
    assert_eq!(created.len(), 7, "Two stages, a program, two meshes");
}

/// The device accessor hands back the live backend for inspection.
#[test]
fn test_device_accessor_downcasts_to_the_recording_backend() {
    let (mut renderer, _log) = renderer_with_log(&RendererConfig::default());
    renderer.resize(320, 240);

    let device = renderer
        .device()
        .as_any()
        .downcast_ref::<RecordingDevice>()
        .expect("the backend behind the renderer is the recording device");
    assert_eq!(
        device.calls().len(),
        1,
        "The downcast device is the same one the renderer drives"
    );
}
