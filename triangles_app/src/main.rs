//! Two-triangle demo application
//!
//! Opens a window with an OpenGL 3.3 core context, compiles the built-in
//! shader pair, uploads two triangles, and renders them until Escape is
//! pressed or the window is closed.

use gl_renderer::logging;
use gl_renderer::prelude::*;

/// Left triangle of the fixed scene
const FIRST_TRIANGLE: [[f32; 3]; 3] = [[-0.9, -0.8, 0.0], [0.1, -0.1, 0.0], [-0.4, 0.4, 0.0]];

/// Right triangle of the fixed scene
const SECOND_TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.4, 0.0], [0.8, 0.8, 0.0], [0.4, -0.6, 0.0]];

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Application error: {}", e);
        std::process::exit(-1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Starting triangles demo");

    let config = AppConfig::default();
    config.validate()?;

    // The window outlives the renderer so the context is still current
    // while the renderer tears down.
    let mut window = Window::new(&config.window)?;
    let mut renderer = FrameRenderer::from_window(&mut window, &config.renderer)?;

    renderer.load_shaders(&config.shaders)?;
    renderer.upload_mesh(FIRST_TRIANGLE.to_vec())?;
    renderer.upload_mesh(SECOND_TRIANGLE.to_vec())?;

    renderer.run(&mut window);
    renderer.shutdown();

    log::info!("Clean shutdown");
    Ok(())
}
