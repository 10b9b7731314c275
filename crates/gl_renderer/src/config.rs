//! # Configuration System
//!
//! All startup settings live here as explicit, serializable structures:
//! window geometry and behavior, frame rendering settings, and the GLSL
//! shader pair compiled at startup. Configurations load and save as TOML
//! or RON through the [`Config`] trait.
//!
//! Every structure validates itself before use so that invalid settings
//! are rejected ahead of any platform or driver call.

use serde::{Deserialize, Serialize};

/// Vertex stage source used when no other is configured.
///
/// Passes the position attribute through to clip space unchanged.
pub const DEFAULT_VERTEX_SHADER: &str = r"#version 330 core
layout (location = 0) in vec3 aPos;
void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

/// Fragment stage source used when no other is configured.
///
/// Fills every fragment with a fixed orange.
pub const DEFAULT_FRAGMENT_SHADER: &str = r"#version 330 core
out vec4 FragColor;
void main()
{
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}
";

/// Configuration trait
///
/// Provides file loading and saving for any serializable configuration
/// structure, dispatching on the file extension.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// # Window Configuration
///
/// Size, title, and context behavior for the application window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Whether the window can be resized by the user
    pub resizable: bool,
    /// Whether presentation waits for vertical sync
    pub vsync: bool,
}

impl WindowConfig {
    /// Create a window configuration with the given title and size
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            resizable: true,
            vsync: true,
        }
    }

    /// Set whether the window can be resized
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Enable or disable vertical sync
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Window dimensions must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("OpenGL", 800, 600)
    }
}

/// # Renderer Configuration
///
/// Per-frame rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// RGBA color the framebuffer is cleared to at the start of each frame
    pub clear_color: [f32; 4],
}

impl RendererConfig {
    /// Create a renderer configuration with the default clear color
    pub fn new() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3, 1.0],
        }
    }

    /// Set the clear color
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (index, component) in self.clear_color.iter().enumerate() {
            if !(0.0..=1.0).contains(component) {
                return Err(format!(
                    "Clear color component {} out of range: {}",
                    index, component
                ));
            }
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Shader Sources
///
/// GLSL text for the vertex and fragment stages, carried as data rather
/// than compiled-in globals so applications can swap the pair out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderSources {
    /// Vertex stage GLSL source
    pub vertex: String,
    /// Fragment stage GLSL source
    pub fragment: String,
}

impl ShaderSources {
    /// Create shader sources from explicit GLSL text
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.vertex.trim().is_empty() {
            return Err("Vertex shader source is empty".to_string());
        }
        if self.fragment.trim().is_empty() {
            return Err("Fragment shader source is empty".to_string());
        }
        Ok(())
    }
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self::new(DEFAULT_VERTEX_SHADER, DEFAULT_FRAGMENT_SHADER)
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all subsystems. This is the
/// structure applications should construct, load, and validate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window and context settings
    pub window: WindowConfig,
    /// Frame rendering settings
    pub renderer: RendererConfig,
    /// Shader pair compiled at startup
    pub shaders: ShaderSources,
}

impl AppConfig {
    /// Create an application configuration with the given window title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            window: WindowConfig::new(title, 800, 600),
            renderer: RendererConfig::default(),
            shaders: ShaderSources::default(),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        self.window.validate()?;
        self.renderer.validate()?;
        self.shaders.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new("OpenGL")
    }
}

impl Config for AppConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_config_defaults() {
        let config = WindowConfig::default();
        assert_eq!(config.title, "OpenGL", "Default title should be OpenGL");
        assert_eq!(config.width, 800, "Default width should be 800");
        assert_eq!(config.height, 600, "Default height should be 600");
        assert!(config.resizable, "Windows should be resizable by default");
        assert!(config.vsync, "Vsync should be on by default");
    }

    #[test]
    fn test_window_config_rejects_zero_dimensions() {
        let config = WindowConfig::new("Test", 0, 600);
        assert!(
            config.validate().is_err(),
            "Zero width should fail validation"
        );

        let config = WindowConfig::new("Test", 800, 0);
        assert!(
            config.validate().is_err(),
            "Zero height should fail validation"
        );
    }

    #[test]
    fn test_window_config_rejects_empty_title() {
        let config = WindowConfig::new("", 800, 600);
        assert!(
            config.validate().is_err(),
            "Empty title should fail validation"
        );
    }

    #[test]
    fn test_renderer_config_default_clear_color() {
        let config = RendererConfig::default();
        assert_eq!(
            config.clear_color,
            [0.2, 0.3, 0.3, 1.0],
            "Default clear color should be the fixed teal background"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_renderer_config_rejects_out_of_range_color() {
        let config = RendererConfig::new().with_clear_color([0.2, 1.5, 0.3, 1.0]);
        assert!(
            config.validate().is_err(),
            "Color components above 1.0 should fail validation"
        );
    }

    #[test]
    fn test_default_shader_sources_are_valid() {
        let sources = ShaderSources::default();
        assert!(sources.validate().is_ok());
        assert!(
            sources.vertex.contains("#version 330 core"),
            "Vertex shader should target GLSL 330 core"
        );
        assert!(
            sources.fragment.contains("FragColor"),
            "Fragment shader should write FragColor"
        );
    }

    #[test]
    fn test_empty_shader_sources_fail_validation() {
        let sources = ShaderSources::new("", DEFAULT_FRAGMENT_SHADER);
        assert!(sources.validate().is_err());

        let sources = ShaderSources::new(DEFAULT_VERTEX_SHADER, "   \n");
        assert!(sources.validate().is_err());
    }

    #[test]
    fn test_app_config_toml_round_trip() {
        let config = AppConfig::new("Round Trip");
        let serialized = toml::to_string_pretty(&config).expect("TOML serialization failed");
        let parsed: AppConfig = toml::from_str(&serialized).expect("TOML parse failed");

        assert_eq!(parsed.window.title, "Round Trip");
        assert_eq!(parsed.window.width, config.window.width);
        assert_eq!(parsed.renderer.clear_color, config.renderer.clear_color);
        assert_eq!(parsed.shaders.vertex, config.shaders.vertex);
    }

    #[test]
    fn test_app_config_ron_round_trip() {
        let config = AppConfig::default();
        let serialized = ron::ser::to_string_pretty(&config, Default::default())
            .expect("RON serialization failed");
        let parsed: AppConfig = ron::from_str(&serialized).expect("RON parse failed");

        assert_eq!(parsed.window.title, config.window.title);
        assert_eq!(parsed.shaders.fragment, config.shaders.fragment);
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join(format!("gl_renderer_config_{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let config = AppConfig::new("File Round Trip");
        config.save_to_file(&path).expect("Saving config failed");
        let loaded = AppConfig::load_from_file(&path).expect("Loading config failed");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.window.title, "File Round Trip");
        assert_eq!(loaded.renderer.clear_color, config.renderer.clear_color);
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let config = AppConfig::default();
        let result = config.save_to_file("settings.yaml");
        assert!(
            matches!(result, Err(ConfigError::UnsupportedFormat(_))),
            "Unknown extensions should be rejected before any IO"
        );
    }

    #[test]
    fn test_app_config_validates_all_sections() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());
    }
}
