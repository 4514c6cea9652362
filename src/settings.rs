//! Reload settings and the small typed values they carry.

use crate::names;
use anyhow::{Result, bail};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Raw `XrFormFactor`.
pub struct FormFactor(pub i32);

impl FormFactor {
    pub const HEAD_MOUNTED_DISPLAY: FormFactor = FormFactor(1);
    pub const HANDHELD_DISPLAY: FormFactor = FormFactor(2);
}

impl Default for FormFactor {
    fn default() -> Self {
        FormFactor::HEAD_MOUNTED_DISPLAY
    }
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match names::form_factor(self.0) {
            Some(label) => f.write_str(label),
            None => write!(f, "XrFormFactor({})", self.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Raw `XrViewConfigurationType`.
pub struct ViewConfigurationType(pub i32);

impl ViewConfigurationType {
    pub const PRIMARY_MONO: ViewConfigurationType = ViewConfigurationType(1);
    pub const PRIMARY_STEREO: ViewConfigurationType = ViewConfigurationType(2);
}

impl fmt::Display for ViewConfigurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match names::view_configuration_type(self.0) {
            Some(label) => f.write_str(label),
            None => write!(f, "XrViewConfigurationType({})", self.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
/// Which graphics API the session should be bound to.
pub enum GraphicsPreference {
    #[default]
    Auto,
    Headless,
    D3d11,
    OpenGl,
    D3d12,
}

impl GraphicsPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphicsPreference::Auto => "auto",
            GraphicsPreference::Headless => "headless",
            GraphicsPreference::D3d11 => "d3d11",
            GraphicsPreference::OpenGl => "opengl",
            GraphicsPreference::D3d12 => "d3d12",
        }
    }

    /// Case-insensitive parse of the `xrGraphics` flag value.
    pub fn parse(value: &str) -> Result<Self> {
        Ok(match value.to_ascii_lowercase().as_str() {
            "auto" => GraphicsPreference::Auto,
            "headless" => GraphicsPreference::Headless,
            "d3d11" => GraphicsPreference::D3d11,
            "opengl" => GraphicsPreference::OpenGl,
            "d3d12" => GraphicsPreference::D3d12,
            other => bail!(
                "unknown graphics preference '{other}'; expected auto, headless, d3d11, opengl, or d3d12"
            ),
        })
    }
}

impl fmt::Display for GraphicsPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Everything a reload cycle needs to know about what the caller wants.
pub struct XrSettings {
    pub form_factor: FormFactor,
    pub graphics: GraphicsPreference,
    /// Sessions are only created when this is set.
    pub allow_session: bool,
    /// `None` selects the first configuration the system reports.
    pub view_config: Option<ViewConfigurationType>,
}
