//! Graphics backends a session can be bound to.
//!
//! Sessions need a graphics binding unless the runtime offers
//! `XR_MND_headless`. Native device bootstrapping (D3D11, D3D12, OpenGL) lives
//! behind [`GraphicsDevice`]; a build registers the devices it can create in
//! [`GraphicsBackends`] and the explorer picks among them at run time from the
//! caller's [`GraphicsPreference`].

use crate::result::Version;
use crate::settings::GraphicsPreference;
use std::fmt;
use tracing::{debug, warn};

pub const HEADLESS_EXTENSION: &str = "XR_MND_headless";
pub const DEBUG_UTILS_EXTENSION: &str = "XR_EXT_debug_utils";

/// Order in which `auto` tries native backends when creating a session.
const AUTO_ORDER: [BackendKind; 3] = [BackendKind::D3d11, BackendKind::D3d12, BackendKind::OpenGl];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BackendKind {
    D3d11,
    D3d12,
    OpenGl,
    Headless,
    None,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::D3d11 => "d3d11",
            BackendKind::D3d12 => "d3d12",
            BackendKind::OpenGl => "opengl",
            BackendKind::Headless => "headless",
            BackendKind::None => "none",
        }
    }

    /// Instance extension that enables this binding.
    pub fn extension_name(self) -> Option<&'static str> {
        match self {
            BackendKind::D3d11 => Some("XR_KHR_D3D11_enable"),
            BackendKind::D3d12 => Some("XR_KHR_D3D12_enable"),
            BackendKind::OpenGl => Some("XR_KHR_opengl_enable"),
            BackendKind::Headless => Some(HEADLESS_EXTENSION),
            BackendKind::None => None,
        }
    }

    fn from_preference(preference: GraphicsPreference) -> Option<BackendKind> {
        match preference {
            GraphicsPreference::D3d11 => Some(BackendKind::D3d11),
            GraphicsPreference::D3d12 => Some(BackendKind::D3d12),
            GraphicsPreference::OpenGl => Some(BackendKind::OpenGl),
            GraphicsPreference::Headless => Some(BackendKind::Headless),
            GraphicsPreference::Auto => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What the runtime asks of a device before it will accept a binding.
pub enum GraphicsRequirements {
    /// `XrGraphicsRequirementsD3D11KHR` / `XrGraphicsRequirementsD3D12KHR`.
    D3d {
        adapter_luid: u64,
        min_feature_level: i32,
    },
    /// `XrGraphicsRequirementsOpenGLKHR`.
    OpenGl {
        min_api_version: Version,
        max_api_version: Version,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Native handles passed to `xrCreateSession` through the `next` chain.
///
/// Handles are opaque pointer-sized values owned by the device that produced
/// them; they stay valid until that device is released.
pub enum SessionBinding {
    Headless,
    D3d11 {
        device: usize,
    },
    D3d12 {
        device: usize,
        queue: usize,
    },
    OpenGlWin32 {
        hdc: usize,
        hglrc: usize,
    },
    OpenGlXlib {
        display: usize,
        visual_id: u32,
        fb_config: usize,
        drawable: usize,
        context: usize,
    },
}

impl SessionBinding {
    pub fn kind(&self) -> BackendKind {
        match self {
            SessionBinding::Headless => BackendKind::Headless,
            SessionBinding::D3d11 { .. } => BackendKind::D3d11,
            SessionBinding::D3d12 { .. } => BackendKind::D3d12,
            SessionBinding::OpenGlWin32 { .. } | SessionBinding::OpenGlXlib { .. } => {
                BackendKind::OpenGl
            }
        }
    }
}

/// A native graphics device that can back an XR session.
pub trait GraphicsDevice {
    fn kind(&self) -> BackendKind;

    /// Create (or reuse) the device and return the handles for the binding.
    ///
    /// Errors are human-readable and end up verbatim on the session tier.
    fn create_binding(
        &mut self,
        requirements: &GraphicsRequirements,
        log: &GpuLog,
    ) -> Result<SessionBinding, String>;

    /// Drop every native object the device owns. Must be safe to call twice.
    fn release(&mut self);
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// Severity of a line emitted by a graphics backend.
pub enum GpuLogLevel {
    Info = 0,
    #[default]
    Warning = 1,
    Critical = 2,
}

impl GpuLogLevel {
    /// Parse the `gpuLogLevel` flag value (`info`, `warn`, `error`).
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        Ok(match value.to_ascii_lowercase().as_str() {
            "info" => GpuLogLevel::Info,
            "warn" | "warning" => GpuLogLevel::Warning,
            "error" | "critical" => GpuLogLevel::Critical,
            other => anyhow::bail!("unknown gpu log level '{other}'; expected info, warn, or error"),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
/// Log callback handed to graphics devices; drops lines below `min`.
pub struct GpuLog {
    min: GpuLogLevel,
}

impl GpuLog {
    pub fn new(min: GpuLogLevel) -> Self {
        Self { min }
    }

    /// The printed form of a line, or `None` when it is filtered out.
    pub fn format(&self, level: GpuLogLevel, text: &str) -> Option<String> {
        (level >= self.min).then(|| format!("[{}] {}", level as i32, text))
    }

    pub fn log(&self, level: GpuLogLevel, text: &str) {
        if let Some(line) = self.format(level, text) {
            println!("{line}");
        }
    }
}

/// Graphics devices compiled into this build plus the log they report to.
#[derive(Default)]
pub struct GraphicsBackends {
    devices: Vec<Box<dyn GraphicsDevice>>,
    log: GpuLog,
}

impl GraphicsBackends {
    pub fn new(log: GpuLog) -> Self {
        Self {
            devices: Vec::new(),
            log,
        }
    }

    pub fn with_device(mut self, device: Box<dyn GraphicsDevice>) -> Self {
        self.devices.push(device);
        self
    }

    pub fn log(&self) -> &GpuLog {
        &self.log
    }

    /// Whether a device for `kind` exists in this build. Headless needs no
    /// device and is always considered available here; whether the runtime
    /// supports it is a separate extension check.
    pub fn is_available(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Headless => true,
            BackendKind::None => false,
            native => self.devices.iter().any(|device| device.kind() == native),
        }
    }

    /// Native backends to try for `preference`, in order.
    pub fn candidates(&self, preference: GraphicsPreference) -> Vec<BackendKind> {
        match preference {
            GraphicsPreference::Headless => Vec::new(),
            GraphicsPreference::Auto => AUTO_ORDER
                .into_iter()
                .filter(|kind| self.is_available(*kind))
                .collect(),
            specific => BackendKind::from_preference(specific)
                .filter(|kind| self.is_available(*kind))
                .into_iter()
                .collect(),
        }
    }

    /// Downgrade a preference this build cannot honor to `auto`.
    pub fn resolve_preference(&self, preference: GraphicsPreference) -> GraphicsPreference {
        match BackendKind::from_preference(preference) {
            Some(kind) if !self.is_available(kind) => {
                warn!(
                    requested = %preference,
                    "graphics backend not available in this build; falling back to auto"
                );
                GraphicsPreference::Auto
            }
            _ => preference,
        }
    }

    /// Ask the device for `kind` to produce a session binding.
    pub fn create_binding(
        &mut self,
        kind: BackendKind,
        requirements: &GraphicsRequirements,
    ) -> Result<SessionBinding, String> {
        let log = self.log;
        let device = self
            .devices
            .iter_mut()
            .find(|device| device.kind() == kind)
            .ok_or_else(|| format!("No {kind} device in this build"))?;
        debug!(backend = %kind, "creating graphics binding");
        device.create_binding(requirements, &log)
    }

    pub fn release_all(&mut self) {
        for device in &mut self.devices {
            device.release();
        }
    }
}
