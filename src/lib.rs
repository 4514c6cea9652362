//! Library behind the `openxr-explorer` CLI.
//!
//! The crate enumerates what the active OpenXR runtime supports and lays each
//! answer out as a [`Table`]. [`Explorer`] runs the reload cycle over any
//! [`XrProvider`]; [`NativeRuntime`] is the provider that talks to the real
//! loader. Rendering to text and JSON lives in [`render`] and [`report`], and
//! [`cli`] ties the pieces together for the binary.

pub mod cli;
pub mod explorer;
pub mod graphics;
pub mod names;
pub mod native;
pub mod provider;
pub mod registry;
pub mod render;
pub mod report;
pub mod result;
pub mod settings;
pub mod state;
pub mod table;

pub use explorer::{Explorer, ExtensionSet, ViewInfo};
pub use graphics::{
    BackendKind, GpuLog, GpuLogLevel, GraphicsBackends, GraphicsDevice, GraphicsRequirements,
    SessionBinding,
};
pub use native::NativeRuntime;
pub use provider::{XrCall, XrProvider};
pub use registry::{EnumFact, FactContext, FactOutput, Prerequisites, default_registry};
pub use report::Report;
pub use result::{Version, XrResultCode};
pub use settings::{FormFactor, GraphicsPreference, ViewConfigurationType, XrSettings};
pub use state::{CapabilityState, Phase, Tier, TierError, Unavailable};
pub use table::{Cell, DisplayTag, Table};
