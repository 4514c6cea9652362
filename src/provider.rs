//! The native capability provider the explorer drives.
//!
//! [`XrProvider`] is the seam between the query pipeline and the OpenXR
//! loader: one method per native call, each returning either its value or the
//! raw `XrResultCode` the runtime reported. Two-call enumerations are
//! collapsed into a single method returning an owned `Vec`. The shipped
//! implementation is [`crate::native::NativeRuntime`]; tests script their own.

use crate::graphics::{BackendKind, GraphicsRequirements, SessionBinding};
use crate::result::{Version, XrResultCode};
use crate::settings::{FormFactor, ViewConfigurationType};

pub type XrCall<T> = Result<T, XrResultCode>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct InstanceHandle(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SystemId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SessionHandle(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct XrPath(pub u64);

#[derive(Clone, Debug, Eq, PartialEq)]
/// `XrExtensionProperties`.
pub struct ExtensionProperties {
    pub name: String,
    pub version: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// `XrApiLayerProperties`.
pub struct ApiLayerProperties {
    pub name: String,
    pub description: String,
    pub spec_version: Version,
    pub layer_version: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// Parameters for `xrCreateInstance`.
pub struct InstanceCreateRequest {
    pub application_name: String,
    pub api_version: Version,
    pub extensions: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// `XrInstanceProperties`.
pub struct InstanceProperties {
    pub runtime_name: String,
    pub runtime_version: Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// `XrSystemProperties` with its graphics and tracking sub-structs flattened.
pub struct SystemProperties {
    pub system_id: u64,
    pub vendor_id: u32,
    pub system_name: String,
    pub max_swapchain_image_width: u32,
    pub max_swapchain_image_height: u32,
    pub max_layer_count: u32,
    pub orientation_tracking: bool,
    pub position_tracking: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// `XrViewConfigurationProperties`.
pub struct ViewConfigurationProperties {
    pub view_configuration_type: ViewConfigurationType,
    pub fov_mutable: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
/// `XrViewConfigurationView`.
pub struct ViewConfigurationView {
    pub recommended_image_rect_width: u32,
    pub max_image_rect_width: u32,
    pub recommended_image_rect_height: u32,
    pub max_image_rect_height: u32,
    pub recommended_swapchain_sample_count: u32,
    pub max_swapchain_sample_count: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// `XrViveTrackerPathsHTCX`.
pub struct TrackerPaths {
    pub persistent: XrPath,
    pub role: XrPath,
}

/// Native OpenXR calls used by the explorer.
///
/// Vendor methods report `ERROR_FUNCTION_UNSUPPORTED` when the runtime does
/// not expose the function, the same way the runtime would for a missing
/// entry point.
pub trait XrProvider {
    fn enumerate_api_layers(&self) -> XrCall<Vec<ApiLayerProperties>>;
    fn enumerate_instance_extensions(&self) -> XrCall<Vec<ExtensionProperties>>;

    fn create_instance(&self, request: &InstanceCreateRequest) -> XrCall<InstanceHandle>;
    fn destroy_instance(&self, instance: InstanceHandle) -> XrCall<()>;
    fn instance_properties(&self, instance: InstanceHandle) -> XrCall<InstanceProperties>;

    fn get_system(&self, instance: InstanceHandle, form_factor: FormFactor) -> XrCall<SystemId>;
    fn system_properties(
        &self,
        instance: InstanceHandle,
        system: SystemId,
    ) -> XrCall<SystemProperties>;

    fn enumerate_view_configurations(
        &self,
        instance: InstanceHandle,
        system: SystemId,
    ) -> XrCall<Vec<ViewConfigurationType>>;
    fn view_configuration_properties(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<ViewConfigurationProperties>;
    fn enumerate_view_configuration_views(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<Vec<ViewConfigurationView>>;
    fn enumerate_environment_blend_modes(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<Vec<i32>>;

    fn graphics_requirements(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        backend: BackendKind,
    ) -> XrCall<GraphicsRequirements>;
    fn create_session(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        binding: &SessionBinding,
    ) -> XrCall<SessionHandle>;
    /// `instance` is the one the session was created from; session entry
    /// points are resolved through it.
    fn destroy_session(&self, instance: InstanceHandle, session: SessionHandle) -> XrCall<()>;

    fn enumerate_reference_spaces(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<i32>>;
    fn enumerate_swapchain_formats(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<i64>>;

    fn enumerate_color_spaces_fb(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<i32>>;
    fn enumerate_display_refresh_rates_fb(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<f32>>;
    fn enumerate_render_model_paths_fb(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<XrPath>>;
    fn enumerate_vive_tracker_paths_htcx(
        &self,
        instance: InstanceHandle,
    ) -> XrCall<Vec<TrackerPaths>>;
    fn enumerate_performance_metrics_counter_paths_meta(
        &self,
        instance: InstanceHandle,
    ) -> XrCall<Vec<XrPath>>;
    fn enumerate_reprojection_modes_msft(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<Vec<i32>>;
    fn enumerate_scene_compute_features_msft(
        &self,
        instance: InstanceHandle,
        system: SystemId,
    ) -> XrCall<Vec<i32>>;

    fn path_to_string(&self, instance: InstanceHandle, path: XrPath) -> XrCall<String>;
}
