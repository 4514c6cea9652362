#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use xr_explorer::graphics::{
    BackendKind, GpuLog, GpuLogLevel, GraphicsBackends, GraphicsDevice, GraphicsRequirements,
    SessionBinding,
};
use xr_explorer::provider::{
    ApiLayerProperties, ExtensionProperties, InstanceCreateRequest, InstanceHandle,
    InstanceProperties, SessionHandle, SystemId, SystemProperties, TrackerPaths,
    ViewConfigurationProperties, ViewConfigurationView, XrCall, XrPath, XrProvider,
};
use xr_explorer::result::{Version, XrResultCode};
use xr_explorer::settings::{FormFactor, ViewConfigurationType};

pub const INSTANCE: InstanceHandle = InstanceHandle(0x10);
pub const SYSTEM: SystemId = SystemId(0x20);
pub const SESSION: SessionHandle = SessionHandle(0x30);

pub fn extension(name: &str, version: u32) -> ExtensionProperties {
    ExtensionProperties {
        name: name.to_string(),
        version,
    }
}

/// Scripted provider. Every field is the answer to one native call, and every
/// call is appended to `calls` under its OpenXR function name.
pub struct StubRuntime {
    pub layers: XrCall<Vec<ApiLayerProperties>>,
    pub extensions: XrCall<Vec<ExtensionProperties>>,
    pub instance: XrCall<InstanceHandle>,
    /// Reject API 1.1 with `ERROR_API_VERSION_UNSUPPORTED`.
    pub api_1_0_only: bool,
    pub instance_properties: XrCall<InstanceProperties>,
    /// Per form factor; anything missing fails with `ERROR_FORM_FACTOR_UNAVAILABLE`.
    pub systems: HashMap<FormFactor, SystemId>,
    pub system_names: HashMap<FormFactor, String>,
    pub view_configs: XrCall<Vec<ViewConfigurationType>>,
    pub fov_mutable: bool,
    pub views: XrCall<Vec<ViewConfigurationView>>,
    pub blend_modes: XrCall<Vec<i32>>,
    /// Backends missing here fail with `ERROR_FUNCTION_UNSUPPORTED`.
    pub requirements: HashMap<BackendKind, GraphicsRequirements>,
    pub session: XrCall<SessionHandle>,
    pub reference_spaces: XrCall<Vec<i32>>,
    pub swapchain_formats: XrCall<Vec<i64>>,
    pub color_spaces: XrCall<Vec<i32>>,
    pub refresh_rates: XrCall<Vec<f32>>,
    pub render_model_paths: XrCall<Vec<XrPath>>,
    pub tracker_paths: XrCall<Vec<TrackerPaths>>,
    pub metric_paths: XrCall<Vec<XrPath>>,
    pub reprojection_modes: XrCall<Vec<i32>>,
    pub scene_features: XrCall<Vec<i32>>,
    /// Unknown paths fail with `ERROR_PATH_INVALID`.
    pub paths: HashMap<u64, String>,

    pub calls: RefCell<Vec<&'static str>>,
    pub instance_requests: RefCell<Vec<InstanceCreateRequest>>,
    pub session_bindings: RefCell<Vec<SessionBinding>>,
    pub form_factor_requests: RefCell<Vec<FormFactor>>,
    /// Instance each session-scoped call was resolved against.
    pub session_owners: RefCell<Vec<(&'static str, InstanceHandle)>>,
}

impl StubRuntime {
    /// A runtime where everything the tool asks for exists.
    pub fn healthy() -> Self {
        let mut systems = HashMap::new();
        systems.insert(FormFactor::HEAD_MOUNTED_DISPLAY, SYSTEM);
        let mut system_names = HashMap::new();
        system_names.insert(FormFactor::HEAD_MOUNTED_DISPLAY, "Stub HMD".to_string());
        let mut paths = HashMap::new();
        paths.insert(1, "/model_fb/controller/left".to_string());
        paths.insert(2, "/user/vive_tracker_htcx/serial/T1".to_string());
        paths.insert(3, "/user/vive_tracker_htcx/role/waist".to_string());
        paths.insert(4, "/perfmetrics_meta/app/cpu_frametime".to_string());

        let view = ViewConfigurationView {
            recommended_image_rect_width: 1440,
            max_image_rect_width: 2880,
            recommended_image_rect_height: 1600,
            max_image_rect_height: 3200,
            recommended_swapchain_sample_count: 1,
            max_swapchain_sample_count: 4,
        };

        Self {
            layers: Ok(vec![ApiLayerProperties {
                name: "XR_APILAYER_LUNARG_core_validation".to_string(),
                description: "API Layer for XR_APILAYER_LUNARG_core_validation".to_string(),
                spec_version: Version::new(1, 0, 0),
                layer_version: 1,
            }]),
            extensions: Ok(vec![
                extension("XR_MND_headless", 2),
                extension("XR_KHR_opengl_enable", 10),
                extension("XR_EXT_debug_utils", 4),
            ]),
            instance: Ok(INSTANCE),
            api_1_0_only: false,
            instance_properties: Ok(InstanceProperties {
                runtime_name: "Stub Runtime".to_string(),
                runtime_version: Version::new(1, 2, 3),
            }),
            systems,
            system_names,
            view_configs: Ok(vec![ViewConfigurationType::PRIMARY_STEREO]),
            fov_mutable: true,
            views: Ok(vec![view, view]),
            blend_modes: Ok(vec![1, 3]),
            requirements: HashMap::new(),
            session: Ok(SESSION),
            reference_spaces: Ok(vec![1, 2, 3]),
            swapchain_formats: Ok(vec![29, 91]),
            color_spaces: Ok(vec![1, 2]),
            refresh_rates: Ok(vec![72.0, 90.0]),
            render_model_paths: Ok(vec![XrPath(1)]),
            tracker_paths: Ok(vec![TrackerPaths {
                persistent: XrPath(2),
                role: XrPath(3),
            }]),
            metric_paths: Ok(vec![XrPath(4)]),
            reprojection_modes: Err(XrResultCode::ERROR_FUNCTION_UNSUPPORTED),
            scene_features: Err(XrResultCode::ERROR_FUNCTION_UNSUPPORTED),
            paths,
            calls: RefCell::new(Vec::new()),
            instance_requests: RefCell::new(Vec::new()),
            session_bindings: RefCell::new(Vec::new()),
            form_factor_requests: RefCell::new(Vec::new()),
            session_owners: RefCell::new(Vec::new()),
        }
    }

    pub fn without_headless(mut self) -> Self {
        if let Ok(extensions) = &mut self.extensions {
            extensions.retain(|ext| ext.name != "XR_MND_headless");
        }
        self
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|call| **call == name).count()
    }

    /// Calls made so far, in order.
    pub fn call_log(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    fn record_session_call(&self, name: &'static str, instance: InstanceHandle) {
        self.record(name);
        self.session_owners.borrow_mut().push((name, instance));
    }
}

impl XrProvider for StubRuntime {
    fn enumerate_api_layers(&self) -> XrCall<Vec<ApiLayerProperties>> {
        self.record("xrEnumerateApiLayerProperties");
        self.layers.clone()
    }

    fn enumerate_instance_extensions(&self) -> XrCall<Vec<ExtensionProperties>> {
        self.record("xrEnumerateInstanceExtensionProperties");
        self.extensions.clone()
    }

    fn create_instance(&self, request: &InstanceCreateRequest) -> XrCall<InstanceHandle> {
        self.record("xrCreateInstance");
        self.instance_requests.borrow_mut().push(request.clone());
        if self.api_1_0_only && request.api_version != Version::new(1, 0, 0) {
            return Err(XrResultCode::ERROR_API_VERSION_UNSUPPORTED);
        }
        self.instance
    }

    fn destroy_instance(&self, _instance: InstanceHandle) -> XrCall<()> {
        self.record("xrDestroyInstance");
        Ok(())
    }

    fn instance_properties(&self, _instance: InstanceHandle) -> XrCall<InstanceProperties> {
        self.record("xrGetInstanceProperties");
        self.instance_properties.clone()
    }

    fn get_system(&self, _instance: InstanceHandle, form_factor: FormFactor) -> XrCall<SystemId> {
        self.record("xrGetSystem");
        self.form_factor_requests.borrow_mut().push(form_factor);
        self.systems
            .get(&form_factor)
            .copied()
            .ok_or(XrResultCode::ERROR_FORM_FACTOR_UNAVAILABLE)
    }

    fn system_properties(
        &self,
        _instance: InstanceHandle,
        system: SystemId,
    ) -> XrCall<SystemProperties> {
        self.record("xrGetSystemProperties");
        let name = self
            .systems
            .iter()
            .find(|(_, id)| **id == system)
            .and_then(|(form_factor, _)| self.system_names.get(form_factor))
            .cloned()
            .unwrap_or_default();
        Ok(SystemProperties {
            system_id: system.0,
            vendor_id: 0x2833,
            system_name: name,
            max_swapchain_image_width: 4096,
            max_swapchain_image_height: 4096,
            max_layer_count: 16,
            orientation_tracking: true,
            position_tracking: false,
        })
    }

    fn enumerate_view_configurations(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
    ) -> XrCall<Vec<ViewConfigurationType>> {
        self.record("xrEnumerateViewConfigurations");
        self.view_configs.clone()
    }

    fn view_configuration_properties(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<ViewConfigurationProperties> {
        self.record("xrGetViewConfigurationProperties");
        Ok(ViewConfigurationProperties {
            view_configuration_type: view,
            fov_mutable: self.fov_mutable,
        })
    }

    fn enumerate_view_configuration_views(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
        _view: ViewConfigurationType,
    ) -> XrCall<Vec<ViewConfigurationView>> {
        self.record("xrEnumerateViewConfigurationViews");
        self.views.clone()
    }

    fn enumerate_environment_blend_modes(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
        _view: ViewConfigurationType,
    ) -> XrCall<Vec<i32>> {
        self.record("xrEnumerateEnvironmentBlendModes");
        self.blend_modes.clone()
    }

    fn graphics_requirements(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
        backend: BackendKind,
    ) -> XrCall<GraphicsRequirements> {
        self.record("xrGetGraphicsRequirementsKHR");
        self.requirements
            .get(&backend)
            .copied()
            .ok_or(XrResultCode::ERROR_FUNCTION_UNSUPPORTED)
    }

    fn create_session(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
        binding: &SessionBinding,
    ) -> XrCall<SessionHandle> {
        self.record("xrCreateSession");
        self.session_bindings.borrow_mut().push(*binding);
        self.session
    }

    fn destroy_session(&self, instance: InstanceHandle, _session: SessionHandle) -> XrCall<()> {
        self.record_session_call("xrDestroySession", instance);
        Ok(())
    }

    fn enumerate_reference_spaces(
        &self,
        instance: InstanceHandle,
        _session: SessionHandle,
    ) -> XrCall<Vec<i32>> {
        self.record_session_call("xrEnumerateReferenceSpaces", instance);
        self.reference_spaces.clone()
    }

    fn enumerate_swapchain_formats(
        &self,
        instance: InstanceHandle,
        _session: SessionHandle,
    ) -> XrCall<Vec<i64>> {
        self.record_session_call("xrEnumerateSwapchainFormats", instance);
        self.swapchain_formats.clone()
    }

    fn enumerate_color_spaces_fb(
        &self,
        _instance: InstanceHandle,
        _session: SessionHandle,
    ) -> XrCall<Vec<i32>> {
        self.record("xrEnumerateColorSpacesFB");
        self.color_spaces.clone()
    }

    fn enumerate_display_refresh_rates_fb(
        &self,
        _instance: InstanceHandle,
        _session: SessionHandle,
    ) -> XrCall<Vec<f32>> {
        self.record("xrEnumerateDisplayRefreshRatesFB");
        self.refresh_rates.clone()
    }

    fn enumerate_render_model_paths_fb(
        &self,
        _instance: InstanceHandle,
        _session: SessionHandle,
    ) -> XrCall<Vec<XrPath>> {
        self.record("xrEnumerateRenderModelPathsFB");
        self.render_model_paths.clone()
    }

    fn enumerate_vive_tracker_paths_htcx(
        &self,
        _instance: InstanceHandle,
    ) -> XrCall<Vec<TrackerPaths>> {
        self.record("xrEnumerateViveTrackerPathsHTCX");
        self.tracker_paths.clone()
    }

    fn enumerate_performance_metrics_counter_paths_meta(
        &self,
        _instance: InstanceHandle,
    ) -> XrCall<Vec<XrPath>> {
        self.record("xrEnumeratePerformanceMetricsCounterPathsMETA");
        self.metric_paths.clone()
    }

    fn enumerate_reprojection_modes_msft(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
        _view: ViewConfigurationType,
    ) -> XrCall<Vec<i32>> {
        self.record("xrEnumerateReprojectionModesMSFT");
        self.reprojection_modes.clone()
    }

    fn enumerate_scene_compute_features_msft(
        &self,
        _instance: InstanceHandle,
        _system: SystemId,
    ) -> XrCall<Vec<i32>> {
        self.record("xrEnumerateSceneComputeFeaturesMSFT");
        self.scene_features.clone()
    }

    fn path_to_string(&self, _instance: InstanceHandle, path: XrPath) -> XrCall<String> {
        self.record("xrPathToString");
        self.paths
            .get(&path.0)
            .cloned()
            .ok_or(XrResultCode::ERROR_PATH_INVALID)
    }
}

/// Counters shared between a boxed [`StubDevice`] and the test that made it.
#[derive(Clone, Default)]
pub struct DeviceCounters {
    pub bindings: Rc<Cell<usize>>,
    pub releases: Rc<Cell<usize>>,
}

/// Graphics device that hands out a fixed binding or a fixed error.
pub struct StubDevice {
    kind: BackendKind,
    outcome: Result<SessionBinding, String>,
    counters: DeviceCounters,
}

impl StubDevice {
    pub fn working(kind: BackendKind, binding: SessionBinding) -> (Self, DeviceCounters) {
        Self::with_outcome(kind, Ok(binding))
    }

    pub fn failing(kind: BackendKind, message: &str) -> (Self, DeviceCounters) {
        Self::with_outcome(kind, Err(message.to_string()))
    }

    fn with_outcome(
        kind: BackendKind,
        outcome: Result<SessionBinding, String>,
    ) -> (Self, DeviceCounters) {
        let counters = DeviceCounters::default();
        let device = Self {
            kind,
            outcome,
            counters: counters.clone(),
        };
        (device, counters)
    }
}

impl GraphicsDevice for StubDevice {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn create_binding(
        &mut self,
        _requirements: &GraphicsRequirements,
        log: &GpuLog,
    ) -> Result<SessionBinding, String> {
        self.counters.bindings.set(self.counters.bindings.get() + 1);
        log.log(GpuLogLevel::Info, "stub device ready");
        self.outcome.clone()
    }

    fn release(&mut self) {
        self.counters.releases.set(self.counters.releases.get() + 1);
    }
}

/// Backends with no native devices, logging only critical lines.
pub fn no_backends() -> GraphicsBackends {
    GraphicsBackends::new(GpuLog::new(GpuLogLevel::Critical))
}
