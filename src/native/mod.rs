//! [`XrProvider`] backed by the Khronos OpenXR loader, loaded at run time.
//!
//! The loader library is resolved once when [`NativeRuntime::load`] runs:
//! `XR_EXPLORER_LOADER` first, then the platform's default library names.
//! Every entry point, core or vendor, is looked up through
//! `xrGetInstanceProcAddr` at call time, so a runtime that lacks a vendor
//! function reports `XR_ERROR_FUNCTION_UNSUPPORTED` for it. Without a loader
//! every call reports `XR_ERROR_RUNTIME_UNAVAILABLE`.

mod ffi;

use crate::graphics::{BackendKind, GraphicsRequirements, SessionBinding};
use crate::provider::{
    ApiLayerProperties, ExtensionProperties, InstanceCreateRequest, InstanceHandle,
    InstanceProperties, SessionHandle, SystemId, SystemProperties, TrackerPaths,
    ViewConfigurationProperties, ViewConfigurationView, XrCall, XrPath, XrProvider,
};
use crate::result::{Version, XrResultCode};
use crate::settings::{FormFactor, ViewConfigurationType};
use ffi::Tagged;
use libloading::Library;
use std::env;
use std::ffi::{CStr, CString, c_char, c_void};
use std::path::PathBuf;
use std::ptr;
use tracing::{debug, info, warn};

pub const LOADER_ENV: &str = "XR_EXPLORER_LOADER";

#[cfg(target_os = "windows")]
const DEFAULT_LIBRARIES: &[&str] = &["openxr_loader.dll"];
#[cfg(target_os = "macos")]
const DEFAULT_LIBRARIES: &[&str] = &["libopenxr_loader.dylib", "libopenxr_loader.1.dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_LIBRARIES: &[&str] = &["libopenxr_loader.so.1", "libopenxr_loader.so"];

struct Loader {
    get_instance_proc_addr: ffi::PfnGetInstanceProcAddr,
    // Keeps the entry points above valid; dropped last.
    _library: Option<Library>,
}

/// The OpenXR loader, or the reason it could not be opened.
pub struct NativeRuntime {
    loader: Option<Loader>,
}

/// Library names to try, in order.
fn candidate_libraries() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(hint) = env::var(LOADER_ENV) {
        if !hint.is_empty() {
            candidates.push(PathBuf::from(hint));
        }
    }
    candidates.extend(DEFAULT_LIBRARIES.iter().map(PathBuf::from));
    candidates
}

impl NativeRuntime {
    pub fn load() -> Self {
        for path in candidate_libraries() {
            // SAFETY: loading the OpenXR loader runs its initializers, which
            // have no preconditions beyond being a well-formed library.
            let library = match unsafe { Library::new(&path) } {
                Ok(library) => library,
                Err(err) => {
                    debug!(path = %path.display(), %err, "openxr loader not loadable");
                    continue;
                }
            };
            // SAFETY: the symbol is declared with the loader's exported signature.
            let symbol = unsafe {
                library
                    .get::<ffi::PfnGetInstanceProcAddr>(b"xrGetInstanceProcAddr\0")
                    .map(|symbol| *symbol)
            };
            match symbol {
                Ok(get_instance_proc_addr) => {
                    info!(path = %path.display(), "loaded openxr loader");
                    return Self {
                        loader: Some(Loader {
                            get_instance_proc_addr,
                            _library: Some(library),
                        }),
                    };
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "library has no xrGetInstanceProcAddr");
                }
            }
        }
        warn!("no openxr loader found; set {LOADER_ENV} to its path");
        Self::unavailable()
    }

    /// A runtime with no loader; every call fails with `XR_ERROR_RUNTIME_UNAVAILABLE`.
    pub fn unavailable() -> Self {
        Self { loader: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.loader.is_some()
    }

    /// A runtime that resolves through an in-process `xrGetInstanceProcAddr`.
    #[cfg(test)]
    fn with_proc_addr(get_instance_proc_addr: ffi::PfnGetInstanceProcAddr) -> Self {
        Self {
            loader: Some(Loader {
                get_instance_proc_addr,
                _library: None,
            }),
        }
    }

    /// Resolve `name` for `instance` (or globally for `XR_NULL_HANDLE`).
    ///
    /// # Safety
    /// `F` must be the function-pointer type matching `name`'s signature.
    unsafe fn proc<F: Copy>(&self, instance: ffi::XrInstance, name: &CStr) -> XrCall<F> {
        let loader = self
            .loader
            .as_ref()
            .ok_or(XrResultCode::ERROR_RUNTIME_UNAVAILABLE)?;
        let mut function: Option<ffi::PfnVoidFunction> = None;
        // SAFETY: `name` is NUL-terminated and `function` is a valid out slot.
        let raw = unsafe { (loader.get_instance_proc_addr)(instance, name.as_ptr(), &mut function) };
        XrResultCode::check(raw)?;
        let function = function.ok_or(XrResultCode::ERROR_FUNCTION_UNSUPPORTED)?;
        debug_assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<ffi::PfnVoidFunction>()
        );
        // SAFETY: the caller guarantees `F` is the function type for `name`.
        Ok(unsafe { std::mem::transmute_copy::<ffi::PfnVoidFunction, F>(&function) })
    }
}

/// Run the count-then-fill protocol shared by every `xrEnumerate*` call.
///
/// `call(capacity, count_out, buffer)` is invoked once with a zero capacity
/// to size the buffer, then once more to fill it.
fn enumerate<T: Clone>(
    fill: T,
    mut call: impl FnMut(u32, *mut u32, *mut T) -> ffi::XrResult,
) -> XrCall<Vec<T>> {
    let mut count = 0u32;
    XrResultCode::check(call(0, &mut count, ptr::null_mut()))?;
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut items = vec![fill; count as usize];
    XrResultCode::check(call(count, &mut count, items.as_mut_ptr()))?;
    items.truncate(count as usize);
    Ok(items)
}

fn luid_to_u64(luid: ffi::Luid) -> u64 {
    ((luid.HighPart as u32 as u64) << 32) | luid.LowPart as u64
}

impl XrProvider for NativeRuntime {
    fn enumerate_api_layers(&self) -> XrCall<Vec<ApiLayerProperties>> {
        // SAFETY: signature matches xrEnumerateApiLayerProperties.
        let f: ffi::PfnEnumerateApiLayerProperties =
            unsafe { self.proc(ffi::XR_NULL_HANDLE, c"xrEnumerateApiLayerProperties")? };
        let layers = enumerate(ffi::XrApiLayerProperties::tagged(), |cap, count, buf| {
            // SAFETY: buffer holds `cap` tagged structs or is null with cap 0.
            unsafe { f(cap, count, buf) }
        })?;
        Ok(layers
            .iter()
            .map(|layer| ApiLayerProperties {
                name: ffi::fixed_str(&layer.layerName),
                description: ffi::fixed_str(&layer.description),
                spec_version: Version(layer.specVersion),
                layer_version: layer.layerVersion,
            })
            .collect())
    }

    fn enumerate_instance_extensions(&self) -> XrCall<Vec<ExtensionProperties>> {
        // SAFETY: signature matches xrEnumerateInstanceExtensionProperties.
        let f: ffi::PfnEnumerateInstanceExtensionProperties = unsafe {
            self.proc(ffi::XR_NULL_HANDLE, c"xrEnumerateInstanceExtensionProperties")?
        };
        let extensions = enumerate(ffi::XrExtensionProperties::tagged(), |cap, count, buf| {
            // SAFETY: null layer name lists runtime and implicit layer extensions.
            unsafe { f(ptr::null(), cap, count, buf) }
        })?;
        Ok(extensions
            .iter()
            .map(|ext| ExtensionProperties {
                name: ffi::fixed_str(&ext.extensionName),
                version: ext.extensionVersion,
            })
            .collect())
    }

    fn create_instance(&self, request: &InstanceCreateRequest) -> XrCall<InstanceHandle> {
        // SAFETY: signature matches xrCreateInstance.
        let f: ffi::PfnCreateInstance =
            unsafe { self.proc(ffi::XR_NULL_HANDLE, c"xrCreateInstance")? };

        let names: Vec<CString> = request
            .extensions
            .iter()
            .filter_map(|name| CString::new(name.as_str()).ok())
            .collect();
        let name_ptrs: Vec<*const c_char> = names.iter().map(|name| name.as_ptr()).collect();

        let mut application = ffi::XrApplicationInfo {
            applicationName: [0; ffi::XR_MAX_APPLICATION_NAME_SIZE],
            applicationVersion: 1,
            engineName: [0; ffi::XR_MAX_ENGINE_NAME_SIZE],
            engineVersion: 1,
            apiVersion: request.api_version.0,
        };
        ffi::write_fixed(&mut application.applicationName, &request.application_name);
        ffi::write_fixed(&mut application.engineName, "None");

        let info = ffi::XrInstanceCreateInfo {
            ty: ffi::XR_TYPE_INSTANCE_CREATE_INFO,
            next: ptr::null(),
            createFlags: 0,
            applicationInfo: application,
            enabledApiLayerCount: 0,
            enabledApiLayerNames: ptr::null(),
            enabledExtensionCount: name_ptrs.len() as u32,
            enabledExtensionNames: if name_ptrs.is_empty() {
                ptr::null()
            } else {
                name_ptrs.as_ptr()
            },
        };
        let mut instance = ffi::XR_NULL_HANDLE;
        // SAFETY: `info` and the name strings outlive the call.
        XrResultCode::check(unsafe { f(&info, &mut instance) })?;
        Ok(InstanceHandle(instance))
    }

    fn destroy_instance(&self, instance: InstanceHandle) -> XrCall<()> {
        // SAFETY: signature matches xrDestroyInstance.
        let f: ffi::PfnDestroyInstance = unsafe { self.proc(instance.0, c"xrDestroyInstance")? };
        // SAFETY: the handle came from create_instance and is destroyed once.
        XrResultCode::check(unsafe { f(instance.0) })
    }

    fn instance_properties(&self, instance: InstanceHandle) -> XrCall<InstanceProperties> {
        // SAFETY: signature matches xrGetInstanceProperties.
        let f: ffi::PfnGetInstanceProperties =
            unsafe { self.proc(instance.0, c"xrGetInstanceProperties")? };
        let mut properties = ffi::XrInstanceProperties::tagged();
        // SAFETY: `properties` is a tagged output struct.
        XrResultCode::check(unsafe { f(instance.0, &mut properties) })?;
        Ok(InstanceProperties {
            runtime_name: ffi::fixed_str(&properties.runtimeName),
            runtime_version: Version(properties.runtimeVersion),
        })
    }

    fn get_system(&self, instance: InstanceHandle, form_factor: FormFactor) -> XrCall<SystemId> {
        // SAFETY: signature matches xrGetSystem.
        let f: ffi::PfnGetSystem = unsafe { self.proc(instance.0, c"xrGetSystem")? };
        let info = ffi::XrSystemGetInfo {
            ty: ffi::XR_TYPE_SYSTEM_GET_INFO,
            next: ptr::null(),
            formFactor: form_factor.0,
        };
        let mut system = 0;
        // SAFETY: `info` and `system` are valid for the call.
        XrResultCode::check(unsafe { f(instance.0, &info, &mut system) })?;
        Ok(SystemId(system))
    }

    fn system_properties(
        &self,
        instance: InstanceHandle,
        system: SystemId,
    ) -> XrCall<SystemProperties> {
        // SAFETY: signature matches xrGetSystemProperties.
        let f: ffi::PfnGetSystemProperties =
            unsafe { self.proc(instance.0, c"xrGetSystemProperties")? };
        let mut properties = ffi::XrSystemProperties::tagged();
        // SAFETY: `properties` is a tagged output struct.
        XrResultCode::check(unsafe { f(instance.0, system.0, &mut properties) })?;
        Ok(SystemProperties {
            system_id: properties.systemId,
            vendor_id: properties.vendorId,
            system_name: ffi::fixed_str(&properties.systemName),
            max_swapchain_image_width: properties.graphicsProperties.maxSwapchainImageWidth,
            max_swapchain_image_height: properties.graphicsProperties.maxSwapchainImageHeight,
            max_layer_count: properties.graphicsProperties.maxLayerCount,
            orientation_tracking: properties.trackingProperties.orientationTracking != 0,
            position_tracking: properties.trackingProperties.positionTracking != 0,
        })
    }

    fn enumerate_view_configurations(
        &self,
        instance: InstanceHandle,
        system: SystemId,
    ) -> XrCall<Vec<ViewConfigurationType>> {
        // SAFETY: signature matches xrEnumerateViewConfigurations.
        let f: ffi::PfnEnumerateViewConfigurations =
            unsafe { self.proc(instance.0, c"xrEnumerateViewConfigurations")? };
        let types = enumerate(0i32, |cap, count, buf| {
            // SAFETY: buffer holds `cap` values or is null with cap 0.
            unsafe { f(instance.0, system.0, cap, count, buf) }
        })?;
        Ok(types.into_iter().map(ViewConfigurationType).collect())
    }

    fn view_configuration_properties(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<ViewConfigurationProperties> {
        // SAFETY: signature matches xrGetViewConfigurationProperties.
        let f: ffi::PfnGetViewConfigurationProperties =
            unsafe { self.proc(instance.0, c"xrGetViewConfigurationProperties")? };
        let mut properties = ffi::XrViewConfigurationProperties::tagged();
        // SAFETY: `properties` is a tagged output struct.
        XrResultCode::check(unsafe { f(instance.0, system.0, view.0, &mut properties) })?;
        Ok(ViewConfigurationProperties {
            view_configuration_type: ViewConfigurationType(properties.viewConfigurationType),
            fov_mutable: properties.fovMutable != 0,
        })
    }

    fn enumerate_view_configuration_views(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<Vec<ViewConfigurationView>> {
        // SAFETY: signature matches xrEnumerateViewConfigurationViews.
        let f: ffi::PfnEnumerateViewConfigurationViews =
            unsafe { self.proc(instance.0, c"xrEnumerateViewConfigurationViews")? };
        let views = enumerate(ffi::XrViewConfigurationView::tagged(), |cap, count, buf| {
            // SAFETY: buffer holds `cap` tagged structs or is null with cap 0.
            unsafe { f(instance.0, system.0, view.0, cap, count, buf) }
        })?;
        Ok(views
            .iter()
            .map(|v| ViewConfigurationView {
                recommended_image_rect_width: v.recommendedImageRectWidth,
                max_image_rect_width: v.maxImageRectWidth,
                recommended_image_rect_height: v.recommendedImageRectHeight,
                max_image_rect_height: v.maxImageRectHeight,
                recommended_swapchain_sample_count: v.recommendedSwapchainSampleCount,
                max_swapchain_sample_count: v.maxSwapchainSampleCount,
            })
            .collect())
    }

    fn enumerate_environment_blend_modes(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<Vec<i32>> {
        // SAFETY: signature matches xrEnumerateEnvironmentBlendModes.
        let f: ffi::PfnEnumerateForView =
            unsafe { self.proc(instance.0, c"xrEnumerateEnvironmentBlendModes")? };
        enumerate(0i32, |cap, count, buf| {
            // SAFETY: buffer holds `cap` values or is null with cap 0.
            unsafe { f(instance.0, system.0, view.0, cap, count, buf) }
        })
    }

    fn graphics_requirements(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        backend: BackendKind,
    ) -> XrCall<GraphicsRequirements> {
        match backend {
            BackendKind::D3d11 | BackendKind::D3d12 => {
                let (name, ty) = if backend == BackendKind::D3d11 {
                    (
                        c"xrGetD3D11GraphicsRequirementsKHR",
                        ffi::XR_TYPE_GRAPHICS_REQUIREMENTS_D3D11_KHR,
                    )
                } else {
                    (
                        c"xrGetD3D12GraphicsRequirementsKHR",
                        ffi::XR_TYPE_GRAPHICS_REQUIREMENTS_D3D12_KHR,
                    )
                };
                // SAFETY: both D3D requirement calls share this signature.
                let f: ffi::PfnGetGraphicsRequirementsD3D = unsafe { self.proc(instance.0, name)? };
                let mut requirements = ffi::XrGraphicsRequirementsD3DKHR {
                    ty,
                    next: ptr::null_mut(),
                    adapterLuid: ffi::Luid {
                        LowPart: 0,
                        HighPart: 0,
                    },
                    minFeatureLevel: 0,
                };
                // SAFETY: `requirements` is a tagged output struct.
                XrResultCode::check(unsafe { f(instance.0, system.0, &mut requirements) })?;
                Ok(GraphicsRequirements::D3d {
                    adapter_luid: luid_to_u64(requirements.adapterLuid),
                    min_feature_level: requirements.minFeatureLevel,
                })
            }
            BackendKind::OpenGl => {
                // SAFETY: signature matches xrGetOpenGLGraphicsRequirementsKHR.
                let f: ffi::PfnGetGraphicsRequirementsOpenGL =
                    unsafe { self.proc(instance.0, c"xrGetOpenGLGraphicsRequirementsKHR")? };
                let mut requirements = ffi::XrGraphicsRequirementsOpenGLKHR::tagged();
                // SAFETY: `requirements` is a tagged output struct.
                XrResultCode::check(unsafe { f(instance.0, system.0, &mut requirements) })?;
                Ok(GraphicsRequirements::OpenGl {
                    min_api_version: Version(requirements.minApiVersionSupported),
                    max_api_version: Version(requirements.maxApiVersionSupported),
                })
            }
            BackendKind::Headless | BackendKind::None => {
                Err(XrResultCode::ERROR_GRAPHICS_DEVICE_INVALID)
            }
        }
    }

    fn create_session(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        binding: &SessionBinding,
    ) -> XrCall<SessionHandle> {
        // SAFETY: signature matches xrCreateSession.
        let f: ffi::PfnCreateSession = unsafe { self.proc(instance.0, c"xrCreateSession")? };

        let d3d11;
        let d3d12;
        let gl_win32;
        let gl_xlib;
        let next: *const c_void = match *binding {
            SessionBinding::Headless => ptr::null(),
            SessionBinding::D3d11 { device } => {
                d3d11 = ffi::XrGraphicsBindingD3D11KHR {
                    ty: ffi::XR_TYPE_GRAPHICS_BINDING_D3D11_KHR,
                    next: ptr::null(),
                    device: device as *mut c_void,
                };
                &d3d11 as *const _ as *const c_void
            }
            SessionBinding::D3d12 { device, queue } => {
                d3d12 = ffi::XrGraphicsBindingD3D12KHR {
                    ty: ffi::XR_TYPE_GRAPHICS_BINDING_D3D12_KHR,
                    next: ptr::null(),
                    device: device as *mut c_void,
                    queue: queue as *mut c_void,
                };
                &d3d12 as *const _ as *const c_void
            }
            SessionBinding::OpenGlWin32 { hdc, hglrc } => {
                gl_win32 = ffi::XrGraphicsBindingOpenGLWin32KHR {
                    ty: ffi::XR_TYPE_GRAPHICS_BINDING_OPENGL_WIN32_KHR,
                    next: ptr::null(),
                    hDC: hdc as *mut c_void,
                    hGLRC: hglrc as *mut c_void,
                };
                &gl_win32 as *const _ as *const c_void
            }
            SessionBinding::OpenGlXlib {
                display,
                visual_id,
                fb_config,
                drawable,
                context,
            } => {
                gl_xlib = ffi::XrGraphicsBindingOpenGLXlibKHR {
                    ty: ffi::XR_TYPE_GRAPHICS_BINDING_OPENGL_XLIB_KHR,
                    next: ptr::null(),
                    xDisplay: display as *mut c_void,
                    visualid: visual_id,
                    glxFBConfig: fb_config as *mut c_void,
                    glxDrawable: drawable as std::ffi::c_ulong,
                    glxContext: context as *mut c_void,
                };
                &gl_xlib as *const _ as *const c_void
            }
        };

        let info = ffi::XrSessionCreateInfo {
            ty: ffi::XR_TYPE_SESSION_CREATE_INFO,
            next,
            createFlags: 0,
            systemId: system.0,
        };
        let mut session = ffi::XR_NULL_HANDLE;
        // SAFETY: `info` and the binding it points at live until the call returns.
        XrResultCode::check(unsafe { f(instance.0, &info, &mut session) })?;
        Ok(SessionHandle(session))
    }

    fn destroy_session(&self, instance: InstanceHandle, session: SessionHandle) -> XrCall<()> {
        // SAFETY: signature matches xrDestroySession.
        let f: ffi::PfnDestroySession = unsafe { self.proc(instance.0, c"xrDestroySession")? };
        // SAFETY: the handle came from create_session and is destroyed once.
        XrResultCode::check(unsafe { f(session.0) })
    }

    fn enumerate_reference_spaces(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<i32>> {
        self.session_enum(instance, session, c"xrEnumerateReferenceSpaces", 0i32)
    }

    fn enumerate_swapchain_formats(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<i64>> {
        self.session_enum(instance, session, c"xrEnumerateSwapchainFormats", 0i64)
    }

    fn enumerate_color_spaces_fb(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<i32>> {
        self.session_enum(instance, session, c"xrEnumerateColorSpacesFB", 0i32)
    }

    fn enumerate_display_refresh_rates_fb(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<f32>> {
        self.session_enum(instance, session, c"xrEnumerateDisplayRefreshRatesFB", 0f32)
    }

    fn enumerate_render_model_paths_fb(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
    ) -> XrCall<Vec<XrPath>> {
        let infos = self.session_enum(
            instance,
            session,
            c"xrEnumerateRenderModelPathsFB",
            ffi::XrRenderModelPathInfoFB::tagged(),
        )?;
        Ok(infos.iter().map(|info| XrPath(info.path)).collect())
    }

    fn enumerate_vive_tracker_paths_htcx(
        &self,
        instance: InstanceHandle,
    ) -> XrCall<Vec<TrackerPaths>> {
        let trackers = self.instance_enum(
            instance,
            c"xrEnumerateViveTrackerPathsHTCX",
            ffi::XrViveTrackerPathsHTCX::tagged(),
        )?;
        Ok(trackers
            .iter()
            .map(|tracker| TrackerPaths {
                persistent: XrPath(tracker.persistentPath),
                role: XrPath(tracker.rolePath),
            })
            .collect())
    }

    fn enumerate_performance_metrics_counter_paths_meta(
        &self,
        instance: InstanceHandle,
    ) -> XrCall<Vec<XrPath>> {
        let paths = self.instance_enum(
            instance,
            c"xrEnumeratePerformanceMetricsCounterPathsMETA",
            0u64,
        )?;
        Ok(paths.into_iter().map(XrPath).collect())
    }

    fn enumerate_reprojection_modes_msft(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        view: ViewConfigurationType,
    ) -> XrCall<Vec<i32>> {
        // SAFETY: signature matches xrEnumerateReprojectionModesMSFT.
        let f: ffi::PfnEnumerateForView =
            unsafe { self.proc(instance.0, c"xrEnumerateReprojectionModesMSFT")? };
        enumerate(0i32, |cap, count, buf| {
            // SAFETY: buffer holds `cap` values or is null with cap 0.
            unsafe { f(instance.0, system.0, view.0, cap, count, buf) }
        })
    }

    fn enumerate_scene_compute_features_msft(
        &self,
        instance: InstanceHandle,
        system: SystemId,
    ) -> XrCall<Vec<i32>> {
        // SAFETY: signature matches xrEnumerateSceneComputeFeaturesMSFT.
        let f: ffi::PfnEnumerateForSystem =
            unsafe { self.proc(instance.0, c"xrEnumerateSceneComputeFeaturesMSFT")? };
        enumerate(0i32, |cap, count, buf| {
            // SAFETY: buffer holds `cap` values or is null with cap 0.
            unsafe { f(instance.0, system.0, cap, count, buf) }
        })
    }

    fn path_to_string(&self, instance: InstanceHandle, path: XrPath) -> XrCall<String> {
        // SAFETY: signature matches xrPathToString.
        let f: ffi::PfnPathToString = unsafe { self.proc(instance.0, c"xrPathToString")? };
        let buffer = enumerate(0 as c_char, |cap, count, buf| {
            // SAFETY: buffer holds `cap` chars or is null with cap 0.
            unsafe { f(instance.0, path.0, cap, count, buf) }
        })?;
        Ok(ffi::fixed_str(&buffer))
    }
}

impl NativeRuntime {
    /// `xr*(session, capacity, count, values)`, resolved against the
    /// instance that owns the session.
    fn session_enum<T: Copy>(
        &self,
        instance: InstanceHandle,
        session: SessionHandle,
        name: &CStr,
        fill: T,
    ) -> XrCall<Vec<T>> {
        // SAFETY: every caller names a function of shape PfnEnumerateForSession<T>.
        let f: ffi::PfnEnumerateForSession<T> = unsafe { self.proc(instance.0, name)? };
        enumerate(fill, |cap, count, buf| {
            // SAFETY: buffer holds `cap` values or is null with cap 0.
            unsafe { f(session.0, cap, count, buf) }
        })
    }

    fn instance_enum<T: Copy>(&self, instance: InstanceHandle, name: &CStr, fill: T) -> XrCall<Vec<T>> {
        // SAFETY: every caller names a function of shape PfnEnumerateForInstance<T>.
        let f: ffi::PfnEnumerateForInstance<T> = unsafe { self.proc(instance.0, name)? };
        enumerate(fill, |cap, count, buf| {
            // SAFETY: buffer holds `cap` values or is null with cap 0.
            unsafe { f(instance.0, cap, count, buf) }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const OWNER: ffi::XrInstance = 0x51;
    const SESSION: ffi::XrSession = 0x52;
    static DESTROYED_SESSIONS: AtomicUsize = AtomicUsize::new(0);

    unsafe fn fill_from<T: Copy>(source: &[T], capacity: u32, count: *mut u32, values: *mut T) {
        unsafe {
            *count = source.len() as u32;
            if capacity as usize >= source.len() {
                ptr::copy_nonoverlapping(source.as_ptr(), values, source.len());
            }
        }
    }

    unsafe extern "system" fn reference_spaces(
        session: ffi::XrSession,
        capacity: u32,
        count: *mut u32,
        values: *mut i32,
    ) -> ffi::XrResult {
        if session != SESSION {
            return XrResultCode::ERROR_HANDLE_INVALID.0;
        }
        unsafe { fill_from(&[1i32, 2, 3], capacity, count, values) };
        0
    }

    unsafe extern "system" fn swapchain_formats(
        session: ffi::XrSession,
        capacity: u32,
        count: *mut u32,
        values: *mut i64,
    ) -> ffi::XrResult {
        if session != SESSION {
            return XrResultCode::ERROR_HANDLE_INVALID.0;
        }
        unsafe { fill_from(&[29i64, 43], capacity, count, values) };
        0
    }

    unsafe extern "system" fn destroy_session(session: ffi::XrSession) -> ffi::XrResult {
        if session != SESSION {
            return XrResultCode::ERROR_HANDLE_INVALID.0;
        }
        DESTROYED_SESSIONS.fetch_add(1, Ordering::SeqCst);
        0
    }

    // Mirrors the Khronos loader: only the global functions resolve
    // against XR_NULL_HANDLE.
    unsafe extern "system" fn loader_proc_addr(
        instance: ffi::XrInstance,
        name: *const c_char,
        function: *mut Option<ffi::PfnVoidFunction>,
    ) -> ffi::XrResult {
        let name = unsafe { CStr::from_ptr(name) };
        let global = [
            c"xrEnumerateApiLayerProperties",
            c"xrEnumerateInstanceExtensionProperties",
            c"xrCreateInstance",
            c"xrInitializeLoaderKHR",
        ];
        unsafe { *function = None };
        if instance == ffi::XR_NULL_HANDLE && !global.contains(&name) {
            return XrResultCode::ERROR_HANDLE_INVALID.0;
        }
        if instance != ffi::XR_NULL_HANDLE && instance != OWNER {
            return XrResultCode::ERROR_HANDLE_INVALID.0;
        }
        // SAFETY: every arm erases a concrete extern "system" fn pointer.
        let found = unsafe {
            if name == c"xrEnumerateReferenceSpaces" {
                std::mem::transmute::<ffi::PfnEnumerateForSession<i32>, ffi::PfnVoidFunction>(
                    reference_spaces,
                )
            } else if name == c"xrEnumerateSwapchainFormats" {
                std::mem::transmute::<ffi::PfnEnumerateForSession<i64>, ffi::PfnVoidFunction>(
                    swapchain_formats,
                )
            } else if name == c"xrDestroySession" {
                std::mem::transmute::<ffi::PfnDestroySession, ffi::PfnVoidFunction>(destroy_session)
            } else {
                return XrResultCode::ERROR_FUNCTION_UNSUPPORTED.0;
            }
        };
        unsafe { *function = Some(found) };
        0
    }

    #[test]
    fn session_calls_resolve_through_the_owning_instance() {
        let runtime = NativeRuntime::with_proc_addr(loader_proc_addr);
        let (instance, session) = (InstanceHandle(OWNER), SessionHandle(SESSION));

        assert_eq!(runtime.enumerate_reference_spaces(instance, session), Ok(vec![1, 2, 3]));
        assert_eq!(runtime.enumerate_swapchain_formats(instance, session), Ok(vec![29, 43]));

        let before = DESTROYED_SESSIONS.load(Ordering::SeqCst);
        assert_eq!(runtime.destroy_session(instance, session), Ok(()));
        assert_eq!(DESTROYED_SESSIONS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn instance_functions_do_not_resolve_globally() {
        let runtime = NativeRuntime::with_proc_addr(loader_proc_addr);
        let null = InstanceHandle(ffi::XR_NULL_HANDLE);
        assert_eq!(
            runtime.enumerate_reference_spaces(null, SessionHandle(SESSION)),
            Err(XrResultCode::ERROR_HANDLE_INVALID)
        );
        assert_eq!(
            runtime.instance_properties(InstanceHandle(OWNER)),
            Err(XrResultCode::ERROR_FUNCTION_UNSUPPORTED)
        );
    }

    #[test]
    fn missing_loader_reports_runtime_unavailable() {
        let runtime = NativeRuntime::unavailable();
        assert!(!runtime.is_loaded());
        assert_eq!(
            runtime.enumerate_instance_extensions(),
            Err(XrResultCode::ERROR_RUNTIME_UNAVAILABLE)
        );
        assert_eq!(
            runtime.get_system(InstanceHandle(1), FormFactor::default()),
            Err(XrResultCode::ERROR_RUNTIME_UNAVAILABLE)
        );
    }

    #[test]
    fn enumerate_sizes_then_fills() {
        let source = [5i32, 6, 7];
        let mut calls = 0;
        let items = enumerate(0i32, |cap, count, buf| {
            calls += 1;
            unsafe {
                *count = source.len() as u32;
                if cap > 0 {
                    ptr::copy_nonoverlapping(source.as_ptr(), buf, cap as usize);
                }
            }
            0
        })
        .unwrap();
        assert_eq!(items, vec![5, 6, 7]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn enumerate_surfaces_first_failure() {
        let result = enumerate(0i32, |_, _, _| XrResultCode::ERROR_SESSION_LOST.0);
        assert_eq!(result, Err(XrResultCode::ERROR_SESSION_LOST));
    }

    #[test]
    fn luid_packs_high_over_low() {
        let luid = ffi::Luid {
            LowPart: 0x0000_beef,
            HighPart: 1,
        };
        assert_eq!(luid_to_u64(luid), 0x1_0000_beef);
    }
}
