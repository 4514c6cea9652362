//! `#[repr(C)]` mirrors of the OpenXR structures and entry points the
//! explorer calls. Handles are 64-bit on every platform the loader ships for.

#![allow(non_snake_case)]

use std::ffi::{c_char, c_void};

pub type XrResult = i32;
pub type XrInstance = u64;
pub type XrSession = u64;
pub type XrSystemId = u64;
pub type XrPath = u64;
pub type XrBool32 = u32;
pub type XrVersion = u64;
pub type XrStructureType = i32;

pub const XR_NULL_HANDLE: u64 = 0;

pub const XR_MAX_EXTENSION_NAME_SIZE: usize = 128;
pub const XR_MAX_API_LAYER_NAME_SIZE: usize = 256;
pub const XR_MAX_API_LAYER_DESCRIPTION_SIZE: usize = 256;
pub const XR_MAX_APPLICATION_NAME_SIZE: usize = 128;
pub const XR_MAX_ENGINE_NAME_SIZE: usize = 128;
pub const XR_MAX_RUNTIME_NAME_SIZE: usize = 128;
pub const XR_MAX_SYSTEM_NAME_SIZE: usize = 256;

pub const XR_TYPE_API_LAYER_PROPERTIES: XrStructureType = 1;
pub const XR_TYPE_EXTENSION_PROPERTIES: XrStructureType = 2;
pub const XR_TYPE_INSTANCE_CREATE_INFO: XrStructureType = 3;
pub const XR_TYPE_SYSTEM_GET_INFO: XrStructureType = 4;
pub const XR_TYPE_SYSTEM_PROPERTIES: XrStructureType = 5;
pub const XR_TYPE_SESSION_CREATE_INFO: XrStructureType = 8;
pub const XR_TYPE_INSTANCE_PROPERTIES: XrStructureType = 32;
pub const XR_TYPE_VIEW_CONFIGURATION_VIEW: XrStructureType = 41;
pub const XR_TYPE_VIEW_CONFIGURATION_PROPERTIES: XrStructureType = 47;
pub const XR_TYPE_GRAPHICS_BINDING_OPENGL_WIN32_KHR: XrStructureType = 1000023000;
pub const XR_TYPE_GRAPHICS_BINDING_OPENGL_XLIB_KHR: XrStructureType = 1000023001;
pub const XR_TYPE_GRAPHICS_REQUIREMENTS_OPENGL_KHR: XrStructureType = 1000023005;
pub const XR_TYPE_GRAPHICS_BINDING_D3D11_KHR: XrStructureType = 1000027000;
pub const XR_TYPE_GRAPHICS_REQUIREMENTS_D3D11_KHR: XrStructureType = 1000027002;
pub const XR_TYPE_GRAPHICS_BINDING_D3D12_KHR: XrStructureType = 1000028000;
pub const XR_TYPE_GRAPHICS_REQUIREMENTS_D3D12_KHR: XrStructureType = 1000028002;
pub const XR_TYPE_VIVE_TRACKER_PATHS_HTCX: XrStructureType = 1000103000;
pub const XR_TYPE_RENDER_MODEL_PATH_INFO_FB: XrStructureType = 1000119000;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrApiLayerProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub layerName: [c_char; XR_MAX_API_LAYER_NAME_SIZE],
    pub specVersion: XrVersion,
    pub layerVersion: u32,
    pub description: [c_char; XR_MAX_API_LAYER_DESCRIPTION_SIZE],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrExtensionProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub extensionName: [c_char; XR_MAX_EXTENSION_NAME_SIZE],
    pub extensionVersion: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrApplicationInfo {
    pub applicationName: [c_char; XR_MAX_APPLICATION_NAME_SIZE],
    pub applicationVersion: u32,
    pub engineName: [c_char; XR_MAX_ENGINE_NAME_SIZE],
    pub engineVersion: u32,
    pub apiVersion: XrVersion,
}

#[repr(C)]
pub struct XrInstanceCreateInfo {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub createFlags: u64,
    pub applicationInfo: XrApplicationInfo,
    pub enabledApiLayerCount: u32,
    pub enabledApiLayerNames: *const *const c_char,
    pub enabledExtensionCount: u32,
    pub enabledExtensionNames: *const *const c_char,
}

#[repr(C)]
pub struct XrInstanceProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub runtimeVersion: XrVersion,
    pub runtimeName: [c_char; XR_MAX_RUNTIME_NAME_SIZE],
}

#[repr(C)]
pub struct XrSystemGetInfo {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub formFactor: i32,
}

#[repr(C)]
pub struct XrSystemGraphicsProperties {
    pub maxSwapchainImageHeight: u32,
    pub maxSwapchainImageWidth: u32,
    pub maxLayerCount: u32,
}

#[repr(C)]
pub struct XrSystemTrackingProperties {
    pub orientationTracking: XrBool32,
    pub positionTracking: XrBool32,
}

#[repr(C)]
pub struct XrSystemProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub systemId: XrSystemId,
    pub vendorId: u32,
    pub systemName: [c_char; XR_MAX_SYSTEM_NAME_SIZE],
    pub graphicsProperties: XrSystemGraphicsProperties,
    pub trackingProperties: XrSystemTrackingProperties,
}

#[repr(C)]
pub struct XrViewConfigurationProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub viewConfigurationType: i32,
    pub fovMutable: XrBool32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrViewConfigurationView {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub recommendedImageRectWidth: u32,
    pub maxImageRectWidth: u32,
    pub recommendedImageRectHeight: u32,
    pub maxImageRectHeight: u32,
    pub recommendedSwapchainSampleCount: u32,
    pub maxSwapchainSampleCount: u32,
}

#[repr(C)]
pub struct XrSessionCreateInfo {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub createFlags: u64,
    pub systemId: XrSystemId,
}

#[repr(C)]
pub struct XrGraphicsBindingD3D11KHR {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub device: *mut c_void,
}

#[repr(C)]
pub struct XrGraphicsBindingD3D12KHR {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub device: *mut c_void,
    pub queue: *mut c_void,
}

#[repr(C)]
pub struct XrGraphicsBindingOpenGLWin32KHR {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub hDC: *mut c_void,
    pub hGLRC: *mut c_void,
}

#[repr(C)]
pub struct XrGraphicsBindingOpenGLXlibKHR {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub xDisplay: *mut c_void,
    pub visualid: u32,
    pub glxFBConfig: *mut c_void,
    pub glxDrawable: std::ffi::c_ulong,
    pub glxContext: *mut c_void,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct Luid {
    pub LowPart: u32,
    pub HighPart: i32,
}

#[repr(C)]
pub struct XrGraphicsRequirementsD3DKHR {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub adapterLuid: Luid,
    pub minFeatureLevel: i32,
}

#[repr(C)]
pub struct XrGraphicsRequirementsOpenGLKHR {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub minApiVersionSupported: XrVersion,
    pub maxApiVersionSupported: XrVersion,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrViveTrackerPathsHTCX {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub persistentPath: XrPath,
    pub rolePath: XrPath,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrRenderModelPathInfoFB {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub path: XrPath,
}

/// A zeroed output struct with its `type` tag set, as every OpenXR output
/// struct must be before the call that fills it.
pub trait Tagged: Sized {
    const TYPE: XrStructureType;

    fn tagged() -> Self {
        // SAFETY: every implementor is a plain repr(C) struct of integers,
        // arrays, and nullable pointers, all valid when zeroed.
        let mut value: Self = unsafe { std::mem::zeroed() };
        // SAFETY: the first field of every implementor is the i32 type tag.
        unsafe { *(&mut value as *mut Self as *mut XrStructureType) = Self::TYPE };
        value
    }
}

macro_rules! tagged {
    ($($ty:ident => $tag:ident,)*) => {
        $(impl Tagged for $ty { const TYPE: XrStructureType = $tag; })*
    };
}

tagged! {
    XrApiLayerProperties => XR_TYPE_API_LAYER_PROPERTIES,
    XrExtensionProperties => XR_TYPE_EXTENSION_PROPERTIES,
    XrInstanceProperties => XR_TYPE_INSTANCE_PROPERTIES,
    XrSystemProperties => XR_TYPE_SYSTEM_PROPERTIES,
    XrViewConfigurationProperties => XR_TYPE_VIEW_CONFIGURATION_PROPERTIES,
    XrViewConfigurationView => XR_TYPE_VIEW_CONFIGURATION_VIEW,
    XrGraphicsRequirementsOpenGLKHR => XR_TYPE_GRAPHICS_REQUIREMENTS_OPENGL_KHR,
    XrViveTrackerPathsHTCX => XR_TYPE_VIVE_TRACKER_PATHS_HTCX,
    XrRenderModelPathInfoFB => XR_TYPE_RENDER_MODEL_PATH_INFO_FB,
}

pub type PfnVoidFunction = unsafe extern "system" fn();

pub type PfnGetInstanceProcAddr = unsafe extern "system" fn(
    instance: XrInstance,
    name: *const c_char,
    function: *mut Option<PfnVoidFunction>,
) -> XrResult;

pub type PfnEnumerateApiLayerProperties = unsafe extern "system" fn(
    capacity: u32,
    count: *mut u32,
    properties: *mut XrApiLayerProperties,
) -> XrResult;

pub type PfnEnumerateInstanceExtensionProperties = unsafe extern "system" fn(
    layer_name: *const c_char,
    capacity: u32,
    count: *mut u32,
    properties: *mut XrExtensionProperties,
) -> XrResult;

pub type PfnCreateInstance = unsafe extern "system" fn(
    info: *const XrInstanceCreateInfo,
    instance: *mut XrInstance,
) -> XrResult;

pub type PfnDestroyInstance = unsafe extern "system" fn(instance: XrInstance) -> XrResult;

pub type PfnGetInstanceProperties = unsafe extern "system" fn(
    instance: XrInstance,
    properties: *mut XrInstanceProperties,
) -> XrResult;

pub type PfnGetSystem = unsafe extern "system" fn(
    instance: XrInstance,
    info: *const XrSystemGetInfo,
    system: *mut XrSystemId,
) -> XrResult;

pub type PfnGetSystemProperties = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    properties: *mut XrSystemProperties,
) -> XrResult;

pub type PfnEnumerateViewConfigurations = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    capacity: u32,
    count: *mut u32,
    types: *mut i32,
) -> XrResult;

pub type PfnGetViewConfigurationProperties = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    view: i32,
    properties: *mut XrViewConfigurationProperties,
) -> XrResult;

pub type PfnEnumerateViewConfigurationViews = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    view: i32,
    capacity: u32,
    count: *mut u32,
    views: *mut XrViewConfigurationView,
) -> XrResult;

/// `xrEnumerateEnvironmentBlendModes` and `xrEnumerateReprojectionModesMSFT`
/// share this shape.
pub type PfnEnumerateForView = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    view: i32,
    capacity: u32,
    count: *mut u32,
    values: *mut i32,
) -> XrResult;

pub type PfnEnumerateForSystem = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    capacity: u32,
    count: *mut u32,
    values: *mut i32,
) -> XrResult;

pub type PfnGetGraphicsRequirementsD3D = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    requirements: *mut XrGraphicsRequirementsD3DKHR,
) -> XrResult;

pub type PfnGetGraphicsRequirementsOpenGL = unsafe extern "system" fn(
    instance: XrInstance,
    system: XrSystemId,
    requirements: *mut XrGraphicsRequirementsOpenGLKHR,
) -> XrResult;

pub type PfnCreateSession = unsafe extern "system" fn(
    instance: XrInstance,
    info: *const XrSessionCreateInfo,
    session: *mut XrSession,
) -> XrResult;

pub type PfnDestroySession = unsafe extern "system" fn(session: XrSession) -> XrResult;

pub type PfnEnumerateForSession<T> = unsafe extern "system" fn(
    session: XrSession,
    capacity: u32,
    count: *mut u32,
    values: *mut T,
) -> XrResult;

pub type PfnEnumerateForInstance<T> = unsafe extern "system" fn(
    instance: XrInstance,
    capacity: u32,
    count: *mut u32,
    values: *mut T,
) -> XrResult;

pub type PfnPathToString = unsafe extern "system" fn(
    instance: XrInstance,
    path: XrPath,
    capacity: u32,
    count: *mut u32,
    buffer: *mut c_char,
) -> XrResult;

/// Text of a NUL-terminated fixed-size field.
pub fn fixed_str(field: &[c_char]) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Copy `text` into a fixed-size field, truncating so a NUL always fits.
pub fn write_fixed(field: &mut [c_char], text: &str) {
    let limit = field.len().saturating_sub(1);
    for (slot, byte) in field.iter_mut().zip(text.bytes().take(limit)) {
        *slot = byte as c_char;
    }
    if let Some(end) = field.get_mut(text.len().min(limit)) {
        *end = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_fields_round_trip_and_truncate() {
        let mut field = [0 as c_char; 8];
        write_fixed(&mut field, "OpenXR Explorer");
        assert_eq!(fixed_str(&field), "OpenXR ");
        write_fixed(&mut field, "abc");
        assert_eq!(fixed_str(&field), "abc");
    }

    #[test]
    fn tagged_sets_structure_type() {
        let props = XrExtensionProperties::tagged();
        assert_eq!(props.ty, XR_TYPE_EXTENSION_PROPERTIES);
        assert_eq!(props.extensionVersion, 0);
        let view = XrViewConfigurationView::tagged();
        assert_eq!(view.ty, XR_TYPE_VIEW_CONFIGURATION_VIEW);
    }
}
