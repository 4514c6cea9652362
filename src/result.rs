//! Native `XrResult` codes and packed `XrVersion` values.
//!
//! Every native call the tool makes reports an `XrResultCode`. Codes are
//! carried as data on the tier or table they belong to and rendered through
//! [`XrResultCode::name`], which falls back to `<UNKNOWN>` for values the
//! static table does not know.

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Raw `XrResult` value returned by the loader or runtime.
pub struct XrResultCode(pub i32);

macro_rules! result_codes {
    ($($name:ident = $value:literal,)*) => {
        impl XrResultCode {
            $(pub const $name: XrResultCode = XrResultCode($value);)*

            /// Symbolic name as spelled in the OpenXR registry.
            pub fn name(self) -> &'static str {
                match self.0 {
                    $($value => concat!("XR_", stringify!($name)),)*
                    _ => "<UNKNOWN>",
                }
            }
        }
    };
}

result_codes! {
    SUCCESS = 0,
    TIMEOUT_EXPIRED = 1,
    SESSION_LOSS_PENDING = 3,
    EVENT_UNAVAILABLE = 4,
    SPACE_BOUNDS_UNAVAILABLE = 7,
    SESSION_NOT_FOCUSED = 8,
    FRAME_DISCARDED = 9,
    ERROR_VALIDATION_FAILURE = -1,
    ERROR_RUNTIME_FAILURE = -2,
    ERROR_OUT_OF_MEMORY = -3,
    ERROR_API_VERSION_UNSUPPORTED = -4,
    ERROR_INITIALIZATION_FAILED = -6,
    ERROR_FUNCTION_UNSUPPORTED = -7,
    ERROR_FEATURE_UNSUPPORTED = -8,
    ERROR_EXTENSION_NOT_PRESENT = -9,
    ERROR_LIMIT_REACHED = -10,
    ERROR_SIZE_INSUFFICIENT = -11,
    ERROR_HANDLE_INVALID = -12,
    ERROR_INSTANCE_LOST = -13,
    ERROR_SESSION_RUNNING = -14,
    ERROR_SESSION_NOT_RUNNING = -16,
    ERROR_SESSION_LOST = -17,
    ERROR_SYSTEM_INVALID = -18,
    ERROR_PATH_INVALID = -19,
    ERROR_PATH_COUNT_EXCEEDED = -20,
    ERROR_PATH_FORMAT_INVALID = -21,
    ERROR_PATH_UNSUPPORTED = -22,
    ERROR_LAYER_INVALID = -23,
    ERROR_LAYER_LIMIT_EXCEEDED = -24,
    ERROR_SWAPCHAIN_RECT_INVALID = -25,
    ERROR_SWAPCHAIN_FORMAT_UNSUPPORTED = -26,
    ERROR_ACTION_TYPE_MISMATCH = -27,
    ERROR_SESSION_NOT_READY = -28,
    ERROR_SESSION_NOT_STOPPING = -29,
    ERROR_TIME_INVALID = -30,
    ERROR_REFERENCE_SPACE_UNSUPPORTED = -31,
    ERROR_FILE_ACCESS_ERROR = -32,
    ERROR_FILE_CONTENTS_INVALID = -33,
    ERROR_FORM_FACTOR_UNSUPPORTED = -34,
    ERROR_FORM_FACTOR_UNAVAILABLE = -35,
    ERROR_API_LAYER_NOT_PRESENT = -36,
    ERROR_CALL_ORDER_INVALID = -37,
    ERROR_GRAPHICS_DEVICE_INVALID = -38,
    ERROR_POSE_INVALID = -39,
    ERROR_INDEX_OUT_OF_RANGE = -40,
    ERROR_VIEW_CONFIGURATION_TYPE_UNSUPPORTED = -41,
    ERROR_ENVIRONMENT_BLEND_MODE_UNSUPPORTED = -42,
    ERROR_NAME_DUPLICATED = -44,
    ERROR_NAME_INVALID = -45,
    ERROR_ACTIONSET_NOT_ATTACHED = -46,
    ERROR_ACTIONSETS_ALREADY_ATTACHED = -47,
    ERROR_LOCALIZED_NAME_DUPLICATED = -48,
    ERROR_LOCALIZED_NAME_INVALID = -49,
    ERROR_GRAPHICS_REQUIREMENTS_CALL_MISSING = -50,
    ERROR_RUNTIME_UNAVAILABLE = -51,
    ERROR_ANDROID_THREAD_SETTINGS_ID_INVALID_KHR = -1000003000,
    ERROR_ANDROID_THREAD_SETTINGS_FAILURE_KHR = -1000003001,
    ERROR_CREATE_SPATIAL_ANCHOR_FAILED_MSFT = -1000039001,
    ERROR_SECONDARY_VIEW_CONFIGURATION_TYPE_NOT_ENABLED_MSFT = -1000053000,
    ERROR_CONTROLLER_MODEL_KEY_INVALID_MSFT = -1000055000,
    ERROR_REPROJECTION_MODE_UNSUPPORTED_MSFT = -1000066000,
    ERROR_COMPUTE_NEW_SCENE_NOT_COMPLETED_MSFT = -1000097000,
    ERROR_SCENE_COMPONENT_ID_INVALID_MSFT = -1000097001,
    ERROR_SCENE_COMPONENT_TYPE_MISMATCH_MSFT = -1000097002,
    ERROR_SCENE_MESH_BUFFER_ID_INVALID_MSFT = -1000097003,
    ERROR_SCENE_COMPUTE_FEATURE_INCOMPATIBLE_MSFT = -1000097004,
    ERROR_SCENE_COMPUTE_CONSISTENCY_MISMATCH_MSFT = -1000097005,
    ERROR_DISPLAY_REFRESH_RATE_UNSUPPORTED_FB = -1000101000,
    ERROR_COLOR_SPACE_UNSUPPORTED_FB = -1000108000,
    ERROR_RENDER_MODEL_KEY_INVALID_FB = -1000119000,
    RENDER_MODEL_UNAVAILABLE_FB = 1000119020,
    ERROR_PERMISSION_INSUFFICIENT = -1000710000,
    ERROR_EXTENSION_DEPENDENCY_NOT_ENABLED = -1000710001,
}

impl XrResultCode {
    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub fn is_failure(self) -> bool {
        self.0 < 0
    }

    /// Converts a raw native return into `Ok(())` or the failing code.
    pub fn check(raw: i32) -> Result<(), XrResultCode> {
        let code = XrResultCode(raw);
        if code.is_failure() { Err(code) } else { Ok(()) }
    }
}

impl fmt::Display for XrResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// Packed `XrVersion`: 16 bits major, 16 bits minor, 32 bits patch.
pub struct Version(pub u64);

impl Version {
    pub const fn new(major: u16, minor: u16, patch: u32) -> Self {
        Version(((major as u64) << 48) | ((minor as u64) << 32) | patch as u64)
    }

    pub fn major(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub fn minor(self) -> u16 {
        ((self.0 >> 32) & 0xffff) as u16
    }

    pub fn patch(self) -> u32 {
        (self.0 & 0xffff_ffff) as u32
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}
