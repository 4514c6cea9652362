//! Display labels for the raw enum values the runtime hands back.
//!
//! Enum listings only show values that have a label here; anything the table
//! does not know is skipped, matching how the registry names are spelled in
//! `openxr_reflection.h`. Swapchain formats are native graphics-API values and
//! always render, falling back to a hex/decimal description.

use crate::graphics::BackendKind;

macro_rules! label_table {
    ($(#[$meta:meta])* $fn_name:ident { $($value:literal => $label:literal,)* }) => {
        $(#[$meta])*
        pub fn $fn_name(value: i32) -> Option<&'static str> {
            match value {
                $($value => Some($label),)*
                _ => None,
            }
        }
    };
}

label_table! {
    /// `XrFormFactor` label.
    form_factor {
        1 => "XR_FORM_FACTOR_HEAD_MOUNTED_DISPLAY",
        2 => "XR_FORM_FACTOR_HANDHELD_DISPLAY",
    }
}

label_table! {
    /// `XrViewConfigurationType` label.
    view_configuration_type {
        1 => "XR_VIEW_CONFIGURATION_TYPE_PRIMARY_MONO",
        2 => "XR_VIEW_CONFIGURATION_TYPE_PRIMARY_STEREO",
        1000037000 => "XR_VIEW_CONFIGURATION_TYPE_PRIMARY_STEREO_WITH_FOVEATED_INSET",
        1000054000 => "XR_VIEW_CONFIGURATION_TYPE_SECONDARY_MONO_FIRST_PERSON_OBSERVER_MSFT",
    }
}

label_table! {
    /// `XrReferenceSpaceType` label.
    reference_space_type {
        1 => "XR_REFERENCE_SPACE_TYPE_VIEW",
        2 => "XR_REFERENCE_SPACE_TYPE_LOCAL",
        3 => "XR_REFERENCE_SPACE_TYPE_STAGE",
        1000038000 => "XR_REFERENCE_SPACE_TYPE_UNBOUNDED_MSFT",
        1000121000 => "XR_REFERENCE_SPACE_TYPE_COMBINED_EYE_VARJO",
        1000139000 => "XR_REFERENCE_SPACE_TYPE_LOCALIZATION_MAP_ML",
        1000426000 => "XR_REFERENCE_SPACE_TYPE_LOCAL_FLOOR",
    }
}

label_table! {
    /// `XrEnvironmentBlendMode` label.
    environment_blend_mode {
        1 => "XR_ENVIRONMENT_BLEND_MODE_OPAQUE",
        2 => "XR_ENVIRONMENT_BLEND_MODE_ADDITIVE",
        3 => "XR_ENVIRONMENT_BLEND_MODE_ALPHA_BLEND",
    }
}

label_table! {
    /// `XrColorSpaceFB` label.
    color_space_fb {
        0 => "XR_COLOR_SPACE_UNMANAGED_FB",
        1 => "XR_COLOR_SPACE_REC2020_FB",
        2 => "XR_COLOR_SPACE_REC709_FB",
        3 => "XR_COLOR_SPACE_RIFT_CV1_FB",
        4 => "XR_COLOR_SPACE_RIFT_S_FB",
        5 => "XR_COLOR_SPACE_QUEST_FB",
        6 => "XR_COLOR_SPACE_P3_FB",
        7 => "XR_COLOR_SPACE_ADOBE_RGB_FB",
    }
}

label_table! {
    /// `XrReprojectionModeMSFT` label.
    reprojection_mode_msft {
        1 => "XR_REPROJECTION_MODE_DEPTH_MSFT",
        2 => "XR_REPROJECTION_MODE_PLANAR_FROM_DEPTH_MSFT",
        3 => "XR_REPROJECTION_MODE_PLANAR_MANUAL_MSFT",
        4 => "XR_REPROJECTION_MODE_ORIENTATION_ONLY_MSFT",
    }
}

label_table! {
    /// `XrSceneComputeFeatureMSFT` label.
    scene_compute_feature_msft {
        1 => "XR_SCENE_COMPUTE_FEATURE_PLANE_MSFT",
        2 => "XR_SCENE_COMPUTE_FEATURE_PLANE_MESH_MSFT",
        3 => "XR_SCENE_COMPUTE_FEATURE_VISUAL_MESH_MSFT",
        4 => "XR_SCENE_COMPUTE_FEATURE_COLLIDER_MESH_MSFT",
        1000098000 => "XR_SCENE_COMPUTE_FEATURE_SERIALIZE_SCENE_MSFT",
        1000147000 => "XR_SCENE_COMPUTE_FEATURE_MARKER_MSFT",
    }
}

/// Maps a list of raw enum values through `label`, dropping unknown values.
pub fn labels(values: &[i32], label: fn(i32) -> Option<&'static str>) -> Vec<String> {
    values
        .iter()
        .filter_map(|value| label(*value))
        .map(str::to_string)
        .collect()
}

/// Label for a native swapchain format reported by a session bound to `backend`.
///
/// D3D backends report `DXGI_FORMAT` values and OpenGL reports sized internal
/// formats. Headless sessions have no native format space, so every value
/// there uses the fallback.
pub fn swapchain_format_name(backend: BackendKind, raw: i64) -> String {
    let known = match backend {
        BackendKind::D3d11 | BackendKind::D3d12 => dxgi_format(raw),
        BackendKind::OpenGl => gl_format(raw),
        BackendKind::Headless | BackendKind::None => None,
    };
    match known {
        Some(label) => label.to_string(),
        None => format!("Unknown 0x{raw:x} #{raw}"),
    }
}

fn dxgi_format(raw: i64) -> Option<&'static str> {
    Some(match raw {
        29 => "rgba32",
        28 => "rgba32 linear",
        91 => "bgra32",
        87 => "bgra32 linear",
        26 => "rg11 b10",
        24 => "rgb10 a2",
        11 => "rgba64u",
        13 => "rgba64s",
        10 => "rgba64f",
        2 => "rgba128",
        61 => "r8",
        56 => "r16",
        41 => "r32",
        45 => "depth24 stencil8",
        40 => "depth32",
        55 => "depth16",
        _ => return None,
    })
}

fn gl_format(raw: i64) -> Option<&'static str> {
    Some(match raw {
        0x8C43 => "rgba32",
        0x8058 => "rgba32 linear",
        0x8C3A => "rg11 b10",
        0x8059 => "rgb10 a2",
        0x805B => "rgba64u",
        0x8F9B => "rgba64s",
        0x881A => "rgba64f",
        0x8814 => "rgba128",
        0x8229 => "r8",
        0x822A => "r16",
        0x822E => "r32",
        0x88F0 => "depth24 stencil8",
        0x8CAC => "depth32",
        0x81A5 => "depth16",
        _ => return None,
    })
}
