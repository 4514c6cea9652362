//! Ordered registry of prerequisite-gated enumerations.
//!
//! Each [`EnumFact`] names one native enumeration, the tiers it needs, and a
//! loader that turns the raw values into display strings. The registry is
//! rebuilt on every reload and walked in order by the refresh engine; order
//! only affects presentation.

use crate::graphics::BackendKind;
use crate::names;
use crate::provider::{InstanceHandle, SystemId, XrCall, XrPath, XrProvider};
use crate::result::XrResultCode;
use crate::settings::ViewConfigurationType;
use crate::state::{ActiveSession, CapabilityState, TierError, Unavailable};
use crate::table::{Cell, DisplayTag, Table};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Prerequisites {
    pub instance: bool,
    pub system: bool,
    pub session: bool,
}

impl Prerequisites {
    pub const INSTANCE: Prerequisites = Prerequisites {
        instance: true,
        system: false,
        session: false,
    };
    pub const INSTANCE_SYSTEM: Prerequisites = Prerequisites {
        instance: true,
        system: true,
        session: false,
    };
    pub const SESSION: Prerequisites = Prerequisites {
        instance: false,
        system: false,
        session: true,
    };
    pub const INSTANCE_SESSION: Prerequisites = Prerequisites {
        instance: true,
        system: false,
        session: true,
    };

    /// Declared needs plus the tiers they sit on: a session needs a system,
    /// and a system needs an instance.
    pub fn implied(self) -> Prerequisites {
        let system = self.system || self.session;
        Prerequisites {
            instance: self.instance || system,
            system,
            session: self.session,
        }
    }

    /// The first unmet prerequisite, checked instance, then system, then session.
    pub fn unmet(self, state: &CapabilityState) -> Option<Unavailable> {
        let needs = self.implied();
        if needs.instance && state.instance.ready().is_none() {
            return Some(Unavailable::NoInstance);
        }
        if needs.system && state.system.ready().is_none() {
            return Some(Unavailable::NoSystem);
        }
        if needs.session && state.session.ready().is_none() {
            return Some(match state.session.error() {
                Some(TierError::Unavailable(Unavailable::SessionNotEnabled)) => {
                    Unavailable::SessionNotEnabled
                }
                _ => Unavailable::NoSession,
            });
        }
        None
    }
}

/// Handles and settings visible to a loader. Loaders only run once their
/// prerequisites are met, so the handles they declared are present.
pub struct FactContext<'a> {
    pub provider: &'a dyn XrProvider,
    pub instance: Option<InstanceHandle>,
    pub system: Option<SystemId>,
    pub session: Option<ActiveSession>,
    /// View configuration chosen for this cycle, or why there is none.
    pub view_config: XrCall<ViewConfigurationType>,
}

impl FactContext<'_> {
    fn instance(&self) -> XrCall<InstanceHandle> {
        self.instance.ok_or(XrResultCode::ERROR_HANDLE_INVALID)
    }

    fn system(&self) -> XrCall<SystemId> {
        self.system.ok_or(XrResultCode::ERROR_SYSTEM_INVALID)
    }

    fn session(&self) -> XrCall<ActiveSession> {
        self.session.ok_or(XrResultCode::ERROR_HANDLE_INVALID)
    }

    /// Path text, or the result name when the runtime cannot resolve it.
    fn path(&self, instance: InstanceHandle, path: XrPath) -> String {
        self.provider
            .path_to_string(instance, path)
            .unwrap_or_else(|code| code.name().to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Display strings from one loader plus the failure code, if any.
pub struct FactOutput {
    pub items: Vec<String>,
    pub error: Option<XrResultCode>,
}

impl From<XrCall<Vec<String>>> for FactOutput {
    fn from(call: XrCall<Vec<String>>) -> Self {
        match call {
            Ok(items) => FactOutput { items, error: None },
            Err(code) => FactOutput {
                items: Vec::new(),
                error: Some(code),
            },
        }
    }
}

pub type LoadFn = fn(&FactContext<'_>) -> FactOutput;

#[derive(Clone, Copy)]
pub struct EnumFact {
    pub name_func: &'static str,
    pub name_type: &'static str,
    pub spec: &'static str,
    pub tag: DisplayTag,
    pub needs: Prerequisites,
    pub load: LoadFn,
}

impl EnumFact {
    /// Empty single-column table carrying this fact's labels.
    pub fn blank_table(&self) -> Table {
        Table::new(self.name_func, self.name_type, self.spec, self.tag, 1)
    }

    /// Table holding the loader's items; a failure code becomes the error
    /// and any items already produced are kept alongside it.
    pub fn table(&self, output: FactOutput) -> Table {
        let mut table = self.blank_table();
        for item in output.items {
            table.push_row([Cell::text(item)]);
        }
        if let Some(code) = output.error {
            table.set_error(code.name());
        }
        table
    }

    pub fn unavailable_table(&self, reason: Unavailable) -> Table {
        self.blank_table().with_error(reason.message())
    }
}

impl std::fmt::Debug for EnumFact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumFact")
            .field("name_func", &self.name_func)
            .field("name_type", &self.name_type)
            .field("needs", &self.needs)
            .finish()
    }
}

/// Every registry enumeration, in presentation order.
pub fn default_registry() -> Vec<EnumFact> {
    vec![
        EnumFact {
            name_func: "xrEnumerateReferenceSpaces",
            name_type: "XrReferenceSpaceType",
            spec: "reference-spaces",
            tag: DisplayTag::Misc,
            needs: Prerequisites::SESSION,
            load: load_reference_spaces,
        },
        EnumFact {
            name_func: "xrEnumerateEnvironmentBlendModes",
            name_type: "XrEnvironmentBlendMode",
            spec: "XrEnvironmentBlendMode",
            tag: DisplayTag::View,
            needs: Prerequisites::INSTANCE_SYSTEM,
            load: load_environment_blend_modes,
        },
        EnumFact {
            name_func: "xrEnumerateSwapchainFormats",
            name_type: "SwapchainFormat",
            spec: "xrEnumerateSwapchainFormats",
            tag: DisplayTag::Misc,
            needs: Prerequisites::SESSION,
            load: load_swapchain_formats,
        },
        EnumFact {
            name_func: "xrEnumerateColorSpacesFB",
            name_type: "XrColorSpaceFB",
            spec: "XrColorSpaceFB",
            tag: DisplayTag::Misc,
            needs: Prerequisites::INSTANCE_SESSION,
            load: load_color_spaces,
        },
        EnumFact {
            name_func: "xrEnumerateDisplayRefreshRatesFB",
            name_type: "float",
            spec: "xrEnumerateDisplayRefreshRatesFB",
            tag: DisplayTag::Misc,
            needs: Prerequisites::INSTANCE_SESSION,
            load: load_display_refresh_rates,
        },
        EnumFact {
            name_func: "xrEnumerateRenderModelPathsFB",
            name_type: "XrRenderModelPathInfoFB",
            spec: "XrRenderModelPathInfoFB",
            tag: DisplayTag::Misc,
            needs: Prerequisites::INSTANCE_SESSION,
            load: load_render_model_paths,
        },
        EnumFact {
            name_func: "xrEnumerateViveTrackerPathsHTCX",
            name_type: "XrViveTrackerPathsHTCX",
            spec: "XrViveTrackerPathsHTCX",
            tag: DisplayTag::Misc,
            needs: Prerequisites::INSTANCE,
            load: load_tracker_paths,
        },
        EnumFact {
            name_func: "xrEnumeratePerformanceMetricsCounterPathsMETA",
            name_type: "XrPath",
            spec: "xrEnumeratePerformanceMetricsCounterPathsMETA",
            tag: DisplayTag::Misc,
            needs: Prerequisites::INSTANCE,
            load: load_metric_counter_paths,
        },
        EnumFact {
            name_func: "xrEnumerateReprojectionModesMSFT",
            name_type: "XrReprojectionModeMSFT",
            spec: "XrReprojectionModeMSFT",
            tag: DisplayTag::Misc,
            needs: Prerequisites::INSTANCE_SYSTEM,
            load: load_reprojection_modes,
        },
        EnumFact {
            name_func: "xrEnumerateSceneComputeFeaturesMSFT",
            name_type: "XrSceneComputeFeatureMSFT",
            spec: "XrSceneComputeFeatureMSFT",
            tag: DisplayTag::Misc,
            needs: Prerequisites::INSTANCE_SYSTEM,
            load: load_scene_compute_features,
        },
    ]
}

/// Whether any fact in `registry` needs a session.
pub fn needs_session(registry: &[EnumFact]) -> bool {
    registry.iter().any(|fact| fact.needs.session)
}

fn load_reference_spaces(ctx: &FactContext<'_>) -> FactOutput {
    let call = (|| -> XrCall<Vec<String>> {
        let spaces = ctx
            .provider
            .enumerate_reference_spaces(ctx.instance()?, ctx.session()?.handle)?;
        Ok(names::labels(&spaces, names::reference_space_type))
    })();
    call.into()
}

fn load_environment_blend_modes(ctx: &FactContext<'_>) -> FactOutput {
    let call = (|| -> XrCall<Vec<String>> {
        let modes = ctx.provider.enumerate_environment_blend_modes(
            ctx.instance()?,
            ctx.system()?,
            ctx.view_config?,
        )?;
        Ok(names::labels(&modes, names::environment_blend_mode))
    })();
    call.into()
}

fn load_swapchain_formats(ctx: &FactContext<'_>) -> FactOutput {
    let call: XrCall<Vec<String>> = ctx.session().and_then(|session| {
        let formats = ctx
            .provider
            .enumerate_swapchain_formats(ctx.instance()?, session.handle)?;
        let backend = match session.backend {
            BackendKind::None => BackendKind::Headless,
            kind => kind,
        };
        Ok(formats
            .into_iter()
            .map(|raw| names::swapchain_format_name(backend, raw))
            .collect())
    });
    call.into()
}

fn load_color_spaces(ctx: &FactContext<'_>) -> FactOutput {
    let call = (|| -> XrCall<Vec<String>> {
        let spaces = ctx
            .provider
            .enumerate_color_spaces_fb(ctx.instance()?, ctx.session()?.handle)?;
        Ok(names::labels(&spaces, names::color_space_fb))
    })();
    call.into()
}

fn load_display_refresh_rates(ctx: &FactContext<'_>) -> FactOutput {
    let call = (|| -> XrCall<Vec<String>> {
        let rates = ctx
            .provider
            .enumerate_display_refresh_rates_fb(ctx.instance()?, ctx.session()?.handle)?;
        Ok(rates.into_iter().map(|rate| format!("{rate:.6}")).collect())
    })();
    call.into()
}

fn load_render_model_paths(ctx: &FactContext<'_>) -> FactOutput {
    let call = (|| -> XrCall<Vec<String>> {
        let instance = ctx.instance()?;
        let paths = ctx
            .provider
            .enumerate_render_model_paths_fb(instance, ctx.session()?.handle)?;
        Ok(paths.into_iter().map(|path| ctx.path(instance, path)).collect())
    })();
    call.into()
}

fn load_tracker_paths(ctx: &FactContext<'_>) -> FactOutput {
    let call: XrCall<Vec<String>> = ctx.instance().and_then(|instance| {
        let trackers = ctx.provider.enumerate_vive_tracker_paths_htcx(instance)?;
        Ok(trackers
            .into_iter()
            .flat_map(|tracker| {
                [
                    format!("persistent: {}", ctx.path(instance, tracker.persistent)),
                    format!("role: {}", ctx.path(instance, tracker.role)),
                ]
            })
            .collect())
    });
    call.into()
}

fn load_metric_counter_paths(ctx: &FactContext<'_>) -> FactOutput {
    let call: XrCall<Vec<String>> = ctx.instance().and_then(|instance| {
        let paths = ctx
            .provider
            .enumerate_performance_metrics_counter_paths_meta(instance)?;
        Ok(paths.into_iter().map(|path| ctx.path(instance, path)).collect())
    });
    call.into()
}

fn load_reprojection_modes(ctx: &FactContext<'_>) -> FactOutput {
    let call = (|| -> XrCall<Vec<String>> {
        let modes = ctx.provider.enumerate_reprojection_modes_msft(
            ctx.instance()?,
            ctx.system()?,
            ctx.view_config?,
        )?;
        Ok(names::labels(&modes, names::reprojection_mode_msft))
    })();
    call.into()
}

fn load_scene_compute_features(ctx: &FactContext<'_>) -> FactOutput {
    let call = (|| -> XrCall<Vec<String>> {
        let features = ctx
            .provider
            .enumerate_scene_compute_features_msft(ctx.instance()?, ctx.system()?)?;
        Ok(names::labels(&features, names::scene_compute_feature_msft))
    })();
    call.into()
}
