//! Reload protocol and refresh engine.
//!
//! [`Explorer`] owns everything one reload cycle produces: the capability
//! tiers, the extension and view caches, the registry, and the tables. A
//! reload always starts from a full release, walks the tiers bottom-up, and
//! ends with exactly one table per core query and per registry fact. Native
//! failures are recorded on the tier or table they belong to; nothing here
//! returns early because a query failed.

use crate::graphics::{
    BackendKind, DEBUG_UTILS_EXTENSION, GraphicsBackends, HEADLESS_EXTENSION, SessionBinding,
};
use crate::provider::{
    ApiLayerProperties, ExtensionProperties, InstanceCreateRequest, InstanceHandle,
    InstanceProperties, SystemId, SystemProperties, ViewConfigurationProperties,
    ViewConfigurationView, XrCall, XrProvider,
};
use crate::registry::{self, EnumFact, FactContext, Prerequisites};
use crate::render;
use crate::result::{Version, XrResultCode};
use crate::settings::{GraphicsPreference, ViewConfigurationType, XrSettings};
use crate::state::{ActiveSession, CapabilityState, Tier, TierError, Unavailable};
use crate::table::{Cell, DisplayTag, Table};
use tracing::{debug, info, warn};

pub const APPLICATION_NAME: &str = "OpenXR Explorer";
pub const NO_RUNTIME: &str = "No runtime set";

const API_VERSION_1_1: Version = Version::new(1, 1, 0);
const API_VERSION_1_0: Version = Version::new(1, 0, 0);

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// Instance extensions (sorted by name) and API layers (runtime order).
pub struct ExtensionSet {
    pub extensions: Vec<ExtensionProperties>,
    pub layers: Vec<ApiLayerProperties>,
}

impl ExtensionSet {
    pub fn has(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext.name == name)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewInfo {
    pub available: Vec<ViewConfigurationType>,
    /// The explicit request, else the first available configuration.
    pub current: Option<ViewConfigurationType>,
    /// Result of a failed `xrEnumerateViewConfigurations`.
    pub error: Option<XrResultCode>,
    pub properties: Option<ViewConfigurationProperties>,
    pub views: Vec<ViewConfigurationView>,
}

impl ViewInfo {
    /// The configuration view-dependent facts query, or the code that
    /// explains why there is none.
    pub fn selected(&self) -> XrCall<ViewConfigurationType> {
        self.current.ok_or(
            self.error
                .unwrap_or(XrResultCode::ERROR_VIEW_CONFIGURATION_TYPE_UNSUPPORTED),
        )
    }
}

pub struct Explorer<P: XrProvider> {
    provider: P,
    backends: GraphicsBackends,
    settings: XrSettings,
    state: CapabilityState,
    extensions: ExtensionSet,
    view: ViewInfo,
    instance_properties: Option<InstanceProperties>,
    system_properties: Option<SystemProperties>,
    registry: Vec<EnumFact>,
    tables: Vec<Table>,
}

impl<P: XrProvider> Explorer<P> {
    pub fn new(provider: P, backends: GraphicsBackends) -> Self {
        Self {
            provider,
            backends,
            settings: XrSettings::default(),
            state: CapabilityState::default(),
            extensions: ExtensionSet::default(),
            view: ViewInfo::default(),
            instance_properties: None,
            system_properties: None,
            registry: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Tear down the previous cycle and rebuild every table from scratch.
    pub fn reload(&mut self, settings: &XrSettings) -> &[Table] {
        self.release();
        self.settings = settings.clone();
        debug!(
            form_factor = %settings.form_factor,
            graphics = %settings.graphics,
            allow_session = settings.allow_session,
            "reloading"
        );

        self.load_extensions();
        self.init_instance();
        self.init_system();
        self.load_properties();
        self.load_view();
        self.registry = registry::default_registry();
        self.refresh();

        info!(
            runtime = self.runtime_name(),
            tables = self.tables.len(),
            "reload complete"
        );
        &self.tables
    }

    /// Destroy the session, then the instance, then every graphics device,
    /// and reset to the empty state. Safe to call any number of times.
    pub fn release(&mut self) {
        let instance = self.state.instance.take();
        if let Some(session) = self.state.session.take() {
            debug!(backend = %session.backend, "destroying session");
            match instance {
                Some(instance) => {
                    if let Err(code) = self.provider.destroy_session(instance, session.handle) {
                        warn!(%code, "xrDestroySession failed");
                    }
                }
                None => warn!("session outlived its instance; not destroyed"),
            }
        }
        if let Some(instance) = instance {
            debug!("destroying instance");
            if let Err(code) = self.provider.destroy_instance(instance) {
                warn!(%code, "xrDestroyInstance failed");
            }
        }
        self.backends.release_all();

        self.state.clear();
        self.extensions = ExtensionSet::default();
        self.view = ViewInfo::default();
        self.instance_properties = None;
        self.system_properties = None;
        self.registry.clear();
        self.tables.clear();
    }

    fn load_extensions(&mut self) {
        let mut layers = Table::new(
            "xrEnumerateApiLayerProperties",
            "XrApiLayerProperties",
            "api-layers",
            DisplayTag::Features,
            3,
        );
        layers.header_row = true;
        match self.provider.enumerate_api_layers() {
            Ok(found) if found.is_empty() => layers.set_error("No layers present"),
            Ok(found) => {
                layers = layers.with_header([
                    Cell::text("Layer Name"),
                    Cell::text("Description"),
                    Cell::linked("Version", "Version"),
                ]);
                for layer in &found {
                    layers.push_row([
                        Cell::text(&layer.name),
                        Cell::text(&layer.description),
                        Cell::text(format!("v{}", layer.layer_version)),
                    ]);
                }
                self.extensions.layers = found;
            }
            Err(code) => {
                warn!(%code, "xrEnumerateApiLayerProperties failed");
                layers.set_error(code.name());
            }
        }
        self.tables.push(layers);

        let mut extensions = Table::new(
            "xrEnumerateInstanceExtensionProperties",
            "XrExtensionProperties",
            "extensions",
            DisplayTag::Features,
            3,
        )
        .with_header([
            Cell::text("Extension Name"),
            Cell::linked("Version", "Version"),
            Cell::linked("Spec", "Spec"),
        ]);
        match self.provider.enumerate_instance_extensions() {
            Ok(mut found) => {
                found.sort_by(|a, b| a.name.cmp(&b.name));
                for ext in &found {
                    extensions.push_row([
                        Cell::text(&ext.name),
                        Cell::text(format!("v{}", ext.version)),
                        Cell::link_only(&ext.name),
                    ]);
                }
                self.extensions.extensions = found;
            }
            Err(code) => {
                warn!(%code, "xrEnumerateInstanceExtensionProperties failed");
                extensions.set_error(code.name());
            }
        }
        self.tables.push(extensions);
    }

    /// Sessions go headless when the runtime offers `XR_MND_headless` and
    /// either headless was asked for or no native device can serve the
    /// preference.
    fn headless_session(&self) -> bool {
        let preference = self.settings.graphics;
        self.extensions.has(HEADLESS_EXTENSION)
            && (preference == GraphicsPreference::Headless
                || self.backends.candidates(preference).is_empty())
    }

    fn requested_extensions(&self) -> Vec<String> {
        let mut requested = Vec::new();
        if self.headless_session() {
            requested.push(HEADLESS_EXTENSION.to_string());
        } else {
            for kind in self.backends.candidates(self.settings.graphics) {
                if let Some(name) = kind.extension_name() {
                    if self.extensions.has(name) {
                        requested.push(name.to_string());
                    }
                }
            }
        }
        if self.extensions.has(DEBUG_UTILS_EXTENSION) {
            requested.push(DEBUG_UTILS_EXTENSION.to_string());
        }
        requested
    }

    /// Create the instance unless this cycle already has one or failed to.
    pub fn init_instance(&mut self) {
        if !self.state.instance.is_unset() {
            return;
        }
        let mut request = InstanceCreateRequest {
            application_name: APPLICATION_NAME.to_string(),
            api_version: API_VERSION_1_1,
            extensions: self.requested_extensions(),
        };
        debug!(extensions = ?request.extensions, "creating instance");

        let mut created = self.provider.create_instance(&request);
        if created == Err(XrResultCode::ERROR_API_VERSION_UNSUPPORTED) {
            info!("runtime rejected API {API_VERSION_1_1}; retrying with {API_VERSION_1_0}");
            request.api_version = API_VERSION_1_0;
            created = self.provider.create_instance(&request);
        }

        match created {
            Ok(instance) => self.state.instance = Tier::Ready(instance),
            Err(code) => {
                warn!(%code, "xrCreateInstance failed");
                self.state.instance.fail(code);
                self.state.system.fail(Unavailable::NoInstance);
                self.state.session.fail(Unavailable::NoInstance);
            }
        }
    }

    pub fn init_system(&mut self) {
        let Some(instance) = self.state.instance.ready() else {
            self.state.system.fail(Unavailable::NoInstance);
            self.state.session.fail(Unavailable::NoInstance);
            return;
        };
        if !self.state.system.is_unset() {
            return;
        }
        match self.provider.get_system(instance, self.settings.form_factor) {
            Ok(system) => self.state.system = Tier::Ready(system),
            Err(code) => {
                warn!(%code, form_factor = %self.settings.form_factor, "xrGetSystem failed");
                self.state.system.fail(code);
                self.state.session.fail(Unavailable::NoSystem);
            }
        }
    }

    /// Create the session once per cycle. A second call is a no-op.
    pub fn init_session(&mut self) {
        let Some(instance) = self.state.instance.ready() else {
            self.state.session.fail(Unavailable::NoInstance);
            return;
        };
        let Some(system) = self.state.system.ready() else {
            self.state.session.fail(Unavailable::NoSystem);
            return;
        };
        if !self.state.session.is_unset() {
            return;
        }

        let binding = if self.headless_session() {
            SessionBinding::Headless
        } else {
            match self.native_binding(instance, system) {
                Ok(binding) => binding,
                Err(err) => {
                    warn!(%err, "no graphics binding for session");
                    self.state.session.fail(err);
                    return;
                }
            }
        };

        let backend = binding.kind();
        info!(%backend, "creating session");
        match self.provider.create_session(instance, system, &binding) {
            Ok(handle) => self.state.session = Tier::Ready(ActiveSession { handle, backend }),
            Err(code) => {
                warn!(%code, %backend, "xrCreateSession failed");
                self.state.session.fail(code);
            }
        }
    }

    /// Walk the native candidates in preference order. A runtime that cannot
    /// report requirements for a backend moves on to the next one; a device
    /// that fails to come up ends the search.
    fn native_binding(
        &mut self,
        instance: InstanceHandle,
        system: SystemId,
    ) -> Result<SessionBinding, TierError> {
        let mut last_code = None;
        for kind in self.backends.candidates(self.settings.graphics) {
            let requirements = match self.provider.graphics_requirements(instance, system, kind) {
                Ok(requirements) => requirements,
                Err(code) => {
                    debug!(backend = %kind, %code, "graphics requirements unavailable");
                    last_code = Some(code);
                    continue;
                }
            };
            return self
                .backends
                .create_binding(kind, &requirements)
                .map_err(TierError::Backend);
        }
        Err(match last_code {
            Some(code) => TierError::Native(code),
            None => Unavailable::BackendUnavailable.into(),
        })
    }

    fn load_properties(&mut self) {
        let mut instance_table = Table::new(
            "xrGetInstanceProperties",
            "XrInstanceProperties",
            "XrInstanceProperties",
            DisplayTag::Properties,
            2,
        );
        match self.state.instance.ready() {
            None => instance_table.set_error(Unavailable::NoInstance.message()),
            Some(instance) => match self.provider.instance_properties(instance) {
                Ok(properties) => {
                    instance_table.push_pair("runtimeName", &properties.runtime_name);
                    instance_table
                        .push_pair("runtimeVersion", properties.runtime_version.to_string());
                    self.instance_properties = Some(properties);
                }
                Err(code) => instance_table.set_error(code.name()),
            },
        }
        self.tables.push(instance_table);

        let mut system_table = Table::new(
            "xrGetSystemProperties",
            "XrSystemProperties",
            "XrSystemProperties",
            DisplayTag::Properties,
            2,
        );
        match self.state.instance_system() {
            None => system_table.set_error(self.missing_system_message()),
            Some((instance, system)) => match self.provider.system_properties(instance, system) {
                Ok(properties) => {
                    system_table.push_pair("systemName", &properties.system_name);
                    system_table.push_pair("vendorId", properties.vendor_id.to_string());
                    system_table.push_pair("systemId", properties.system_id.to_string());
                    system_table.push_pair(
                        "maxSwapchainImageWidth",
                        properties.max_swapchain_image_width.to_string(),
                    );
                    system_table.push_pair(
                        "maxSwapchainImageHeight",
                        properties.max_swapchain_image_height.to_string(),
                    );
                    system_table.push_pair("maxLayerCount", properties.max_layer_count.to_string());
                    system_table.push_pair(
                        "orientationTracking",
                        yes_no(properties.orientation_tracking),
                    );
                    system_table
                        .push_pair("positionTracking", yes_no(properties.position_tracking));
                    self.system_properties = Some(properties);
                }
                Err(code) => system_table.set_error(code.name()),
            },
        }
        self.tables.push(system_table);
    }

    fn missing_system_message(&self) -> &'static str {
        Prerequisites::INSTANCE_SYSTEM
            .unmet(&self.state)
            .unwrap_or(Unavailable::NoSystem)
            .message()
    }

    fn load_view(&mut self) {
        let handles = self.state.instance_system();
        if let Some((instance, system)) = handles {
            match self.provider.enumerate_view_configurations(instance, system) {
                Ok(available) => {
                    self.view.available = available;
                    self.view.current = self
                        .settings
                        .view_config
                        .or_else(|| self.view.available.first().copied());
                }
                Err(code) => {
                    warn!(%code, "xrEnumerateViewConfigurations failed");
                    self.view.error = Some(code);
                }
            }
        }

        let mut properties_table = Table::new(
            "xrGetViewConfigurationProperties",
            "XrViewConfigurationProperties",
            "XrViewConfigurationProperties",
            DisplayTag::View,
            2,
        );
        let mut views_table = Table::new(
            "xrEnumerateViewConfigurationViews",
            "XrViewConfigurationView",
            "XrViewConfigurationView",
            DisplayTag::View,
            2,
        );

        match (handles, self.view.selected()) {
            (None, _) => {
                let message = self.missing_system_message();
                properties_table.set_error(message);
                views_table.set_error(message);
            }
            (Some(_), Err(code)) => {
                properties_table.set_error(code.name());
                views_table.set_error(code.name());
            }
            (Some((instance, system)), Ok(current)) => {
                match self
                    .provider
                    .view_configuration_properties(instance, system, current)
                {
                    Ok(properties) => {
                        properties_table.push_pair("viewConfigurationType", current.to_string());
                        properties_table.push_pair("fovMutable", yes_no(properties.fov_mutable));
                        self.view.properties = Some(properties);
                    }
                    Err(code) => properties_table.set_error(code.name()),
                }

                match self
                    .provider
                    .enumerate_view_configuration_views(instance, system, current)
                {
                    Ok(views) => {
                        for (index, view) in views.iter().enumerate() {
                            views_table.push_pair(format!("View {index}"), "");
                            push_view_bounds(&mut views_table, view);
                        }
                        self.view.views = views;
                    }
                    Err(code) => views_table.set_error(code.name()),
                }
            }
        }

        self.tables.push(properties_table);
        self.tables.push(views_table);
    }

    /// Resolve every registry fact into a table, in registry order.
    fn refresh(&mut self) {
        if self.settings.allow_session {
            if registry::needs_session(&self.registry) {
                self.init_session();
            }
        } else if self.state.session.is_unset() {
            self.state.session.fail(Unavailable::SessionNotEnabled);
        }

        let ctx = FactContext {
            provider: &self.provider,
            instance: self.state.instance.ready(),
            system: self.state.system.ready(),
            session: self.state.session.ready(),
            view_config: self.view.selected(),
        };
        let state = &self.state;
        let produced: Vec<Table> = self
            .registry
            .iter()
            .map(|fact| match fact.needs.unmet(state) {
                Some(reason) => {
                    debug!(fact = fact.name_func, reason = reason.message(), "skipping");
                    fact.unavailable_table(reason)
                }
                None => {
                    let output = (fact.load)(&ctx);
                    if let Some(code) = output.error {
                        debug!(fact = fact.name_func, %code, "enumeration failed");
                    }
                    fact.table(output)
                }
            })
            .collect();
        self.tables.extend(produced);
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Table whose function or type name equals `name`, ignoring case.
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.matches(name))
    }

    pub fn list_names(&self) -> Vec<&'static str> {
        render::list_names(&self.tables)
    }

    pub fn instance_error(&self) -> Option<&TierError> {
        self.state.instance.error()
    }

    pub fn system_error(&self) -> Option<&TierError> {
        self.state.system.error()
    }

    pub fn session_error(&self) -> Option<&TierError> {
        self.state.session.error()
    }

    /// The runtime's reported name; [`NO_RUNTIME`] when there is no
    /// instance or the runtime left the name blank.
    pub fn runtime_name(&self) -> &str {
        self.instance_properties
            .as_ref()
            .map(|properties| properties.runtime_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_RUNTIME)
    }

    pub fn session_backend(&self) -> BackendKind {
        self.state
            .session
            .ready()
            .map_or(BackendKind::None, |session| session.backend)
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn view(&self) -> &ViewInfo {
        &self.view
    }

    pub fn instance_properties(&self) -> Option<&InstanceProperties> {
        self.instance_properties.as_ref()
    }

    pub fn system_properties(&self) -> Option<&SystemProperties> {
        self.system_properties.as_ref()
    }

    pub fn settings(&self) -> &XrSettings {
        &self.settings
    }

    pub fn state(&self) -> &CapabilityState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: XrProvider> Drop for Explorer<P> {
    fn drop(&mut self) {
        self.release();
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "True" } else { "False" }
}

fn push_view_bounds(table: &mut Table, view: &ViewConfigurationView) {
    let bounds = [
        ("recommendedImageRectWidth", view.recommended_image_rect_width),
        ("recommendedImageRectHeight", view.recommended_image_rect_height),
        (
            "recommendedSwapchainSampleCount",
            view.recommended_swapchain_sample_count,
        ),
        ("maxImageRectWidth", view.max_image_rect_width),
        ("maxImageRectHeight", view.max_image_rect_height),
        ("maxSwapchainSampleCount", view.max_swapchain_sample_count),
    ];
    for (name, value) in bounds {
        table.push_pair(name, value.to_string());
    }
}
