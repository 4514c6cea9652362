//! Three-tier readiness ladder: instance, system, session.
//!
//! Each tier is either unset, holding a live handle, or carrying the error
//! that stopped it. Errors are sticky for one reload cycle; only
//! [`CapabilityState::clear`] (called from `release`) resets a tier.

use crate::graphics::BackendKind;
use crate::provider::{InstanceHandle, SessionHandle, SystemId};
use crate::result::XrResultCode;
use std::fmt;
use tracing::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Fixed explanations for a prerequisite that was never satisfied.
pub enum Unavailable {
    NoInstance,
    NoSystem,
    NoSession,
    SessionNotEnabled,
    BackendUnavailable,
}

impl Unavailable {
    pub fn message(self) -> &'static str {
        match self {
            Unavailable::NoInstance => "No XrInstance available",
            Unavailable::NoSystem => "No XrSystemId available",
            Unavailable::NoSession => "No XrSession available",
            Unavailable::SessionNotEnabled => "Reload with Session enabled",
            Unavailable::BackendUnavailable => {
                "Requested graphics backend not available in this build"
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// Why a tier has no handle.
pub enum TierError {
    /// The native call returned a failure code.
    Native(XrResultCode),
    /// A lower tier failed or the caller did not permit this one.
    Unavailable(Unavailable),
    /// A graphics device could not be created for the session.
    Backend(String),
}

impl fmt::Display for TierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierError::Native(code) => f.write_str(code.name()),
            TierError::Unavailable(reason) => f.write_str(reason.message()),
            TierError::Backend(message) => f.write_str(message),
        }
    }
}

impl From<XrResultCode> for TierError {
    fn from(code: XrResultCode) -> Self {
        TierError::Native(code)
    }
}

impl From<Unavailable> for TierError {
    fn from(reason: Unavailable) -> Self {
        TierError::Unavailable(reason)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Tier<T> {
    #[default]
    Unset,
    Ready(T),
    Failed(TierError),
}

impl<T: Copy> Tier<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Tier::Unset)
    }

    pub fn ready(&self) -> Option<T> {
        match self {
            Tier::Ready(value) => Some(*value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TierError> {
        match self {
            Tier::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error().is_some()
    }

    /// Record a failure unless one is already recorded; the first error wins.
    pub fn fail(&mut self, err: impl Into<TierError>) {
        let err = err.into();
        if let Tier::Failed(existing) = self {
            debug!(%existing, ignored = %err, "tier already failed");
            return;
        }
        *self = Tier::Failed(err);
    }

    /// Take the live handle out, leaving the tier unset.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Tier::Ready(value) => Some(value),
            other => {
                *self = other;
                None
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// A created session and the backend it is bound to.
pub struct ActiveSession {
    pub handle: SessionHandle,
    pub backend: BackendKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// Where a reload cycle stands on the readiness ladder.
pub enum Phase {
    Empty,
    InstanceFailed,
    SystemPending,
    SystemFailed,
    SessionDeferred,
    SessionReady,
    SessionFailed,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CapabilityState {
    pub instance: Tier<InstanceHandle>,
    pub system: Tier<SystemId>,
    pub session: Tier<ActiveSession>,
}

impl CapabilityState {
    pub fn phase(&self) -> Phase {
        match (&self.instance, &self.system, &self.session) {
            (Tier::Unset, _, _) => Phase::Empty,
            (Tier::Failed(_), _, _) => Phase::InstanceFailed,
            (Tier::Ready(_), Tier::Unset, _) => Phase::SystemPending,
            (Tier::Ready(_), Tier::Failed(_), _) => Phase::SystemFailed,
            (Tier::Ready(_), Tier::Ready(_), Tier::Unset) => Phase::SessionDeferred,
            (Tier::Ready(_), Tier::Ready(_), Tier::Ready(_)) => Phase::SessionReady,
            (Tier::Ready(_), Tier::Ready(_), Tier::Failed(_)) => Phase::SessionFailed,
        }
    }

    /// Instance and system handles when both tiers are ready.
    pub fn instance_system(&self) -> Option<(InstanceHandle, SystemId)> {
        Some((self.instance.ready()?, self.system.ready()?))
    }

    pub fn clear(&mut self) {
        *self = CapabilityState::default();
    }
}
