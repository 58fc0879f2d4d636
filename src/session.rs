//! Per-session context and action dispatch
//!
//! A [`LiveSession`] owns everything one controller instance needs: the
//! gateway, the catalog, the control coordinator with its self tokens, the
//! navigator, the last navigation summary and a status for the host.
//! Nothing here is process-global; several sessions can run side by side.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{Catalog, CatalogCache, CatalogScope};
use crate::config::Config;
use crate::control::ControlCoordinator;
use crate::error::{Error, Result};
use crate::gateway::{Endpoints, HttpGateway, RestGateway};
use crate::live::{project, LiveNavigator};
use crate::models::{ControlToken, Direction, NavigationState};
use crate::utils::non_blank;

/// What an action does once its plan is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Next,
    Previous,
    TakeControl,
    ReleaseControl,
}

impl Action {
    fn direction(&self) -> Option<Direction> {
        match self {
            Self::Next => Some(Direction::Next),
            Self::Previous => Some(Direction::Previous),
            Self::TakeControl | Self::ReleaseControl => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "previous"),
            Self::TakeControl => write!(f, "take-control"),
            Self::ReleaseControl => write!(f, "release-control"),
        }
    }
}

/// How the plan an action applies to is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanTarget {
    /// A plan chosen from the loaded catalog
    Catalog { plan_id: String },
    /// Service type and plan given directly, bypassing the catalog
    Explicit {
        service_type_id: String,
        plan_id: String,
    },
    /// The nearest future plan of a service type
    NextInServiceType { service_type_id: String },
}

impl PlanTarget {
    /// Map optional service-type / plan options onto a target
    ///
    /// Plan only selects from the catalog, both are explicit, service type
    /// only means its next plan. Blank values count as absent.
    pub fn from_parts(service_type_id: Option<&str>, plan_id: Option<&str>) -> Option<Self> {
        match (non_blank(service_type_id), non_blank(plan_id)) {
            (Some(service_type_id), Some(plan_id)) => Some(Self::Explicit {
                service_type_id: service_type_id.to_string(),
                plan_id: plan_id.to_string(),
            }),
            (None, Some(plan_id)) => Some(Self::Catalog {
                plan_id: plan_id.to_string(),
            }),
            (Some(service_type_id), None) => Some(Self::NextInServiceType {
                service_type_id: service_type_id.to_string(),
            }),
            (None, None) => None,
        }
    }
}

/// How a host action addresses its plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
    Catalog,
    Explicit,
    NextInServiceType,
}

/// An action id exposed to control surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostAction {
    pub action: Action,
    pub addressing: Addressing,
}

impl HostAction {
    /// Every host action id
    pub const IDS: [&'static str; 10] = [
        "nextitem",
        "previousitem",
        "nextitem_inservicetype",
        "previousitem_inservicetype",
        "nextitem_specific",
        "previousitem_specific",
        "takecontrol",
        "releasecontrol",
        "takecontrol_specific",
        "releasecontrol_specific",
    ];

    /// Build the target from the action's options
    pub fn target(&self, service_type_id: Option<&str>, plan_id: Option<&str>) -> Option<PlanTarget> {
        let service_type_id = non_blank(service_type_id);
        let plan_id = non_blank(plan_id);
        match self.addressing {
            Addressing::Catalog => plan_id.map(|plan_id| PlanTarget::Catalog {
                plan_id: plan_id.to_string(),
            }),
            Addressing::Explicit => PlanTarget::from_parts(Some(service_type_id?), Some(plan_id?)),
            Addressing::NextInServiceType => service_type_id.map(|id| PlanTarget::NextInServiceType {
                service_type_id: id.to_string(),
            }),
        }
    }
}

impl FromStr for HostAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (action, addressing) = match s {
            "nextitem" => (Action::Next, Addressing::Catalog),
            "previousitem" => (Action::Previous, Addressing::Catalog),
            "nextitem_inservicetype" => (Action::Next, Addressing::NextInServiceType),
            "previousitem_inservicetype" => (Action::Previous, Addressing::NextInServiceType),
            "nextitem_specific" => (Action::Next, Addressing::Explicit),
            "previousitem_specific" => (Action::Previous, Addressing::Explicit),
            "takecontrol" => (Action::TakeControl, Addressing::Catalog),
            "releasecontrol" => (Action::ReleaseControl, Addressing::Catalog),
            "takecontrol_specific" => (Action::TakeControl, Addressing::Explicit),
            "releasecontrol_specific" => (Action::ReleaseControl, Addressing::Explicit),
            other => return Err(Error::other(format!("Unknown action: {other}"))),
        };
        Ok(Self { action, addressing })
    }
}

/// Health shown to the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Ok,
    Error(String),
}

/// Result of one dispatched action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub service_type_id: String,
    pub plan_id: String,
    /// Controller token after the action; `None` after a release
    pub controller: Option<ControlToken>,
    /// Fresh summary for navigation actions; `None` when there is no current item
    pub navigation: Option<NavigationState>,
}

/// Per-session context shared by every action
pub struct LiveSession {
    scope: CatalogScope,
    catalog: CatalogCache,
    coordinator: ControlCoordinator,
    navigator: LiveNavigator,
    navigation: RwLock<Option<NavigationState>>,
    status: RwLock<SessionStatus>,
}

impl LiveSession {
    /// Create a session talking to the real Services API
    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = HttpGateway::new(&config.api)?;
        Self::with_gateway(config, Arc::new(gateway))
    }

    /// Create a session over any gateway
    pub fn with_gateway(config: &Config, gateway: Arc<dyn RestGateway>) -> Result<Self> {
        let endpoints = Endpoints::new(&config.api.base_url)?;

        Ok(Self {
            scope: config.scope(),
            catalog: CatalogCache::new(gateway.clone(), endpoints.clone(), config.catalog.per_page),
            coordinator: ControlCoordinator::new(gateway.clone(), endpoints.clone()),
            navigator: LiveNavigator::new(gateway, endpoints),
            navigation: RwLock::new(None),
            status: RwLock::new(SessionStatus::Ok),
        })
    }

    /// Reload the catalog for the configured scope
    pub async fn load_catalog(&self) -> Result<Catalog> {
        let result = self.catalog.load(&self.scope).await.map_err(Error::from);
        self.record(&result).await;
        result
    }

    /// Current catalog snapshot
    pub async fn catalog(&self) -> Catalog {
        self.catalog.snapshot().await
    }

    /// Last navigation summary; `None` before any move or with no current item
    pub async fn navigation(&self) -> Option<NavigationState> {
        self.navigation.read().await.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.status.read().await.clone()
    }

    /// Resolve the target and run the action on it
    ///
    /// Navigation always acquires control first and only moves once that has
    /// fully completed.
    pub async fn perform(&self, action: Action, target: &PlanTarget) -> Result<ActionOutcome> {
        let result = self.dispatch(action, target).await;
        if let Err(e) = &result {
            tracing::error!(action = %action, target = ?target, error = %e, "Action failed");
        }
        self.record(&result).await;
        result
    }

    async fn dispatch(&self, action: Action, target: &PlanTarget) -> Result<ActionOutcome> {
        let (service_type_id, plan_id) = self.resolve(target).await?;

        tracing::info!(
            action = %action,
            service_type_id = %service_type_id,
            plan_id = %plan_id,
            "Performing action"
        );

        let mut outcome = ActionOutcome {
            service_type_id,
            plan_id,
            controller: None,
            navigation: None,
        };

        if action == Action::ReleaseControl {
            self.coordinator
                .release_control(&outcome.service_type_id, &outcome.plan_id)
                .await?;
            return Ok(outcome);
        }

        let token = self
            .coordinator
            .ensure_control(&outcome.service_type_id, &outcome.plan_id)
            .await?;
        outcome.controller = Some(token);

        if let Some(direction) = action.direction() {
            let response = self
                .navigator
                .advance(&outcome.service_type_id, &outcome.plan_id, direction)
                .await?;
            let navigation = project(&response)?;
            *self.navigation.write().await = navigation.clone();
            outcome.navigation = navigation;
        }

        Ok(outcome)
    }

    /// Turn a target into a (service type, plan) pair
    pub async fn resolve(&self, target: &PlanTarget) -> Result<(String, String)> {
        match target {
            PlanTarget::Catalog { plan_id } => {
                let service_type = self.catalog.resolve_service_type(plan_id).await?;
                Ok((service_type.id, plan_id.clone()))
            }
            PlanTarget::Explicit {
                service_type_id,
                plan_id,
            } => Ok((service_type_id.clone(), plan_id.clone())),
            PlanTarget::NextInServiceType { service_type_id } => {
                let plan_id = self.catalog.next_plan_id(service_type_id).await?;
                Ok((service_type_id.clone(), plan_id))
            }
        }
    }

    async fn record<T>(&self, result: &Result<T>) {
        let status = match result {
            Ok(_) => SessionStatus::Ok,
            Err(e) => SessionStatus::Error(e.to_string()),
        };
        *self.status.write().await = status;
    }
}
