//! Catalog of service types and their upcoming plans
//!
//! The catalog is the lookup table that maps a plan id back to the service
//! type that owns it. Loading is best-effort per service type: a failed plan
//! listing degrades that service type to no plans instead of aborting.
//!
//! # Example
//!
//! ```rust,ignore
//! use pco_live::catalog::{CatalogCache, CatalogScope};
//!
//! let cache = CatalogCache::new(gateway, endpoints, 7);
//! let catalog = cache.load(&CatalogScope::All).await?;
//! for entry in catalog.plan_choices() {
//!     println!("{} {}", entry.id, entry.label);
//! }
//! ```

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::gateway::{Endpoints, Method, RestGateway};
use crate::models::{CatalogEntry, Document, OneOrMany, Plan, Resource, ServiceType};
use crate::utils::error::{FetchError, RequestError};

/// Id of the leading "nothing selected" entry in every choice list
pub const SENTINEL_ID: &str = "0";

/// Which service types a load covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogScope {
    /// Every service type visible to the credentials
    All,
    /// A single service type by id
    ServiceType(String),
    /// Service types inside a parent folder
    ParentFolder(String),
}

/// One loaded snapshot of service types and plans
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    service_types: Vec<ServiceType>,
    plans: Vec<Plan>,
    degraded: Vec<String>,
    loaded_at: Option<DateTime<Utc>>,
}

impl Catalog {
    /// Service types in server order
    pub fn service_types(&self) -> &[ServiceType] {
        &self.service_types
    }

    /// Plans grouped by service type, each group in sort-date order
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Service types whose plan listing failed during the load
    pub fn degraded(&self) -> &[String] {
        &self.degraded
    }

    /// When this snapshot was loaded; `None` before the first load
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    /// Look up a plan by id
    pub fn plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    /// Service type owning a known plan
    pub fn resolve_service_type(&self, plan_id: &str) -> Option<&ServiceType> {
        let plan = self.plan(plan_id)?;
        self.service_types
            .iter()
            .find(|s| s.id == plan.service_type_id)
    }

    /// Service-type choice list with the leading sentinel
    pub fn service_type_choices(&self) -> Vec<CatalogEntry> {
        let sentinel = if self.is_loaded() {
            "(select a service type)"
        } else {
            "No services loaded. Update instance config."
        };
        std::iter::once(CatalogEntry::new(SENTINEL_ID, sentinel))
            .chain(
                self.service_types
                    .iter()
                    .map(|s| CatalogEntry::new(&s.id, &s.name)),
            )
            .collect()
    }

    /// Plan choice list with the leading sentinel
    pub fn plan_choices(&self) -> Vec<CatalogEntry> {
        let sentinel = if self.is_loaded() {
            "(select a plan)"
        } else {
            "No plans loaded. Update instance config."
        };
        std::iter::once(CatalogEntry::new(SENTINEL_ID, sentinel))
            .chain(self.plans.iter().map(|p| CatalogEntry::new(&p.id, &p.label)))
            .collect()
    }
}

/// Session-scoped catalog holder
pub struct CatalogCache {
    gateway: Arc<dyn RestGateway>,
    endpoints: Endpoints,
    per_page: u32,
    current: RwLock<Catalog>,
}

impl CatalogCache {
    /// Create an empty cache
    pub fn new(gateway: Arc<dyn RestGateway>, endpoints: Endpoints, per_page: u32) -> Self {
        Self {
            gateway,
            endpoints,
            per_page,
            current: RwLock::new(Catalog::default()),
        }
    }

    /// Fetch service types for `scope` and their future plans, then swap the snapshot in
    pub async fn load(&self, scope: &CatalogScope) -> Result<Catalog, FetchError> {
        let url = match scope {
            CatalogScope::All => self.endpoints.service_types(),
            CatalogScope::ServiceType(id) => self.endpoints.service_type(id),
            CatalogScope::ParentFolder(folder) => self.endpoints.service_types_in_folder(folder),
        };

        let body = self
            .gateway
            .request(Method::Get, &url)
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Error getting Services data");
                FetchError::ServiceTypes(e)
            })?;

        let document: Document<OneOrMany> = serde_json::from_value(body)
            .map_err(|e| FetchError::UnexpectedShape(format!("service types: {e}")))?;
        let service_types: Vec<ServiceType> = document
            .data
            .into_vec()
            .iter()
            .map(ServiceType::from_resource)
            .collect();

        let results = join_all(
            service_types
                .iter()
                .map(|service_type| self.fetch_plans(&service_type.id, self.per_page)),
        )
        .await;

        let mut plans = Vec::new();
        let mut degraded = Vec::new();
        for (service_type, result) in service_types.iter().zip(results) {
            match result {
                Ok(resources) => plans.extend(
                    resources
                        .iter()
                        .map(|r| plan_from_resource(r, service_type, &service_types)),
                ),
                Err(e) => {
                    tracing::warn!(
                        service_type_id = %service_type.id,
                        error = %e,
                        "Error processing Services data; service type contributes no plans"
                    );
                    degraded.push(service_type.id.clone());
                }
            }
        }

        let catalog = Catalog {
            service_types,
            plans,
            degraded,
            loaded_at: Some(Utc::now()),
        };

        tracing::info!(
            service_types = catalog.service_types.len(),
            plans = catalog.plans.len(),
            degraded = catalog.degraded.len(),
            "Catalog loaded"
        );

        *self.current.write().await = catalog.clone();
        Ok(catalog)
    }

    /// Copy of the current snapshot
    pub async fn snapshot(&self) -> Catalog {
        self.current.read().await.clone()
    }

    /// Service type owning a plan of the loaded catalog; never re-fetches
    pub async fn resolve_service_type(&self, plan_id: &str) -> Result<ServiceType, FetchError> {
        self.current
            .read()
            .await
            .resolve_service_type(plan_id)
            .cloned()
            .ok_or_else(|| FetchError::UnknownPlan {
                plan_id: plan_id.to_string(),
            })
    }

    /// Id of the nearest future plan of a service type (one-result query)
    pub async fn next_plan_id(&self, service_type_id: &str) -> Result<String, FetchError> {
        let plans = self
            .fetch_plans(service_type_id, 1)
            .await
            .map_err(|source| FetchError::Plans {
                service_type_id: service_type_id.to_string(),
                source,
            })?;

        plans
            .into_iter()
            .next()
            .map(|p| p.id)
            .ok_or_else(|| FetchError::NoFuturePlans {
                service_type_id: service_type_id.to_string(),
            })
    }

    async fn fetch_plans(
        &self,
        service_type_id: &str,
        per_page: u32,
    ) -> Result<Vec<Resource>, RequestError> {
        let url = self.endpoints.future_plans(service_type_id, per_page);
        let body = self.gateway.request(Method::Get, &url).await?;
        let document: Document<OneOrMany> = serde_json::from_value(body)
            .map_err(|e| RequestError::MalformedBody(format!("plans: {e}")))?;
        Ok(document.data.into_vec())
    }
}

/// Convert a plan resource into a catalog entry
///
/// The owning service type comes from the plan's relationship when present,
/// falling back to the service type the listing was requested for.
fn plan_from_resource(
    resource: &Resource,
    requested: &ServiceType,
    service_types: &[ServiceType],
) -> Plan {
    let service_type = resource
        .related_id("service_type")
        .and_then(|id| service_types.iter().find(|s| s.id == id))
        .unwrap_or(requested);
    let dates = resource.attr_str("dates").unwrap_or_default().to_string();

    Plan {
        label: Plan::make_label(&service_type.name, &dates, &resource.id),
        id: resource.id.clone(),
        service_type_id: service_type.id.clone(),
        dates,
    }
}
