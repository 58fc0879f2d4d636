//! Control ownership of a plan's live session
//!
//! The Services API only exposes `toggle_control`, which flips a live session
//! between owned and unowned. Ownership is taken with the fewest toggles the
//! observed state allows:
//!
//! ```text
//!   Unowned ─────────── toggle ──────────────▶ OwnedBySelf(token)
//!   OwnedBySelf ─────── (nothing) ───────────▶ OwnedBySelf(token)
//!   OwnedByOther ── toggle ─▶ Unowned ── toggle ─▶ OwnedBySelf(token)
//! ```
//!
//! The server never says who "we" are. The token seen right after our own
//! acquisition is remembered per plan and treated as self from then on. If a
//! third party toggles between the two calls of a transfer, the final owner
//! is indeterminate; this is not compensated for.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::gateway::{Endpoints, Method, RestGateway};
use crate::models::ControlToken;
use crate::utils::error::ControlError;

/// Observed ownership of a live session, relative to this session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlState {
    Unowned,
    OwnedBySelf(ControlToken),
    OwnedByOther(ControlToken),
}

impl ControlState {
    /// Classify a controller link against the remembered self token
    pub fn classify(controller: Option<ControlToken>, remembered: Option<&ControlToken>) -> Self {
        match controller {
            None => Self::Unowned,
            Some(token) if remembered == Some(&token) => Self::OwnedBySelf(token),
            Some(token) => Self::OwnedByOther(token),
        }
    }

    /// Toggles needed to end up owning the session
    pub fn toggles_to_acquire(&self) -> usize {
        match self {
            Self::Unowned => 1,
            Self::OwnedBySelf(_) => 0,
            Self::OwnedByOther(_) => 2,
        }
    }
}

/// (service type, plan) pair addressing one live session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub service_type_id: String,
    pub plan_id: String,
}

impl PlanKey {
    pub fn new(service_type_id: impl Into<String>, plan_id: impl Into<String>) -> Self {
        Self {
            service_type_id: service_type_id.into(),
            plan_id: plan_id.into(),
        }
    }
}

/// Acquires and releases live-session control
///
/// Overlapping calls for the same plan are not serialized here; callers that
/// need that must hold their own per-plan lock around ensure + advance.
pub struct ControlCoordinator {
    gateway: Arc<dyn RestGateway>,
    endpoints: Endpoints,
    self_tokens: RwLock<HashMap<PlanKey, ControlToken>>,
}

impl ControlCoordinator {
    pub fn new(gateway: Arc<dyn RestGateway>, endpoints: Endpoints) -> Self {
        Self {
            gateway,
            endpoints,
            self_tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Token currently believed to be "us" for a plan
    pub async fn remembered_token(&self, service_type_id: &str, plan_id: &str) -> Option<ControlToken> {
        self.self_tokens
            .read()
            .await
            .get(&PlanKey::new(service_type_id, plan_id))
            .cloned()
    }

    /// Make sure this session controls the plan, toggling as needed
    pub async fn ensure_control(
        &self,
        service_type_id: &str,
        plan_id: &str,
    ) -> Result<ControlToken, ControlError> {
        let key = PlanKey::new(service_type_id, plan_id);
        let controller = self.probe(&key).await?;
        let remembered = self.self_tokens.read().await.get(&key).cloned();

        let state = ControlState::classify(controller, remembered.as_ref());
        tracing::debug!(
            service_type_id = %service_type_id,
            plan_id = %plan_id,
            state = ?state,
            "Live control state"
        );

        let token = match state {
            ControlState::OwnedBySelf(token) => return Ok(token),
            ControlState::Unowned => {
                let body = self.toggle(&key, "taking control").await?;
                self.acquired_token(&key, &body)?
            }
            ControlState::OwnedByOther(other) => {
                tracing::info!(
                    plan_id = %plan_id,
                    controller = %other,
                    "Plan controlled by someone else; transferring control"
                );
                self.toggle(&key, "releasing current controller").await?;
                let body = self.toggle(&key, "reclaiming control").await?;
                self.acquired_token(&key, &body)?
            }
        };

        self.self_tokens
            .write()
            .await
            .insert(key, token.clone());
        tracing::info!(plan_id = %plan_id, controller = %token, "Took control of plan");

        Ok(token)
    }

    /// Give up control of the plan; a no-op when nobody controls it
    pub async fn release_control(
        &self,
        service_type_id: &str,
        plan_id: &str,
    ) -> Result<(), ControlError> {
        let key = PlanKey::new(service_type_id, plan_id);

        if self.probe(&key).await?.is_none() {
            tracing::debug!(plan_id = %plan_id, "Plan already unowned; nothing to release");
            return Ok(());
        }

        self.toggle(&key, "releasing control").await?;
        self.self_tokens.write().await.remove(&key);
        tracing::info!(plan_id = %plan_id, "Released control of plan");

        Ok(())
    }

    async fn probe(&self, key: &PlanKey) -> Result<Option<ControlToken>, ControlError> {
        let url = self.endpoints.live(&key.service_type_id, &key.plan_id);
        let body = self
            .gateway
            .request(Method::Get, &url)
            .await
            .map_err(|source| ControlError::Request {
                stage: "reading live state",
                plan_id: key.plan_id.clone(),
                source,
            })?;
        controller_of(&body, &key.plan_id)
    }

    async fn toggle(&self, key: &PlanKey, stage: &'static str) -> Result<Value, ControlError> {
        let url = self
            .endpoints
            .toggle_control(&key.service_type_id, &key.plan_id);
        self.gateway
            .request(Method::Post, &url)
            .await
            .map_err(|source| {
                tracing::error!(plan_id = %key.plan_id, stage, error = %source, "Toggle control failed");
                ControlError::Request {
                    stage,
                    plan_id: key.plan_id.clone(),
                    source,
                }
            })
    }

    fn acquired_token(&self, key: &PlanKey, body: &Value) -> Result<ControlToken, ControlError> {
        controller_of(body, &key.plan_id)?.ok_or_else(|| ControlError::NotAcquired {
            plan_id: key.plan_id.clone(),
        })
    }
}

/// Read `data.links.controller` from a live document; `null` means unowned
fn controller_of(body: &Value, plan_id: &str) -> Result<Option<ControlToken>, ControlError> {
    match body.pointer("/data/links/controller") {
        Some(Value::Null) => Ok(None),
        Some(Value::String(token)) => Ok(Some(ControlToken::new(token.as_str()))),
        Some(other) => Err(ControlError::MalformedDescriptor {
            plan_id: plan_id.to_string(),
            reason: format!("unexpected controller link {other}"),
        }),
        None => Err(ControlError::MalformedDescriptor {
            plan_id: plan_id.to_string(),
            reason: "missing data.links.controller".to_string(),
        }),
    }
}
