//! Navigation mutations on a live session

use serde_json::Value;
use std::sync::Arc;

use crate::gateway::{Endpoints, Method, RestGateway};
use crate::models::{Direction, LiveSessionResponse};
use crate::utils::compact_json;
use crate::utils::error::NavError;

/// Issues `go_to_next_item` / `go_to_previous_item`
///
/// Performs no ownership check; acquire control first.
pub struct LiveNavigator {
    gateway: Arc<dyn RestGateway>,
    endpoints: Endpoints,
}

impl LiveNavigator {
    pub fn new(gateway: Arc<dyn RestGateway>, endpoints: Endpoints) -> Self {
        Self { gateway, endpoints }
    }

    /// Move the live session one item and return the side-loaded session document
    pub async fn advance(
        &self,
        service_type_id: &str,
        plan_id: &str,
        direction: Direction,
    ) -> Result<LiveSessionResponse, NavError> {
        let url = self.endpoints.navigate(service_type_id, plan_id, direction);

        let body = self.gateway.request(Method::Post, &url).await.map_err(|e| {
            tracing::error!(plan_id = %plan_id, direction = %direction, error = %e, "Error Controlling LIVE");
            NavError::Request(e)
        })?;

        let response = parse_live_response(body)?;
        tracing::debug!(
            plan_id = %plan_id,
            direction = %direction,
            included = response.included.len(),
            "Live session moved"
        );
        Ok(response)
    }
}

/// Reject `errors` payloads, then decode the session document
fn parse_live_response(body: Value) -> Result<LiveSessionResponse, NavError> {
    match body.get("errors") {
        None | Some(Value::Null) => {}
        Some(Value::Array(errors)) if errors.is_empty() => {}
        Some(errors) => {
            let errors = compact_json(errors);
            tracing::error!(errors = %errors, "LIVE returned errors");
            return Err(NavError::Rejected { errors });
        }
    }

    serde_json::from_value(body).map_err(|e| NavError::Malformed(e.to_string()))
}
