//! URL construction for the Services API endpoints

use url::Url;

use crate::models::Direction;
use crate::utils::error::RequestError;

/// Builds every Services API URL from one base URL
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Create from a base URL such as `https://api.planningcenteronline.com/services/v2`
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        let base = Url::parse(base_url).map_err(|e| RequestError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RequestError::InvalidUrl(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }
        Ok(Self { base })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET /service_types`
    pub fn service_types(&self) -> Url {
        self.url(&["service_types"])
    }

    /// `GET /service_types/{id}`
    pub fn service_type(&self, service_type_id: &str) -> Url {
        self.url(&["service_types", service_type_id])
    }

    /// `GET /service_types?where[parent_id]={id}`
    pub fn service_types_in_folder(&self, parent_id: &str) -> Url {
        let mut url = self.service_types();
        url.query_pairs_mut().append_pair("where[parent_id]", parent_id);
        url
    }

    /// `GET /service_types/{id}/plans?filter=future&per_page={n}&order=sort_date`
    pub fn future_plans(&self, service_type_id: &str, per_page: u32) -> Url {
        let mut url = self.url(&["service_types", service_type_id, "plans"]);
        url.query_pairs_mut()
            .append_pair("filter", "future")
            .append_pair("per_page", &per_page.to_string())
            .append_pair("order", "sort_date");
        url
    }

    /// `GET /service_types/{id}/plans/{plan}/live`
    pub fn live(&self, service_type_id: &str, plan_id: &str) -> Url {
        self.url(&["service_types", service_type_id, "plans", plan_id, "live"])
    }

    /// `POST .../live/toggle_control`
    pub fn toggle_control(&self, service_type_id: &str, plan_id: &str) -> Url {
        self.url(&[
            "service_types",
            service_type_id,
            "plans",
            plan_id,
            "live",
            "toggle_control",
        ])
    }

    /// `POST .../live/go_to_{next,previous}_item?include=items,current_item_time`
    pub fn navigate(&self, service_type_id: &str, plan_id: &str, direction: Direction) -> Url {
        let mut url = self.url(&[
            "service_types",
            service_type_id,
            "plans",
            plan_id,
            "live",
            direction.endpoint(),
        ]);
        url.set_query(Some("include=items,current_item_time"));
        url
    }
}
