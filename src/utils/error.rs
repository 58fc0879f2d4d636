//! Error types for the LIVE controller
//!
//! One enum per concern: transport, catalog, control ownership, navigation
//! and projection of the live-session payload.

use thiserror::Error;

/// Errors raised by a [`RestGateway`](crate::gateway::RestGateway) request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Application id or secret key missing; no request was sent
    #[error("Invalid Application ID/Secret Key")]
    InvalidCredentials,

    /// A URL could not be built from the configured base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, timeout or other transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credentials were rejected by the server (401/403)
    #[error("Unauthorized ({status})")]
    Unauthorized { status: u16 },

    /// The addressed resource does not exist (404)
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// Any other non-success status code
    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be parsed as JSON
    #[error("Unable to parse JSON: {0}")]
    MalformedBody(String),
}

impl RequestError {
    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Status { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Errors raised while loading or querying the catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The service-type listing failed; the whole load is aborted
    #[error("Error getting Services data: {0}")]
    ServiceTypes(#[source] RequestError),

    /// A plan listing failed
    #[error("Error getting plans for service type {service_type_id}: {source}")]
    Plans {
        service_type_id: String,
        #[source]
        source: RequestError,
    },

    /// The server returned a document of an unexpected shape
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The plan id is not part of the loaded catalog
    #[error("Plan {plan_id} is not in the loaded catalog")]
    UnknownPlan { plan_id: String },

    /// The service type has no upcoming plan
    #[error("No future plans for service type {service_type_id}")]
    NoFuturePlans { service_type_id: String },
}

/// Errors raised while acquiring or releasing control of a plan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// A request in the ownership sequence failed
    #[error("Error {stage} for plan {plan_id}: {source}")]
    Request {
        stage: &'static str,
        plan_id: String,
        #[source]
        source: RequestError,
    },

    /// The live descriptor has no readable controller link
    #[error("Malformed live descriptor for plan {plan_id}: {reason}")]
    MalformedDescriptor { plan_id: String, reason: String },

    /// The final toggle left the plan without a controller
    #[error("Control of plan {plan_id} was not acquired")]
    NotAcquired { plan_id: String },
}

/// Errors raised by a navigation mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// The mutation request failed
    #[error("Error Controlling LIVE: {0}")]
    Request(#[from] RequestError),

    /// The server answered with an `errors` payload
    #[error("LIVE rejected the request: {errors}")]
    Rejected { errors: String },

    /// The response is not a live-session document
    #[error("Malformed live response: {0}")]
    Malformed(String),
}

/// Errors raised while projecting a live-session response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// A relationship points at a resource missing from `included`
    #[error("Dangling {kind} reference: {id}")]
    DanglingReference { kind: &'static str, id: String },

    /// An item carries no title attribute
    #[error("Item {id} has no title")]
    MissingTitle { id: String },
}
