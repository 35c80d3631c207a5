mod api;
mod error;
mod http;
mod resources;
mod sim;

pub use api::{ApiEnvelope, EnvelopeStatus, Page, Paginated, Pagination, ValveApi, ValveQuery};
pub use error::ClientError;
pub use http::HttpValveApi;
pub use resources::{Resource, ResourceClient};
pub use sim::SimValveApi;
