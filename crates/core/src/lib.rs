pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod request;
pub mod response;
pub mod strip;
pub mod transport;

pub use client::Perspective;
pub use config::{API_KEY_ENV, ClientConfig, ClientConfigBuilder, DEFAULT_ENDPOINT};
pub use error::{PerspectiveError, ResponseError, Result};
pub use payload::{MAX_TEXT_LENGTH, build_request, build_request_ref};
pub use request::{
    AnalysisInput, AnalysisRequest, AnalyzeOptions, AnalyzeOptionsBuilder, AttributeOptions, AttributeSelection, Comment,
    DEFAULT_ATTRIBUTE, RequestedAttributes,
};
pub use response::AnalysisResponse;
pub use strip::strip_html;
pub use transport::{HttpTransport, Transport, TransportResponse};
