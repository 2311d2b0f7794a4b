//! HTTP protocol layer module
//!
//! Response builders and query-string decoding shared by the dispatcher and handlers.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::{parse_query, query_to_json, QueryParams};
pub use response::{
    build_404_response, build_405_response, build_500_logged_response,
    build_500_logging_failed_response, build_json_response, build_text_response, HttpResponse,
};
