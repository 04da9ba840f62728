pub mod grading_flow;
pub mod pending_request;

pub use grading_flow::GradingFlow;
pub use pending_request::PendingRequest;
