mod order_flow_api;
mod reconciler_api;

pub use order_flow_api::OrderFlowApi;
pub use reconciler_api::{ReconcileOutcome, ReconcilerApi};
