pub mod emit;
pub mod iam;
pub mod plan;
pub mod reconcile;
pub mod state;
