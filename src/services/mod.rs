//! Services module for checkout business logic

pub mod callback_processor;
pub mod session_orchestrator;

pub use callback_processor::{CallbackError, CallbackProcessor, CallbackResult};
pub use session_orchestrator::{
    InitiationError, InitiationOutcome, InitiationResult, OrchestratorConfig, SessionOrchestrator,
};
