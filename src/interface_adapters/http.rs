// Shared HTTP response types for consistent API payloads.

use crate::interface_adapters::protocol::PhaseDto;

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

#[derive(Debug, serde::Serialize)]
pub struct PhaseResponse {
    // Board phase after the request was applied.
    pub phase: PhaseDto,
}
