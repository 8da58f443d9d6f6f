//! Data models exchanged with the processor and the game server.

/// Game server outcomes, real or synthesized
pub mod outbound;
/// Inbound notifications, enriched records and response bodies
pub mod payment;
