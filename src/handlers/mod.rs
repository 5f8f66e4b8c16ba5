// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer JWT, identity injected by middleware)
pub mod public;
pub mod protected;
