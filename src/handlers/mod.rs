// Handlers are split by access tier:
// public (no principal required) and protected (permission-gated route layers).
pub mod protected;
pub mod public;
