//! §7 — the single fallible-construction path. `TryPop` never fails (it
//! returns `Option`, not `Result`); allocation failure is left to the
//! allocator's normal abort contract.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("max_level must be at least 1, got {0}")]
    InvalidMaxLevel(u32),
}
