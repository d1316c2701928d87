use thiserror::Error;

#[derive(Debug, Clone, Copy, Error)]
pub enum Error {
    #[error("No peripheral claims address {0:#010X}")]
    InvalidAddress(u32),
}
