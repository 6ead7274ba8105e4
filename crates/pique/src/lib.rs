pub mod config;
pub mod decoy_fdr;
pub mod estimator;
pub mod grid;
pub mod inference;
pub mod protein;
pub mod stats;

#[derive(Debug)]
pub enum Error {
    /// A partial ROC evaluation was requested at more false positives than
    /// the dataset contains
    NotEnoughDecoys { needed: u32, available: u32 },
    /// Target/decoy sequence database could not be read
    Database(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEnoughDecoys { needed, available } => write!(
                f,
                "not enough false positives; needed {} and was only given {}",
                needed, available
            ),
            Self::Database(path) => write!(f, "could not read sequence database: {}", path),
        }
    }
}

impl std::error::Error for Error {}
