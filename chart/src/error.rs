use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("series must contain at least one sample")]
    Empty,

    #[error("sample {index} is earlier than its predecessor")]
    OutOfOrder { index: usize },

    #[error("sample {index} has a non-finite price")]
    NonFinite { index: usize },
}
