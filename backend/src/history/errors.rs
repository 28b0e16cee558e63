use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for item {item_id}")]
    Status {
        item_id: i64,
        status: reqwest::StatusCode,
    },

    #[error("history source unavailable: {0}")]
    Unavailable(String),
}
