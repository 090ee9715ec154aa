pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cm_graphs_core::Error),

    #[error("graph layout failed: {0}")]
    Graph(#[from] narwhal::Error),

    #[error("{chart} chart cannot use {found} data")]
    DataMismatch { chart: String, found: String },

    #[error("flow id {id:?} is declared more than once")]
    DuplicateId { id: String },

    #[error("unknown element {id:?}")]
    UnknownElement { id: String },

    #[error("handle index {index} is out of range")]
    InvalidHandle { index: usize },

    #[error("failed to serialize event payload: {0}")]
    Payload(#[from] serde_json::Error),
}
