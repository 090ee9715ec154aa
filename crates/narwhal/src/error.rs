pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("node {id:?} is not in the graph")]
    UnknownNode { id: String },

    #[error("setting {parent:?} as parent of {node:?} would create a cycle")]
    ParentCycle { node: String, parent: String },

    #[error("edge {v:?} -> {w:?} touches a cluster; edges must connect leaf nodes")]
    EdgeToCluster { v: String, w: String },

    #[error("parent links require a compound graph")]
    NotCompound,
}
