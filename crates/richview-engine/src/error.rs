use crate::document::NodeId;

/// Failures raised while resolving and rendering a window of children.
///
/// `PathNotFound` is isolated to a single row by the renderer; the other two
/// are propagated to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Node {0} is not reachable from the document root")]
    PathNotFound(NodeId),
    #[error("No position recorded for node {0} in the current render pass")]
    PositionUnknown(NodeId),
    #[error("Invalid viewport configuration: {0}")]
    ConfigurationError(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
