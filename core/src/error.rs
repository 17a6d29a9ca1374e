use thiserror::Error;

// Failures the generation pipeline can report.
// None of these escape `Tile::load`; they are logged and the tile degrades.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing data: {0}")]
    MissingData(String),

    #[error("degenerate mesh: {vertices} vertices, {indices} indices")]
    MeshApplyFailure { vertices: usize, indices: usize },
}

pub type Result<T> = std::result::Result<T, TerrainError>;
