use thiserror::Error;

/// Top-level error type for the roomform geometry engine.
#[derive(Debug, Error)]
pub enum RoomformError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Sketch(#[from] SketchError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors raised when a polygon edit would leave a room in an invalid state.
///
/// These are returned before the mutation is committed; the room keeps its
/// previous vertex array.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon edges {0} and {1} intersect")]
    SelfIntersecting(usize, usize),

    #[error("polygon has zero area")]
    ZeroArea,

    #[error("edit reverses the polygon winding")]
    WindingFlipped,

    #[error("polygon edge {0} has zero length")]
    ZeroLengthEdge(usize),

    #[error("vertex index {index} out of range for polygon with {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Errors related to malformed sketches handed to the solver.
#[derive(Debug, Error)]
pub enum SketchError {
    #[error("duplicate primitive id `{0}`")]
    DuplicateId(String),

    #[error("primitive `{owner}` references unknown id `{target}`")]
    UnknownReference { owner: String, target: String },

    #[error("primitive `{owner}` expects `{target}` to be a {expected}")]
    WrongKind {
        owner: String,
        target: String,
        expected: &'static str,
    },

    #[error("sketch has no point `{0}`")]
    MissingPoint(String),
}

/// Errors related to engine operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`RoomformError`].
pub type Result<T> = std::result::Result<T, RoomformError>;
