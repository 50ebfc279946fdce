use thiserror::Error;

/// Top-level error type for the fillet kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Fillet(#[from] FilletError),
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

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to topological operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("wire is not closed")]
    WireNotClosed,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to modelling operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors raised by the fillet engine.
///
/// Configuration errors are reported at the call that caused them and
/// leave the existing contour state untouched. Per-contour blend failures
/// are not errors; they are recorded as faults on the build.
#[derive(Debug, Error)]
pub enum FilletError {
    #[error("contour index {index} is out of range (1..={count})")]
    ContourOutOfRange { index: usize, count: usize },

    #[error("edge does not belong to the shape being filleted")]
    EdgeNotInShape,

    #[error("edge must be shared by exactly two faces, found {faces}")]
    NonManifoldEdge { faces: usize },

    #[error("edge does not belong to contour {contour}")]
    EdgeNotInContour { contour: usize },

    #[error("vertex does not belong to contour {contour}")]
    VertexNotInContour { contour: usize },

    #[error("invalid radius {0}: must be finite and positive")]
    InvalidRadius(f64),

    #[error("invalid radius table: {0}")]
    InvalidLawTable(String),

    #[error("radius law of contour {contour} is not constant")]
    NonConstantLaw { contour: usize },

    #[error("no radius law is defined on contour {contour}")]
    MissingLaw { contour: usize },

    #[error("no result: the fillet has not been built")]
    NotDone,

    #[error("fillet build failed: {0}")]
    BuildFailed(String),

    #[error("{what} index {index} is out of range (1..={count})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        count: usize,
    },
}

/// Convenience type alias for results using [`KernelError`].
pub type Result<T> = std::result::Result<T, KernelError>;
