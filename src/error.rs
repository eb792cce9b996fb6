/// Error types for sqlx-requests
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A scanning operation was called on a request without destination
    #[error("no destination set on the request, can not scan")]
    NoDestination,

    /// The destination or insert input is not of the shape the operation needs
    #[error("passed value should be {expected}, got: {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Record type without any persistable column
    #[error("record `{0}` has no column to insert")]
    EmptySchema(&'static str),

    /// `insert_records` was called with an empty slice
    #[error("passed slice of records is empty")]
    EmptyInput,

    /// Driver cell can not be stored into the destination field
    #[error("field #{index} doesn't have the right type for {cell} (expected: {expected}, got: {found})")]
    TypeMismatch {
        index: usize,
        cell: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Row width differs from the number of destination cells
    #[error("destination expects {expected} column(s), row has {found}")]
    ColumnCount { expected: usize, found: usize },

    /// Destination field can not be written through the given handle
    #[error("field #{index} isn't settable")]
    NotSettable { index: usize },

    /// A record-typed field used as a plain column can not be bound
    #[error("field of record type `{0}` can not be bound as a column value")]
    Unbindable(&'static str),

    /// The driver produced a column type outside the cell vocabulary
    #[error("unsupported column type retrieved from the driver: {0}")]
    UnsupportedCell(String),

    /// Error from SQLx database operations
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for sqlx-requests operations
pub type Result<T> = std::result::Result<T, Error>;
