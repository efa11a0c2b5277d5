pub mod data_type;
pub mod ids;
pub mod schema;
pub mod value;

pub use data_type::DataType;
pub use ids::{RowId, TransactionId};
pub use schema::{ColumnDef, ForeignKeyRef, Schema};
pub use value::Value;

/// A single row's values, in column order. Row identity lives outside this
/// type (`RowId`), so a `Row` by itself is just the tuple.
pub type Row = Vec<Value>;
