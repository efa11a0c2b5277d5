//! The Query Evaluator (§4.5): filter, hash-equi-join, grouped aggregation,
//! and projection, each a small composable stage invoked in sequence by the
//! executor. Also hosts the SQL front end (`sql`) and statement dispatcher
//! (`executor`) that drive these stages from parsed text.

pub mod aggregate;
pub mod executor;
pub mod filter;
pub mod join;
pub mod select;
pub mod sql;

pub use aggregate::{group_and_aggregate, AggregateItem, AggregateKind};
pub use filter::{select as filter_select, CompareOp, Predicate, QueryPlanKind};
pub use join::{hash_equi_join, nested_loop_join, JoinedRow};
pub use select::project;
