//! SQLite storage: schema, connection setup and bulk inserts.

pub mod bulk;
mod functions;
mod model;
mod schema;
pub mod store;

pub use bulk::BulkInserter;
pub use functions::{register_math_functions, MathFunctions};
pub use model::{HasCoordinates, Model};
pub use schema::create_schema;
pub use store::ZipStore;
