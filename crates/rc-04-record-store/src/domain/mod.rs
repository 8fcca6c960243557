pub mod errors;
pub mod filters;
pub mod outcome;
pub mod schema;

pub use errors::StoreError;
pub use outcome::{Located, RecordList, SetOutcome, StoreOutcome};
pub use schema::RecordSchema;
