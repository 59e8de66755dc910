pub mod executor;
pub mod operation;
pub mod schema;

pub use executor::ToolExecutor;
pub use operation::{
    CompareParams, NoParams, Operation, OperationName, OperationOutput, ProductParams,
    QuantityParams, RecommendationParams, SearchParams,
};
pub use schema::operations_schema_json;
