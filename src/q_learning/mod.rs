pub mod agent;
pub mod value_table;

pub use agent::{QAgent, QParams};
pub use value_table::ValueTable;
