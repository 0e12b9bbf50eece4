// Query objects and the connections they run on

pub mod connection;
pub(crate) mod execute;
pub mod traits;

// Re-export commonly used items
pub use connection::{ConnectFn, ConnectionProvider, DatabaseUrl};
pub use traits::Query;
