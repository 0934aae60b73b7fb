//! Daily market data acquisition: bar models, look-back periods and providers.

pub mod errors;
pub mod models;
pub mod providers;
pub mod requests;

pub use errors::Unavailable;
pub use requests::historical::fetch_history;
