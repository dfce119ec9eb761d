// svcsecret-api: Async Rust client for the Snowflake SQL API

pub mod auth;
pub mod error;
pub mod sql;
pub mod transport;

pub use auth::{AccessToken, TokenType};
pub use error::Error;
pub use sql::client::SqlApiClient;
pub use sql::models::{Binding, ColumnType, ResultSet, ResultSetMetaData, StatementContext};
pub use transport::{TlsMode, TransportConfig};
