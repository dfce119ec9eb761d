// SQL API surface: statement submission, async polling, result sets.

pub mod client;
pub mod models;
