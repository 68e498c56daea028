pub mod ddl;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use models::entity::{EntityKind, EntitySchema, FieldDef, FieldType};
pub use postgres::PgStore;
pub use store::{Row, Scope, Store, StoreError};
