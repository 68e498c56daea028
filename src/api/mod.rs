pub mod format;

pub use format::{keys_to_camel, keys_to_snake, query_to_snake, to_camel_case, to_snake_case};
