pub mod error;
pub mod key;
pub mod records;
pub mod store;
pub mod testing;

pub use error::StateError;
pub use key::{KeyKind, StateKey};
pub use records::{get_client_folder, get_file_token, put_client_folder, put_file_token};
pub use store::StateStore;
