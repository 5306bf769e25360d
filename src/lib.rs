pub mod config;
pub mod decode;
pub mod error;
pub mod export;
pub mod processing {
    pub mod compose;
    pub mod layout;
}
pub mod tasks {
    pub mod merge;
}

pub use error::{MergeError, Slot};
