pub mod chat_model;
pub mod doctor_model;
pub mod document_model;

pub use chat_model::*;
pub use doctor_model::*;
pub use document_model::*;
