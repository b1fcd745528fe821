pub mod chat_repository;
pub mod doctor_directory;
pub mod document_repository;

pub use chat_repository::ChatRepository;
pub use doctor_directory::DoctorDirectory;
pub use document_repository::DocumentRepository;
