pub mod postgres_chat_repository;
pub mod postgres_doctor_directory;
pub mod postgres_document_repository;

pub use postgres_chat_repository::PostgresChatRepository;
pub use postgres_doctor_directory::PostgresDoctorDirectory;
pub use postgres_document_repository::PostgresDocumentRepository;
