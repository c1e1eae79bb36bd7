pub mod directory_service;
pub mod file_service;

pub use directory_service::DirectoryService;
pub use file_service::{CreateFileInput, FileService};
