pub mod fs_repo;
pub mod image_storage;
