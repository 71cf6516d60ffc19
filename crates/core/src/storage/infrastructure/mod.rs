pub mod fs_object_store;
