pub mod process_worker_pool;
