pub mod blob_store;
pub mod notifier;
