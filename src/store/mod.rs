pub mod archive;
pub mod config;
pub mod locate;
pub mod mutate;
pub mod reconcile;
pub mod report;
pub mod verify;
pub mod version;
