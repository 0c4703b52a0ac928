//! Port traits (interfaces) for dependency injection

pub mod cache;
pub mod storage;

pub use cache::Cache;
pub use storage::UserStore;

#[cfg(test)]
pub use cache::MockCache;
#[cfg(test)]
pub use storage::MockUserStore;
