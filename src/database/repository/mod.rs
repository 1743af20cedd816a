//! MongoDB repositories.

mod expiry_repository;
mod settings_repository;

pub use expiry_repository::ExpiryRepository;
pub use settings_repository::SettingsRepository;
