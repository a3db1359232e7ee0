pub mod credentials;
pub mod database;
pub mod horoscope;
pub mod providers;

pub use credentials::{Credential, CredentialPool, SelectionStrategy};
pub use database::HoroscopeStore;
pub use horoscope::HoroscopeService;
