pub mod horoscope;
pub mod sign;

pub use horoscope::{Horoscope, HoroscopeRecord, SignInfo, Source};
pub use sign::Sign;
