pub mod health;
pub mod horoscope;
