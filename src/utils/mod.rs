pub mod geo;
pub mod logger;
pub mod qr;
pub mod time;
