pub mod channels;
pub mod health;
pub mod proxy;
