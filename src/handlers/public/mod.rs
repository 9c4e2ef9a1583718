pub mod health;

pub use health::healthcheck;
