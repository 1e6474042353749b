pub mod auth;
pub mod error;
pub mod ids;
pub mod mailer;
pub mod middleware;
pub mod otp;
pub mod requests;
pub mod routes;
pub mod state;
pub mod tokens;
pub mod trips;
