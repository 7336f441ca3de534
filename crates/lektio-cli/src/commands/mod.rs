//! Command implementations.

pub mod courses;
pub mod login;
pub mod logout;
pub mod profile;
pub mod register;
pub mod whoami;
