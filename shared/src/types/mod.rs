//! Common types shared by every conversion service

pub mod error;
pub mod response;
