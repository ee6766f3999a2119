mod client;
mod signature;

pub use client::{CloudinaryClient, CloudinaryConfig};
pub use signature::{SignatureAlgorithm, sign_params};
