//! Core types shared by the resolver, the gate and the tools

mod credentials;
mod display;

pub use credentials::{
    CredentialPair, ValidCredentials, CredentialField, FieldError, CredentialSource,
};
pub use display::{DisplayPolicy, FieldDisplay, mask_secret};
