// src/models/mod.rs
pub mod checkin;

pub use checkin::{
    CheckInBody,
    CheckInQuery,
    CheckInResponse,
    LocationView,
    PaymentRequestResponse,
    ProgressResponse,
    ReferenceQuery,
    ReferenceStatusResponse,
    ServiceDescriptor,
};
