//! # Recognition Module
//!
//! The network exchange with the recognition endpoint and the interpretation
//! of its responses.

pub mod client;
pub mod response;

pub use client::{HttpRecognitionClient, IMAGE_FIELD, RecognitionClient};
pub use response::{
    ClassificationItem, EndpointResponse, RecognitionResponse, classify_response,
};
