//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod room_dto;

pub use common_dto::*;
pub use room_dto::*;
