pub mod catalog;
pub mod comment;
pub mod error;
pub mod ownership;
pub mod pagination;
pub mod post;
pub mod user;
pub mod visibility;
