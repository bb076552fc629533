pub mod post_repository;
pub mod theme_repository;
pub mod ticket_repository;
pub mod user_repository;
