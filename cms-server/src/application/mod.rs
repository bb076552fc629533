pub mod auth_service;
pub mod post_service;
pub mod support_service;
pub mod theme_service;
