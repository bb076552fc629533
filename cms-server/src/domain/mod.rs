pub mod error;
pub mod post;
pub mod theme;
pub mod ticket;
pub mod user;

pub use error::DomainError;
pub use post::Post;
pub use theme::ThemeImage;
pub use ticket::SupportTicket;
pub use user::User;
