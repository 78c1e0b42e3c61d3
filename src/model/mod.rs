pub mod member;
pub mod room;
pub mod trip;
pub mod user;
