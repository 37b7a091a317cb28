/// Business logic layer
pub mod users;

pub use users::UserService;
