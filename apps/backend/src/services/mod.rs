pub mod identity;
pub mod users;

pub use identity::IdentityService;
pub use users::UserService;
