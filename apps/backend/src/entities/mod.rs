pub mod roles;
pub mod user_roles;
pub mod users;

pub use roles::Entity as Roles;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
pub use users::Model as UserModel;
