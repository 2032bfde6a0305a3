pub mod claims;
pub mod otp;
pub mod password;
pub mod tokens;

pub use claims::{Claims, TokenPayload, TokenPurpose};
pub use password::PasswordHasher;
pub use tokens::{TokenError, TokenIssuer};
