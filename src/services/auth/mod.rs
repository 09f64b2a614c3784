pub mod access_token;
pub mod bearer;
pub mod error;
pub mod guard;
pub mod password;
pub mod refresh_token;
pub mod token_service;

pub use error::AuthError;
pub use guard::AuthorizationGuard;
pub use refresh_token::RefreshTokenService;
pub use token_service::TokenService;
