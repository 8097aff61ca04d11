pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, TokenError, TokenService};
pub use middleware::{authenticate, bearer_token, resolve_principal};
pub use password::{encode_password, hash_password, verify_password};
pub use service::{AuthFailure, AuthService, LoginOutcome};
