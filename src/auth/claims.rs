use serde::{Deserialize, Serialize};

/// JWT payload used for authentication. `sub` stays a string on the wire;
/// parsing it into a user id is the resolver's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}
