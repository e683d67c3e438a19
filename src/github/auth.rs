use super::client::Authentication;
use std::fmt;

#[derive(PartialEq)]
pub struct PersonalAccessToken<'a> {
    token: &'a str,
}

// The raw token must never land in logs.
impl fmt::Debug for PersonalAccessToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonalAccessToken").finish_non_exhaustive()
    }
}

impl<'a> PersonalAccessToken<'a> {
    pub const fn new(token: &'a str) -> Self {
        Self { token }
    }
}

impl Authentication for PersonalAccessToken<'_> {
    fn to_authz_value(&self) -> String {
        format!("Bearer {}", &self.token)
    }
}

#[cfg(test)]
#[test]
fn test_authz_value() {
    let token = PersonalAccessToken::new("t0k3n");
    assert_eq!(token.to_authz_value(), "Bearer t0k3n");
}
