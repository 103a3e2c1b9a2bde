use crate::api::{AuthToken, TokenPair, UserId};

/// The signed-in user on whose behalf comment actions are sent
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Viewer {
    pub user: UserId,
    pub token: AuthToken,
}

impl From<TokenPair> for Viewer {
    fn from(t: TokenPair) -> Viewer {
        Viewer {
            user: t.user.id,
            token: t.access,
        }
    }
}
