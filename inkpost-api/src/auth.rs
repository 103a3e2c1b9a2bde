use crate::User;

/// Bearer credential issued by the login endpoint
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TokenPair {
    pub access: AuthToken,
    pub refresh: AuthToken,
    pub user: User,
}
