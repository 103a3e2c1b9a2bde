#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Full name if set, falling back to the email, then to `ANONYMOUS`
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| Some(&self.email as &str).filter(|e| !e.is_empty()))
            .unwrap_or(crate::ANONYMOUS)
    }

    /// Profile picture URL, with server-relative `/media` paths resolved against `host`
    pub fn avatar_url(&self, host: &str) -> Option<String> {
        let pic = self.profile_picture.as_deref().filter(|p| !p.is_empty())?;
        Some(match pic.starts_with("/media") {
            true => format!("{}{}", host.trim_end_matches('/'), pic),
            false => String::from(pic),
        })
    }
}
