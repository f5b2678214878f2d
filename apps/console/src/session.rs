/// Caller identity for backend calls. The token is attached as a bearer
/// header when present; expiry is the backend's problem (an expired token
/// simply starts failing with 401s and the realtime server disconnects).
#[derive(Debug, Clone, Default)]
pub struct Session {
    access_token: Option<String>,
    pro_member: bool,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Session {
            access_token: Some(access_token.into()),
            pro_member: false,
        }
    }

    pub fn anonymous() -> Self {
        Session::default()
    }

    pub fn with_pro(mut self, pro_member: bool) -> Self {
        self.pro_member = pro_member;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Pro members have no match quota and skip the usage panel.
    pub fn pro_member(&self) -> bool {
        self.pro_member
    }

    /// Session for the daemon process, from `ACCESS_TOKEN` / `PRO_MEMBER`.
    pub fn from_env() -> Self {
        let access_token = std::env::var("ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let pro_member = std::env::var("PRO_MEMBER")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);
        Session {
            access_token,
            pro_member,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_no_token() {
        let session = Session::anonymous();
        assert_eq!(session.token(), None);
        assert!(!session.pro_member());
    }

    #[test]
    fn pro_flag_travels_with_the_session() {
        let session = Session::new("tok-123").with_pro(true);
        assert_eq!(session.token(), Some("tok-123"));
        assert!(session.pro_member());
    }
}
