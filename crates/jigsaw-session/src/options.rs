//! Session configuration.

use jigsaw_protocol::JoinRequest;

/// Gateway of the public puzzle service.
pub const GATEWAY_URL: &str = "wss://puzzle.aggie.io/ws";

/// `User-Agent` sent when dialing the gateway. The service expects a
/// desktop browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/107.0.0.0 Safari/537.36";

/// Display name used when none is configured.
pub const DEFAULT_USER_NAME: &str = "Puzzle Bot";

/// Display color used when none is configured.
pub const DEFAULT_USER_COLOR: &str = "#00ff00";

/// Configuration for a [`Session`](crate::Session).
///
/// Only `room` is required; everything else has a usable default.
///
/// ```rust
/// use jigsaw_session::SessionOptions;
///
/// let options = SessionOptions::new("abcd")
///     .with_secret("hunter2")
///     .with_user_name("Solver");
/// assert_eq!(options.room, "abcd");
/// assert_eq!(options.join_request().secret.as_deref(), Some("hunter2"));
/// ```
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Room code to join.
    pub room: String,

    /// Room secret for private rooms. An empty string counts as none.
    pub secret: Option<String>,

    /// Display name shown to other participants.
    pub user_name: String,

    /// Display color, as a CSS color string.
    pub user_color: String,

    /// Log every frame sent and received at debug level.
    pub debug: bool,

    /// Proceed even if the server announces a version other than
    /// [`EXPECTED_VERSION`](jigsaw_protocol::EXPECTED_VERSION).
    pub override_version: bool,

    /// WebSocket URL to dial.
    pub gateway_url: String,

    /// `User-Agent` header sent on the upgrade request.
    pub user_agent: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            room: String::new(),
            secret: None,
            user_name: DEFAULT_USER_NAME.to_string(),
            user_color: DEFAULT_USER_COLOR.to_string(),
            debug: false,
            override_version: false,
            gateway_url: GATEWAY_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl SessionOptions {
    /// Options for joining `room` with default identity and gateway.
    pub fn new(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            ..Self::default()
        }
    }

    /// Sets the room secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Sets the display name.
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = name.into();
        self
    }

    /// Sets the display color.
    pub fn with_user_color(mut self, color: impl Into<String>) -> Self {
        self.user_color = color.into();
        self
    }

    /// Enables frame tracing.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Skips the server version check.
    pub fn with_override_version(mut self, override_version: bool) -> Self {
        self.override_version = override_version;
        self
    }

    /// Dials a different gateway.
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Sends a different `User-Agent`.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// The join message these options describe.
    pub fn join_request(&self) -> JoinRequest {
        JoinRequest {
            name: self.user_name.clone(),
            color: self.user_color.clone(),
            room: self.room.clone(),
            secret: self.secret.clone().filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SessionOptions::new("room1");
        assert_eq!(options.room, "room1");
        assert_eq!(options.user_name, "Puzzle Bot");
        assert_eq!(options.user_color, "#00ff00");
        assert_eq!(options.gateway_url, "wss://puzzle.aggie.io/ws");
        assert!(options.user_agent.starts_with("Mozilla/5.0"));
        assert!(!options.debug);
        assert!(!options.override_version);
    }

    #[test]
    fn test_empty_secret_joins_without_secret() {
        let options = SessionOptions::new("room1").with_secret("");
        assert_eq!(options.join_request().secret, None);
    }

    #[test]
    fn test_join_request_carries_identity() {
        let join = SessionOptions::new("room1")
            .with_user_name("Ann")
            .with_user_color("#123456")
            .with_secret("s3")
            .join_request();
        assert_eq!(
            join,
            JoinRequest {
                name: "Ann".into(),
                color: "#123456".into(),
                room: "room1".into(),
                secret: Some("s3".into()),
            }
        );
    }
}
