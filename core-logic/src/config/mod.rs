use serde::{Deserialize, Serialize};

/// Connection parameters for the outbound proxy.
///
/// Handed out by value on every resolve; never shared mutably.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyRoute {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub hostname: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
}

/// Proxy files in the wild carry the port as either a number or a string.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct PortVisitor;

    impl<'de> serde::de::Visitor<'de> for PortVisitor {
        type Value = u16;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a port number as integer or string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse::<u16>()
                .map_err(|_| E::custom(format!("invalid port '{}'", value)))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u16::try_from(value).map_err(|_| E::custom("port out of range"))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u16::try_from(value).map_err(|_| E::custom("port out of range"))
        }
    }

    deserializer.deserialize_any(PortVisitor)
}

impl ProxyRoute {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            username: None,
            password: None,
            hostname: hostname.into(),
            port,
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Base proxy URL without credentials (`http://host:port`).
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }

    /// Credentials for proxy basic auth, when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) if !u.is_empty() => Some((u.as_str(), p.as_str())),
            _ => None,
        }
    }
}
