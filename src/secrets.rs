use std::fmt;

/// Which OAuth1 identity the client signs requests with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningMode {
    /// No consumer key; requests go out unsigned.
    Anonymous,
    /// Consumer key and secret only. Used to fetch a request token.
    ConsumerOnly,
    /// Consumer pair plus a user token pair.
    Full,
}

pub trait SecretsProvider {
    fn get_consumer_key_pair(&self) -> Option<(&str, &str)>;

    fn get_token_pair_option(&self) -> Option<(&str, &str)>;

    fn get_token_option_pair(&self) -> (Option<&str>, Option<&str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or((None, None))
    }

    fn signing_mode(&self) -> SigningMode {
        match (self.get_consumer_key_pair(), self.get_token_pair_option()) {
            (None, _) => SigningMode::Anonymous,
            (Some(_), None) => SigningMode::ConsumerOnly,
            (Some(_), Some(_)) => SigningMode::Full,
        }
    }
}

/// Consumer and (optional) user credentials. Immutable once built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    consumer: Option<(String, String)>,
    token: Option<(String, String)>,
}

impl Credentials {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        let consumer_key = consumer_key.into();
        let consumer_secret = consumer_secret.into();
        let consumer = if consumer_key.is_empty() || consumer_secret.is_empty() {
            None
        } else {
            Some((consumer_key, consumer_secret))
        };
        Credentials {
            consumer,
            token: None,
        }
    }

    pub fn anonymous() -> Self {
        Credentials::default()
    }

    /// Attaches a user token pair. Empty values leave the token unset.
    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        let token = token.into();
        let token_secret = token_secret.into();
        let token = if token.is_empty() && token_secret.is_empty() {
            None
        } else {
            Some((token, token_secret))
        };
        Credentials { token, ..self }
    }

    pub fn consumer_key(&self) -> Option<&str> {
        self.consumer.as_ref().map(|(key, _)| key.as_str())
    }
}

impl SecretsProvider for Credentials {
    fn get_consumer_key_pair(&self) -> Option<(&str, &str)> {
        self.consumer
            .as_ref()
            .map(|(key, secret)| (key.as_str(), secret.as_str()))
    }

    fn get_token_pair_option(&self) -> Option<(&str, &str)> {
        // a token is useless without the consumer pair that issued it
        self.consumer.as_ref()?;
        self.token
            .as_ref()
            .map(|(token, secret)| (token.as_str(), secret.as_str()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key())
            .field("mode", &self.signing_mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static CONSUMER_KEY: &str = "<CONSUMER_KEY>";
    static CONSUMER_SECRET: &str = "<CONSUMER_SECRET>";
    static TOKEN: &str = "<ACCESS_TOKEN>";
    static TOKEN_SECRET: &str = "<TOKEN_SECRET>";

    #[test]
    fn mode_follows_present_fields() {
        assert_eq!(Credentials::anonymous().signing_mode(), SigningMode::Anonymous);
        let consumer = Credentials::new(CONSUMER_KEY, CONSUMER_SECRET);
        assert_eq!(consumer.signing_mode(), SigningMode::ConsumerOnly);
        let full = consumer.token(TOKEN, TOKEN_SECRET);
        assert_eq!(full.signing_mode(), SigningMode::Full);
        assert_eq!(full.get_token_option_pair(), (Some(TOKEN), Some(TOKEN_SECRET)));
    }

    #[test]
    fn token_without_consumer_is_anonymous() {
        let creds = Credentials::new("", "").token(TOKEN, TOKEN_SECRET);
        assert_eq!(creds.signing_mode(), SigningMode::Anonymous);
        assert_eq!(creds.get_token_option_pair(), (None, None));
    }

    #[test]
    fn debug_hides_secrets() {
        let creds = Credentials::new(CONSUMER_KEY, CONSUMER_SECRET).token(TOKEN, TOKEN_SECRET);
        let printed = format!("{:?}", creds);
        assert!(printed.contains(CONSUMER_KEY));
        assert!(!printed.contains(CONSUMER_SECRET));
        assert!(!printed.contains(TOKEN_SECRET));
    }
}
