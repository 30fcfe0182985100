use secrecy::SecretString;

/// Process-wide secrets resolved at startup.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub signing_key: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(signing_key: SecretString) -> Self {
        Self { signing_key }
    }
}
