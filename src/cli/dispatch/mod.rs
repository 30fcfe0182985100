use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

/// Turn parsed matches into an [`Action`] plus process-wide secrets.
///
/// # Errors
///
/// Returns an error if a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let signing_key = matches
        .get_one::<String>("signing-key")
        .map(|s| SecretString::from(s.as_str()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --signing-key"))?;

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        token_ttl_seconds: matches
            .get_one::<u64>("token-ttl")
            .copied()
            .unwrap_or(3600),
    };

    Ok((action, GlobalArgs::new(signing_key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_server_action() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "ritmo",
            "--dsn",
            "postgres://localhost:5432/ritmo",
            "--signing-key",
            "c2VlZA==",
        ]);

        let (action, globals) = handler(&matches)?;
        let Action::Server {
            port,
            dsn,
            token_ttl_seconds,
        } = action;

        assert_eq!(port, 8080);
        assert_eq!(dsn, "postgres://localhost:5432/ritmo");
        assert_eq!(token_ttl_seconds, 3600);
        assert_eq!(globals.signing_key.expose_secret(), "c2VlZA==");
        Ok(())
    }
}
