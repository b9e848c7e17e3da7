pub mod logging;
pub mod relay;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("signin-relay")
        .about("Centralized sign-in relay")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("RELAY_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = relay::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "signin-relay");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Centralized sign-in relay".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_args() {
        temp_env::with_vars(
            [
                ("RELAY_REDIRECT_ALLOWLIST", None::<&str>),
                ("RELAY_COOKIE_SECURE", None::<&str>),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec![
                    "signin-relay",
                    "--port",
                    "9090",
                    "--google-client-id",
                    "client.apps.googleusercontent.com",
                    "--cookie-secure",
                    "--redirect-allowlist",
                    "https://app.example,https://other.example/cb",
                ]);

                assert_eq!(matches.get_one::<u16>("port").copied(), Some(9090));
                assert_eq!(
                    matches
                        .get_one::<String>(relay::ARG_GOOGLE_CLIENT_ID)
                        .cloned(),
                    Some("client.apps.googleusercontent.com".to_string())
                );
                assert!(matches.get_flag(relay::ARG_COOKIE_SECURE));
                assert_eq!(
                    matches
                        .get_many::<String>(relay::ARG_REDIRECT_ALLOWLIST)
                        .map(|values| values.cloned().collect::<Vec<_>>()),
                    Some(vec![
                        "https://app.example".to_string(),
                        "https://other.example/cb".to_string()
                    ])
                );
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("RELAY_PORT", Some("443")),
                ("RELAY_FACEBOOK_APP_ID", Some("1047602349023620")),
                ("RELAY_BACKEND_TIMEOUT", Some("3")),
                ("RELAY_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["signin-relay"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches
                        .get_one::<String>(relay::ARG_FACEBOOK_APP_ID)
                        .cloned(),
                    Some("1047602349023620".to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>(relay::ARG_BACKEND_TIMEOUT).copied(),
                    Some(3)
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("RELAY_LOG_LEVEL", Some(level))], || {
                let command = new();
                let matches = command.get_matches_from(vec!["signin-relay"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("RELAY_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["signin-relay".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_invalid_port_fails() {
        let result = new().try_get_matches_from(vec!["signin-relay", "--port", "http"]);
        assert_eq!(
            result.map_err(|e| e.kind()).map(|_| ()),
            Err(clap::error::ErrorKind::ValueValidation)
        );
    }
}
