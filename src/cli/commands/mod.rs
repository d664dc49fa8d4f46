pub mod auth;
pub mod logging;

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

    let command = Command::new("clubhouse")
        .about("Sports club management backend")
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
                .env("CLUBHOUSE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("CLUBHOUSE_DSN")
                .required(true),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "clubhouse");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Sports club management backend".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_port_and_dsn() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "clubhouse",
            "--port",
            "8080",
            "--dsn",
            "postgres://localhost:5432/clubhouse",
            "--jwt-secret",
            "test-secret",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<String>("dsn").map(String::as_str),
            Some("postgres://localhost:5432/clubhouse")
        );
    }

    #[test]
    fn test_defaults() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "clubhouse",
            "--dsn",
            "postgres://localhost:5432/clubhouse",
            "--jwt-secret",
            "test-secret",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(matches.get_one::<i64>("token-ttl-seconds").copied(), Some(86400));
        assert_eq!(matches.get_one::<u32>("bcrypt-cost").copied(), Some(12));
        assert_eq!(matches.get_one::<u32>("lockout-threshold").copied(), Some(5));
        assert_eq!(
            matches.get_one::<i64>("lockout-minutes").copied(),
            Some(30)
        );
    }
}
