//! Tests for CLI vs TOML precedence rules.

use std::time::Duration;

use crate::config::Destination;
use crate::monitor::FirstObservation;
use crate::webhook::PayloadFormat;

use super::*;

mod cli_precedence {
    use super::*;

    #[test]
    fn cli_url_overrides_toml() {
        let cli = cli(&["--url", "https://cli.example.com"]);
        let toml = toml(
            r#"
            [notify]
            url = "https://toml.example.com"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.destination.url().as_str(), "https://cli.example.com/");
    }

    #[test]
    fn cli_format_overrides_toml() {
        let toml = toml(
            r#"
            [notify]
            format = "slack"
        "#,
        );

        let config =
            ValidatedConfig::from_raw(&with_url(&["--format", "text"]), Some(&toml)).unwrap();

        assert_eq!(config.format, PayloadFormat::Text);
    }

    #[test]
    fn cli_first_observation_overrides_toml() {
        let toml = toml(
            r#"
            [notify]
            first_observation = "notify"
        "#,
        );

        let cli = with_url(&["--first-observation", "seed"]);
        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.first_observation, FirstObservation::Seed);
    }

    #[test]
    fn cli_interval_overrides_toml() {
        let toml = toml(
            r"
            [monitor]
            interval = 600
        ",
        );

        let config =
            ValidatedConfig::from_raw(&with_url(&["--interval", "90"]), Some(&toml)).unwrap();

        assert_eq!(config.schedule.interval, Duration::from_secs(90));
    }

    #[test]
    fn cli_bearer_overrides_toml() {
        let toml = toml(
            r#"
            [notify]
            bearer = "toml-token"
        "#,
        );

        let config =
            ValidatedConfig::from_raw(&with_url(&["--bearer", "cli-token"]), Some(&toml)).unwrap();

        assert_eq!(
            config.headers.get("authorization").unwrap(),
            "Bearer cli-token"
        );
    }
}

mod retry_cli_overrides_toml {
    use super::*;

    #[test]
    fn cli_retry_max_overrides_toml() {
        let toml = toml(
            r"
            [retry]
            max_attempts = 10
        ",
        );

        let config =
            ValidatedConfig::from_raw(&with_url(&["--retry-max", "2"]), Some(&toml)).unwrap();

        assert_eq!(config.retry_policy.max_attempts, 2);
    }

    #[test]
    fn cli_retry_delay_overrides_toml() {
        let toml = toml(
            r"
            [retry]
            initial_delay = 20
        ",
        );

        let config =
            ValidatedConfig::from_raw(&with_url(&["--retry-delay", "3"]), Some(&toml)).unwrap();

        assert_eq!(config.retry_policy.initial_delay, Duration::from_secs(3));
    }

    #[test]
    fn toml_only_fields_survive_cli_overrides() {
        let toml = toml(
            r"
            [retry]
            max_attempts = 10
            max_delay = 90
            multiplier = 3.0
        ",
        );

        let config =
            ValidatedConfig::from_raw(&with_url(&["--retry-max", "4"]), Some(&toml)).unwrap();

        assert_eq!(config.retry_policy.max_attempts, 4);
        assert_eq!(config.retry_policy.max_delay, Duration::from_secs(90));
        assert!((config.retry_policy.multiplier - 3.0).abs() < f64::EPSILON);
    }
}

mod destination_choice {
    use super::*;

    #[test]
    fn url_wins_over_bot_credentials() {
        let cli = cli(&[
            "--url",
            "https://example.com/hook",
            "--discord-token",
            "token",
            "--channel-id",
            "42",
        ]);

        let config = ValidatedConfig::from_raw(&cli, None).unwrap();

        assert!(matches!(config.destination, Destination::Webhook(_)));
        assert!(config.headers.get("authorization").is_none());
    }

    #[test]
    fn cli_channel_overrides_toml_channel() {
        let toml = toml(
            r#"
            [notify]
            discord_token = "token"
            channel_id = "1"
        "#,
        );

        let config =
            ValidatedConfig::from_raw(&cli(&["--channel-id", "2"]), Some(&toml)).unwrap();

        assert_eq!(
            config.destination,
            Destination::DiscordBot {
                url: url::Url::parse("https://discord.com/api/v10/channels/2/messages").unwrap(),
                channel_id: "2".to_string(),
            }
        );
    }

    #[test]
    fn bot_credentials_can_mix_sources() {
        let toml = toml(
            r#"
            [notify]
            channel_id = "77"
        "#,
        );

        let config =
            ValidatedConfig::from_raw(&cli(&["--discord-token", "abc"]), Some(&toml)).unwrap();

        assert_eq!(
            config.destination.url().as_str(),
            "https://discord.com/api/v10/channels/77/messages"
        );
        assert_eq!(config.headers.get("authorization").unwrap(), "Bot abc");
    }
}
