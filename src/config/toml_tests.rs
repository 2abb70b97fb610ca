//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [notify]
            url = "https://example.com/webhook"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(
            config.notify.url.as_deref(),
            Some("https://example.com/webhook")
        );
    }

    #[test]
    fn parse_full_notify_section() {
        let toml = r#"
            [notify]
            url = "https://api.example.com/hook"
            discord_token = "bot-token"
            channel_id = "42"
            method = "PUT"
            bearer = "secret-token"
            format = "json"
            body_template = '{"ip": "{{new_address}}"}'
            first_observation = "seed"

            [notify.headers]
            X-Custom-Header = "custom-value"
            Content-Type = "application/json"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        let notify = &config.notify;

        assert_eq!(notify.url.as_deref(), Some("https://api.example.com/hook"));
        assert_eq!(notify.discord_token.as_deref(), Some("bot-token"));
        assert_eq!(notify.channel_id.as_deref(), Some("42"));
        assert_eq!(notify.method.as_deref(), Some("PUT"));
        assert_eq!(notify.bearer.as_deref(), Some("secret-token"));
        assert_eq!(notify.format.as_deref(), Some("json"));
        assert_eq!(
            notify.body_template.as_deref(),
            Some(r#"{"ip": "{{new_address}}"}"#)
        );
        assert_eq!(notify.first_observation.as_deref(), Some("seed"));
        assert_eq!(notify.headers.len(), 2);
        assert_eq!(
            notify.headers.get("X-Custom-Header").map(String::as_str),
            Some("custom-value")
        );
    }

    #[test]
    fn parse_resolver_section() {
        let toml = r#"
            [resolver]
            timeout = 5
            ip_version = "ipv4"

            [[resolver.providers]]
            url = "https://api.ipify.org"

            [[resolver.providers]]
            url = "https://example.com/whoami"
            format = "json"
            field = "data.ip"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        let resolver = &config.resolver;

        assert_eq!(resolver.timeout, Some(5));
        assert_eq!(resolver.ip_version.as_deref(), Some("ipv4"));
        assert_eq!(resolver.providers.len(), 2);
        assert!(resolver.providers[0].format.is_none());
        assert_eq!(resolver.providers[1].format.as_deref(), Some("json"));
        assert_eq!(resolver.providers[1].field.as_deref(), Some("data.ip"));
    }

    #[test]
    fn parse_monitor_section() {
        let toml = r#"
            [monitor]
            interval = 120
            jitter_min = 2
            jitter_max = 20
            state_file = "~/state.json"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        let monitor = &config.monitor;

        assert_eq!(monitor.interval, Some(120));
        assert_eq!(monitor.jitter_min, Some(2));
        assert_eq!(monitor.jitter_max, Some(20));
        assert_eq!(monitor.state_file.as_deref(), Some("~/state.json"));
    }

    #[test]
    fn parse_retry_section() {
        let toml = r"
            [retry]
            max_attempts = 5
            initial_delay = 10
            max_delay = 120
            multiplier = 1.5
        ";

        let config = TomlConfig::parse(toml).unwrap();
        let retry = &config.retry;

        assert_eq!(retry.max_attempts, Some(5));
        assert_eq!(retry.initial_delay, Some(10));
        assert_eq!(retry.max_delay, Some(120));
        assert_eq!(retry.multiplier, Some(1.5));
    }

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.notify.url.is_none());
        assert!(config.resolver.providers.is_empty());
        assert!(config.monitor.interval.is_none());
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            [notify]
            url = "https://example.com"
            unknown_field = "value"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn reject_unknown_provider_fields() {
        let toml = r#"
            [[resolver.providers]]
            url = "https://example.com"
            weight = 3
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn reject_unknown_sections() {
        let toml = r#"
            [unknown_section]
            key = "value"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }
}

mod default_template {
    use super::*;

    #[test]
    fn template_is_valid_toml() {
        let template = default_config_template();
        let result = TomlConfig::parse(&template);
        assert!(
            result.is_ok(),
            "Template should be valid TOML: {:?}",
            result.err()
        );
    }

    #[test]
    fn template_contains_all_sections() {
        let template = default_config_template();

        for section in ["[notify]", "[resolver]", "[monitor]", "[retry]"] {
            assert!(template.contains(section), "Template should contain {section}");
        }
    }

    #[test]
    fn template_documents_destinations() {
        let template = default_config_template();

        assert!(template.contains("url"));
        assert!(template.contains("discord_token"));
        assert!(template.contains("channel_id"));
    }

    #[test]
    fn template_lists_body_variables() {
        let template = default_config_template();

        for variable in [
            "{{message}}",
            "{{previous_address}}",
            "{{new_address}}",
            "{{detected_at}}",
            "{{detected_at_unix}}",
            "{{first_observation}}",
        ] {
            assert!(template.contains(variable), "Template should mention {variable}");
        }
    }
}

mod file_loading {
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [notify]
            url = "https://example.com"
        "#
        )
        .unwrap();

        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(config.notify.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let path = Path::new("nonexistent_config_file_12345.toml");
        let result = TomlConfig::load(path);

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn load_invalid_toml_file_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let result = TomlConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
