//! Tests for address lookup settings.

use std::time::Duration;

use crate::config::field;
use crate::resolver::{IpVersion, ResponseFormat, default_providers};

use super::*;

mod providers {
    use super::*;

    #[test]
    fn defaults_when_nothing_configured() {
        let resolver = ResolverConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(resolver.providers, default_providers());
    }

    #[test]
    fn cli_providers_are_text_and_ordered() {
        let cli = cli(&["--provider", "https://a.example,https://b.example/ip"]);
        let resolver = ResolverConfig::from_raw(&cli, None).unwrap();

        let urls: Vec<&str> = resolver.providers.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/", "https://b.example/ip"]);
        assert!(
            resolver
                .providers
                .iter()
                .all(|p| p.format == ResponseFormat::Text)
        );
    }

    #[test]
    fn cli_providers_replace_toml_list() {
        let toml = toml(
            r#"
            [[resolver.providers]]
            url = "https://toml-a.example"

            [[resolver.providers]]
            url = "https://toml-b.example"
        "#,
        );
        let cli = cli(&["--provider", "https://cli.example"]);
        let resolver = ResolverConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(resolver.providers.len(), 1);
        assert_eq!(resolver.providers[0].url.as_str(), "https://cli.example/");
    }

    #[test]
    fn toml_json_provider_uses_field() {
        let toml = toml(
            r#"
            [[resolver.providers]]
            url = "https://example.com/whoami"
            format = "json"
            field = "data.ip"
        "#,
        );
        let resolver = ResolverConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(
            resolver.providers[0].format,
            ResponseFormat::Json {
                field: "data.ip".to_string()
            }
        );
    }

    #[test]
    fn toml_json_provider_defaults_field_to_ip() {
        let toml = toml(
            r#"
            [[resolver.providers]]
            url = "https://example.com/whoami"
            format = "json"
        "#,
        );
        let resolver = ResolverConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(
            resolver.providers[0].format,
            ResponseFormat::Json {
                field: "ip".to_string()
            }
        );
    }

    #[test]
    fn empty_json_field_returns_error() {
        for field in ["", "data..ip", "data."] {
            let toml = toml(&format!(
                "[[resolver.providers]]\nurl = \"https://example.com\"\nformat = \"json\"\nfield = \"{field}\"\n"
            ));
            let result = ResolverConfig::from_raw(&cli(&[]), Some(&toml));

            assert!(
                matches!(result, Err(ConfigError::InvalidProvider { .. })),
                "field {field:?} should be rejected"
            );
        }
    }

    #[test]
    fn field_on_text_provider_returns_error() {
        let toml = toml(
            r#"
            [[resolver.providers]]
            url = "https://example.com"
            field = "ip"
        "#,
        );
        let result = ResolverConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidProvider { .. })));
    }

    #[test]
    fn unknown_provider_format_returns_error() {
        let toml = toml(
            r#"
            [[resolver.providers]]
            url = "https://example.com"
            format = "xml"
        "#,
        );
        let result = ResolverConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidProvider { .. })));
    }

    #[test]
    fn invalid_provider_url_returns_error() {
        let result = ResolverConfig::from_raw(&cli(&["--provider", "ftp://example.com"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidProvider { ref url, .. }) if url == "ftp://example.com"
        ));
    }
}

mod timeout {
    use super::*;

    #[test]
    fn default_is_ten_seconds() {
        let resolver = ResolverConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(resolver.timeout, Duration::from_secs(10));
    }

    #[test]
    fn cli_overrides_toml() {
        let toml = toml(
            r"
            [resolver]
            timeout = 20
        ",
        );
        let resolver =
            ResolverConfig::from_raw(&cli(&["--lookup-timeout", "3"]), Some(&toml)).unwrap();

        assert_eq!(resolver.timeout, Duration::from_secs(3));
    }

    #[test]
    fn zero_returns_error() {
        let result = ResolverConfig::from_raw(&cli(&["--lookup-timeout", "0"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "lookup_timeout",
                ..
            })
        ));
    }
}

mod ip_version {
    use super::*;

    #[test]
    fn default_is_ipv4() {
        let resolver = ResolverConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(resolver.ip_version, IpVersion::V4);
    }

    #[test]
    fn toml_value_is_parsed() {
        let toml = toml(
            r#"
            [resolver]
            ip_version = "IPv6"
        "#,
        );
        let resolver = ResolverConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(resolver.ip_version, IpVersion::V6);
    }

    #[test]
    fn cli_overrides_toml() {
        let toml = toml(
            r#"
            [resolver]
            ip_version = "ipv6"
        "#,
        );
        let resolver =
            ResolverConfig::from_raw(&cli(&["--ip-version", "ipv4"]), Some(&toml)).unwrap();

        assert_eq!(resolver.ip_version, IpVersion::V4);
    }

    #[test]
    fn invalid_toml_value_returns_error() {
        let toml = toml(
            r#"
            [resolver]
            ip_version = "ipv5"
        "#,
        );
        let result = ResolverConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: field::IP_VERSION,
                ..
            })
        ));
    }

    #[test]
    fn watcher_config_carries_resolver_settings() {
        let config =
            ValidatedConfig::from_raw(&with_url(&["--ip-version", "any"]), None).unwrap();

        assert_eq!(config.resolver.ip_version, IpVersion::Any);
    }
}
