//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use cohort_config::CohortsConfig;
use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;

#[test]
fn loads_analytics_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[analytics]
service_account_path = "/keys/reporting.json"
view_id = "98765"
scopes = ["https://www.googleapis.com/auth/analytics"]
identifier_dimension = "ga:dimension1"
metric = "ga:sessions"
page_size = 500
"#,
        )?;

        let config: CohortsConfig = Figment::from(Serialized::defaults(CohortsConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.analytics.service_account_path, "/keys/reporting.json");
        assert_eq!(config.analytics.view_id, "98765");
        assert_eq!(
            config.analytics.scopes,
            vec!["https://www.googleapis.com/auth/analytics".to_string()]
        );
        assert_eq!(config.analytics.identifier_dimension, "ga:dimension1");
        assert_eq!(config.analytics.metric, "ga:sessions");
        assert_eq!(config.analytics.page_size, 500);
        assert!(config.analytics.is_configured());
        assert!(config.analytics.validate().is_ok());
        Ok(())
    });
}

#[test]
fn partial_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[analytics]
view_id = "1"

[general]
keep_members = true
"#,
        )?;

        let config: CohortsConfig = Figment::from(Serialized::defaults(CohortsConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.analytics.view_id, "1");
        assert_eq!(config.analytics.metric, "ga:users");
        assert_eq!(config.analytics.page_size, 10_000);
        assert!(!config.analytics.is_configured());
        assert!(config.general.keep_members);
        assert_eq!(config.general.default_start_date, "30daysAgo");
        Ok(())
    });
}

#[test]
fn project_local_config_is_discovered() {
    Jail::expect_with(|jail| {
        jail.create_dir(".cohorts")?;
        jail.create_file(
            ".cohorts/config.toml",
            r#"
[analytics]
service_account_path = "sa.json"
view_id = "42"
"#,
        )?;

        let config = CohortsConfig::load_from(jail.directory()).expect("config loads");
        assert_eq!(config.analytics.view_id, "42");
        assert!(config.analytics.is_configured());
        Ok(())
    });
}

#[test]
fn wrong_type_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[analytics]
page_size = "lots"
"#,
        )?;

        let result: Result<CohortsConfig, _> =
            Figment::from(Serialized::defaults(CohortsConfig::default()))
                .merge(Toml::file("config.toml"))
                .extract();
        assert!(result.is_err());
        Ok(())
    });
}
