use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

/// Configuration for the upstream metrics endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// URL of the Prometheus exposition endpoint to proxy
    pub url: String,
    /// Timeout applied to every upstream fetch
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Whether to verify the upstream TLS certificate
    pub verify_tls: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://127.0.0.1:9090/metrics"),
            timeout: Duration::from_secs(10),
            verify_tls: true,
        }
    }
}

/// Configuration for the gateway HTTP server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address for the HTTP server
    pub bind: String,
    /// Port for the HTTP server
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: String::from("0.0.0.0"),
            port: 9091,
        }
    }
}

/// Resource identity stamped onto every emitted OTLP document
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Value of the `service.name` resource attribute
    pub service_name: String,
    /// Value of the `service.instance.id` resource attribute
    pub service_instance_id: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("vllm-metrics"),
            service_instance_id: String::from("runpod-instance"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Upstream metrics endpoint configuration
    pub upstream: UpstreamConfig,
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Resource identity for converted documents
    pub resource: ResourceConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file("otelbridge.toml"))
            .merge(Env::prefixed("OTELBRIDGE__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("OTELBRIDGE__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_configuration() {
        let config = Configuration::default();

        assert_eq!(config.upstream.url, "http://127.0.0.1:9090/metrics");
        assert_eq!(config.upstream.timeout, Duration::from_secs(10));
        assert!(config.upstream.verify_tls);

        assert_eq!(config.http.bind, "0.0.0.0");
        assert_eq!(config.http.port, 9091);

        assert_eq!(config.resource.service_name, "vllm-metrics");
        assert_eq!(config.resource.service_instance_id, "runpod-instance");
    }

    #[test]
    fn test_configless_operation() {
        // Loading defaults without any config file must succeed
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .extract::<Configuration>()
            .unwrap();

        assert_eq!(config.upstream.url, "http://127.0.0.1:9090/metrics");
    }

    #[test]
    fn test_env_var_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("OTELBRIDGE__UPSTREAM__URL", "https://vllm:8000/metrics");
            jail.set_env("OTELBRIDGE__UPSTREAM__VERIFY_TLS", "false");
            jail.set_env("OTELBRIDGE__HTTP__PORT", "8080");

            let config = Figment::from(Serialized::defaults(Configuration::default()))
                .merge(Env::prefixed("OTELBRIDGE__").split("__"))
                .extract::<Configuration>()
                .unwrap();

            assert_eq!(config.upstream.url, "https://vllm:8000/metrics");
            assert!(!config.upstream.verify_tls);
            assert_eq!(config.http.port, 8080);

            Ok(())
        });
    }

    #[test]
    fn test_toml_file_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "otelbridge.toml",
                r#"
                    [upstream]
                    url = "http://10.0.0.5:8000/metrics"
                    timeout = "30s"

                    [resource]
                    service_name = "inference"
                "#,
            )?;

            let config = Figment::from(Serialized::defaults(Configuration::default()))
                .merge(Toml::file("otelbridge.toml"))
                .extract::<Configuration>()
                .unwrap();

            assert_eq!(config.upstream.url, "http://10.0.0.5:8000/metrics");
            assert_eq!(config.upstream.timeout, Duration::from_secs(30));
            assert_eq!(config.resource.service_name, "inference");
            // Untouched sections keep their defaults
            assert_eq!(config.http.port, 9091);

            Ok(())
        });
    }
}
