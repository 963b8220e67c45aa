//! Action server options.
//!
//! With the `yaml` feature, options can be read from a ROS-style parameter file:
//!
//! ```yaml
//! fibonacci_server:
//!   ros__parameters:
//!     result_timeout: 900.0      # seconds, 0 disables expiry
//!     expiry_check_period: 1.0   # seconds
//!     feedback_depth: 10
//!     status_depth: 1
//! ```

use oxidros_action_core::{Error, Profile, Result};
use std::time::Duration;

/// QoS of the action endpoints and topics, plus how long results are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerQosOption {
    pub goal_service: Profile,
    pub result_service: Profile,
    pub cancel_service: Profile,
    pub feedback_topic: Profile,
    pub status_topic: Profile,
    /// How long a pending result request waits before it is answered with `Unknown`.
    pub result_timeout: Duration,
}

impl Default for ServerQosOption {
    fn default() -> Self {
        Self {
            goal_service: Profile::services_default(),
            result_service: Profile::services_default(),
            cancel_service: Profile::services_default(),
            feedback_topic: Profile::default(),
            status_topic: Profile::action_status_default(),
            result_timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Options of an [`ActionServer`](crate::action::server::ActionServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub qos: ServerQosOption,
    /// How often expired entries are looked for.
    pub expiry_check_period: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            qos: ServerQosOption::default(),
            expiry_check_period: Duration::from_secs(1),
        }
    }
}

impl ServerOptions {
    /// Check the options are usable.
    pub fn validate(&self) -> Result<()> {
        if self.expiry_check_period.is_zero() {
            return Err(Error::InvalidConfig(
                "expiry_check_period must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "yaml")]
mod yaml {
    use super::ServerOptions;
    use oxidros_action_core::{Error, Result};
    use std::{path::Path, time::Duration};
    use tracing::{debug, warn};
    use yaml_rust2::{Yaml, YamlLoader};

    fn seconds(key: &str, value: &Yaml) -> Result<Duration> {
        let secs = match value {
            Yaml::Integer(v) => *v as f64,
            Yaml::Real(_) => value
                .as_f64()
                .ok_or_else(|| Error::InvalidConfig(format!("{key}: invalid float")))?,
            _ => return Err(Error::InvalidConfig(format!("{key}: expected seconds"))),
        };
        Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::InvalidConfig(format!("{key}: {e}")))
    }

    fn depth(key: &str, value: &Yaml) -> Result<usize> {
        value
            .as_i64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| Error::InvalidConfig(format!("{key}: expected a positive integer")))
    }

    impl ServerOptions {
        /// Read the options of `node_name` from a YAML parameter document.
        ///
        /// Keys that are not present keep their default. A document without a section
        /// for `node_name` yields the defaults.
        pub fn from_yaml_str(content: &str, node_name: &str) -> Result<Self> {
            let docs = YamlLoader::load_from_str(content).map_err(|e| Error::Yaml(e.to_string()))?;
            let mut options = ServerOptions::default();

            let params = docs.first().and_then(|doc| {
                let Yaml::Hash(params) = &doc[node_name]["ros__parameters"] else {
                    return None;
                };
                Some(params)
            });
            let Some(params) = params else {
                debug!(node_name, "no ros__parameters section, using defaults");
                return Ok(options);
            };

            for (k, v) in params {
                let Yaml::String(key) = k else {
                    continue;
                };
                match key.as_str() {
                    "result_timeout" => options.qos.result_timeout = seconds(key, v)?,
                    "expiry_check_period" => options.expiry_check_period = seconds(key, v)?,
                    "feedback_depth" => options.qos.feedback_topic.depth = depth(key, v)?,
                    "status_depth" => options.qos.status_topic.depth = depth(key, v)?,
                    other => warn!(node_name, "unknown action server parameter '{other}'"),
                }
            }

            options.validate()?;
            Ok(options)
        }

        /// Read the options of `node_name` from a YAML parameter file.
        pub fn from_yaml_file<P: AsRef<Path>>(path: P, node_name: &str) -> Result<Self> {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?;
            Self::from_yaml_str(&content, node_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ServerOptions::default();
        assert!(options.qos.status_topic.is_transient_local());
        assert_eq!(options.qos.status_topic.depth, 1);
        assert!(!options.qos.feedback_topic.is_transient_local());
        assert_eq!(options.qos.result_timeout, Duration::from_secs(900));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_period_is_invalid() {
        let options = ServerOptions {
            expiry_check_period: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_from_yaml() {
        let yaml = r#"
fib_server:
  ros__parameters:
    result_timeout: 30
    expiry_check_period: 0.5
    feedback_depth: 5
    status_depth: 3
    something_else: true
other_node:
  ros__parameters:
    result_timeout: 1.0
"#;
        let options = ServerOptions::from_yaml_str(yaml, "fib_server").unwrap();
        assert_eq!(options.qos.result_timeout, Duration::from_secs(30));
        assert_eq!(options.expiry_check_period, Duration::from_millis(500));
        assert_eq!(options.qos.feedback_topic.depth, 5);
        assert_eq!(options.qos.status_topic.depth, 3);

        let missing = ServerOptions::from_yaml_str(yaml, "nobody").unwrap();
        assert_eq!(missing, ServerOptions::default());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_from_yaml_bad_values() {
        let yaml = "n:\n  ros__parameters:\n    result_timeout: soon\n";
        assert!(matches!(
            ServerOptions::from_yaml_str(yaml, "n"),
            Err(Error::InvalidConfig(_))
        ));

        let yaml = "n:\n  ros__parameters:\n    status_depth: -1\n";
        assert!(matches!(
            ServerOptions::from_yaml_str(yaml, "n"),
            Err(Error::InvalidConfig(_))
        ));

        let yaml = "n:\n  ros__parameters:\n    expiry_check_period: 0\n";
        assert!(matches!(
            ServerOptions::from_yaml_str(yaml, "n"),
            Err(Error::InvalidConfig(_))
        ));

        assert!(matches!(
            ServerOptions::from_yaml_str("a: [b", "n"),
            Err(Error::Yaml(_))
        ));
    }
}
