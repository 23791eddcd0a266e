use std::env;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CooldownError, CooldownResult};

const DEFAULT_AUTOBACKUP_PERIOD: u64 = 600;
const DEFAULT_AUTOREMOVE_PERIOD: u64 = 3600;
const DEFAULT_BACKUP_FILE: &str = ".cache/cooldown_backup.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub autobackup_period_secs: u64,
    pub autoremove_period_secs: u64,
    pub backup_file: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autobackup_period_secs: DEFAULT_AUTOBACKUP_PERIOD,
            autoremove_period_secs: DEFAULT_AUTOREMOVE_PERIOD,
            backup_file: default_backup_file(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> CooldownResult<Self> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let config = Config {
            autobackup_period_secs: parse_var(
                "CD_AUTOBACKUP_PERIOD",
                defaults.autobackup_period_secs,
            )?,
            autoremove_period_secs: parse_var(
                "CD_AUTOREMOVE_PERIOD",
                defaults.autoremove_period_secs,
            )?,
            backup_file: env::var("CD_BACKUP_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.backup_file),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            api_base_uri: env::var("API_BASE_URI").unwrap_or(defaults.api_base_uri),
        };
        config.validate()?;
        Ok(config)
    }

    /// 周期为 0 时 tokio 的 interval 会直接 panic
    pub fn validate(&self) -> CooldownResult<()> {
        if self.autobackup_period_secs == 0 {
            return Err(CooldownError::Config {
                key: "CD_AUTOBACKUP_PERIOD",
                reason: "period must be greater than 0".to_string(),
            });
        }
        if self.autoremove_period_secs == 0 {
            return Err(CooldownError::Config {
                key: "CD_AUTOREMOVE_PERIOD",
                reason: "period must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// 监听地址，`SERVER_HOST` 无法解析时退回双栈的未指定地址
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!(
                server_host = %self.server_host,
                "Invalid server_host, falling back to dual-stack default"
            );
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.server_port)
    }

    pub fn autobackup_period(&self) -> Duration {
        Duration::from_secs(self.autobackup_period_secs)
    }

    pub fn autoremove_period(&self) -> Duration {
        Duration::from_secs(self.autoremove_period_secs)
    }
}

fn parse_var<T>(key: &'static str, default: T) -> CooldownResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| CooldownError::Config {
            key,
            reason: format!("{:?}: {}", raw, e),
        }),
        Err(_) => Ok(default),
    }
}

/// 默认备份文件位于可执行文件所在目录下的 `.cache`
fn default_backup_file() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_BACKUP_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_periods() {
        let config = Config::default();
        assert_eq!(config.autobackup_period(), Duration::from_secs(600));
        assert_eq!(config.autoremove_period(), Duration::from_secs(3600));
        assert!(config.backup_file.ends_with("cooldown_backup.json"));
    }

    #[test]
    fn zero_period_is_rejected() {
        let config = Config {
            autoremove_period_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CooldownError::Config {
                key: "CD_AUTOREMOVE_PERIOD",
                ..
            })
        ));
    }

    #[test]
    fn unparsable_host_binds_every_interface() {
        let config = Config {
            server_host: "localhost:80".to_string(),
            server_port: 8080,
            ..Config::default()
        };
        assert_eq!(
            config.socket_addr(),
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 8080)
        );

        let config = Config {
            server_host: "127.0.0.1".to_string(),
            ..Config::default()
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn unset_variable_falls_back_to_default() {
        let value: u64 = parse_var("CD_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
