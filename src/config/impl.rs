use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 允许的分页大小（与前端页面上的选项保持一致）
pub const ALLOWED_PAGE_SIZES: [usize; 5] = [9, 10, 12, 18, 24];

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("SCHOLCHAT")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option(
                "backend.base_url",
                std::env::var("SCHOLCHAT_BACKEND_URL").ok(),
            )?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.normalize()?;

        Ok(app_config)
    }

    /// 规范化并校验配置
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        // 处理工作线程数
        if self.server.workers == 0 {
            self.server.workers = num_cpus::get().min(self.server.max_workers.max(1));
        }

        let trimmed = self.backend.base_url.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::Message(
                "backend.base_url must not be empty".to_string(),
            ));
        }
        self.backend.base_url = trimmed.to_string();

        if !ALLOWED_PAGE_SIZES.contains(&self.presenter.default_page_size) {
            return Err(ConfigError::Message(format!(
                "presenter.default_page_size must be one of {ALLOWED_PAGE_SIZES:?}, got {}",
                self.presenter.default_page_size
            )));
        }

        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let mut config = AppConfig::default();
        assert!(config.normalize().is_ok());
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.presenter.default_page_size, 10);
        assert!(config.server.workers >= 1);
        assert!(config.is_development());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let mut config = AppConfig::default();
        config.backend.base_url = "http://backend:8486/scholchat/".to_string();
        config.normalize().unwrap();
        assert_eq!(config.backend.base_url, "http://backend:8486/scholchat");
    }

    #[test]
    fn test_rejects_unknown_page_size() {
        let mut config = AppConfig::default();
        config.presenter.default_page_size = 7;
        assert!(config.normalize().is_err());
    }

    #[test]
    fn test_rejects_empty_backend_url() {
        let mut config = AppConfig::default();
        config.backend.base_url = "/".to_string();
        assert!(config.normalize().is_err());
    }
}
