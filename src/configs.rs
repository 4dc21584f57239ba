use crate::catalog::gutendex::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECONDS};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod logging;

/// 환경 변수로 설정을 덮어쓸 때 사용하는 접두사 (예: `GUTENDEX_CATALOG__BASE_URL`)
const ENV_PREFIX: &str = "GUTENDEX";
const DEFAULT_STORAGE_DIR: &str = ".gutendex";
const DEFAULT_LOGGER_NAME: &str = "gutendex-browser";

#[derive(Debug)]
pub enum ConfigError {
    Load(String),
    InvalidValue(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(message) => write!(f, "Cannot load config, {}", message),
            ConfigError::InvalidValue(message) => write!(f, "Invalid config value, {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    catalog: CatalogConfig,
    storage: StorageConfig,
    logger: logging::Config,
}

impl AppConfig {
    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn logger(&self) -> &logging::Config {
        &self.logger
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    base_url: String,
    timeout_seconds: u64,
    page_size: u32,
}

impl CatalogConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// 위시리스트와 필터 값이 저장 되는 디렉토리
    dir: String,
}

impl StorageConfig {
    pub fn dir(&self) -> &str {
        &self.dir
    }
}

/// 실행 환경에 따라 .env 파일을 로드한다.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

/// 기본값, `config/{RUN_MODE}.json` 파일, 환경 변수 순서로 설정을 덮어써 로드한다.
/// 설정 파일은 없어도 된다.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    let config = config::Config::builder()
        .set_default("catalog.base_url", DEFAULT_BASE_URL)?
        .set_default("catalog.timeout_seconds", DEFAULT_TIMEOUT_SECONDS as i64)?
        .set_default("catalog.page_size", DEFAULT_PAGE_SIZE as i64)?
        .set_default("storage.dir", DEFAULT_STORAGE_DIR)?
        .set_default("logger.name", DEFAULT_LOGGER_NAME)?
        .add_source(config::File::with_name(&format!("config/{}.json", env)).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    if app_config.catalog.page_size == 0 {
        return Err(ConfigError::InvalidValue("catalog.page_size must be greater than 0".to_string()));
    }
    Ok(app_config)
}
