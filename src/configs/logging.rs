use crate::configs::ConfigError;
use serde::Deserialize;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// 로그 파일이 저장될 디렉토리로 설정 되지 않을 시 stderr 로만 로그를 출력한다.
    #[serde(default)]
    dir: Option<String>,
    name: String,

    /// 최대 로그 파일 개수로 로그 파일이 설정한 개수보다 커질 경우 기존의 로그파일들은 삭제 된다.
    /// 설정 되지 않을 시 로그 파일은 삭제 되지 않는다.
    #[serde(default)]
    keep: Option<usize>,

    /// 출력할 로그의 레벨로 지정된 로그 레벨 이상만 로깅된다.
    /// 설정하지 않을시 기본값은 WARN 으로 설정 된다.
    ///
    /// 이 값은 [`tracing::Level`]로 변환 됨으로 자세한 사항은 해당 파일을 확인
    #[serde(default)]
    level: Option<String>,

    /// 로깅 파일이 분리 되는 기간으로 .log 파일 하나 당 설정된 기간 동안 로그가 기록 된다.
    /// 설정 되지 않을시 기본값은 DAILY로 설정된다.
    ///
    /// 이 값은 [`rolling::Rotation`]으로 변환 됨으로 자세한 사항은 해당 파일을 확인
    #[serde(default)]
    rotation: Option<String>,
}

/// 전역 로깅 설정을 한다.
///
/// 파일 로깅을 사용할 경우 반환된 [`WorkerGuard`]가 drop 되는 순간 로그 파일 기록이 중단 됨으로
/// 프로그램이 종료 될 때까지 가지고 있어야 한다.
pub fn set_global_logging_config(c: &Config) -> Result<Option<WorkerGuard>, ConfigError> {
    let level = match &c.level {
        Some(level) => parse_level(level)?,
        None => tracing::Level::WARN,
    };

    let Some(dir) = &c.dir else {
        init_subscriber(std::io::stderr, level)?;
        return Ok(None);
    };

    let rotation = match &c.rotation {
        Some(rotation) => parse_rotation(rotation)?,
        None => rolling::Rotation::DAILY,
    };

    let mut file_appender = rolling::RollingFileAppender::builder()
        .filename_prefix(c.name.clone())
        .filename_suffix("log")
        .rotation(rotation);

    if let Some(keep) = c.keep {
        file_appender = file_appender.max_log_files(keep);
    }

    let file_appender = file_appender.build(dir)
        .map_err(|e| ConfigError::InvalidValue(format!("로그 파일을 생성할 수 없습니다. => {}", e)))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    init_subscriber(std::io::stderr.and(non_blocking), level)?;

    Ok(Some(guard))
}

fn init_subscriber<W>(writer: W, level: tracing::Level) -> Result<(), ConfigError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_timer(LocalTime::new(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]")))
        .with_writer(writer)
        .with_max_level(level)
        .try_init()
        .map_err(|e| ConfigError::InvalidValue(e.to_string()))
}

fn parse_rotation(s: &str) -> Result<rolling::Rotation, ConfigError> {
    match s {
        "DAILY" => Ok(rolling::Rotation::DAILY),
        "HOURLY" => Ok(rolling::Rotation::HOURLY),
        "MINUTELY" => Ok(rolling::Rotation::MINUTELY),
        "NEVER" => Ok(rolling::Rotation::NEVER),
        _ => Err(ConfigError::InvalidValue(format!(
            "로깅 파일 로테이션(rotation)은 \"DAILY\", \"HOURLY\", \"MINUTELY\", \"NEVER\"만 가능 합니다. (입력: {})", s
        ))),
    }
}

fn parse_level(l: &str) -> Result<tracing::Level, ConfigError> {
    match l {
        "TRACE" => Ok(tracing::Level::TRACE),
        "DEBUG" => Ok(tracing::Level::DEBUG),
        "INFO" => Ok(tracing::Level::INFO),
        "WARN" => Ok(tracing::Level::WARN),
        "ERROR" => Ok(tracing::Level::ERROR),
        _ => Err(ConfigError::InvalidValue(format!(
            "로그 레벨(level)은 \"TRACE\", \"DEBUG\", \"INFO\", \"WARN\", \"ERROR\"만 가능 합니다. (입력: {})", l
        ))),
    }
}
