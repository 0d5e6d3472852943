//! Инициализация tracing для бинарника.
//!
//! - `RUST_LOG` - фильтр (по умолчанию `job_dispatch=info`)
//! - `DISPATCH_LOG_FORMAT` - `pretty`, `compact` или `json`

use std::{fmt, str::FromStr};
use tracing_subscriber::{fmt as layer_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};


pub const ENV_LOG_FORMAT: &str = "DISPATCH_LOG_FORMAT";
const DEFAULT_FILTER: &str = "job_dispatch=info";


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown log format '{s}', expected pretty, compact or json")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Compact => write!(f, "compact"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl LogFormat {
    pub fn from_env() -> Self {
        std::env::var(ENV_LOG_FORMAT)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}


/// Повторный вызов ничего не делает
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let _ = match format {
        LogFormat::Pretty => registry.with(layer_fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(layer_fmt::layer().compact()).try_init(),
        LogFormat::Json => registry.with(layer_fmt::layer().json()).try_init(),
    };
}
