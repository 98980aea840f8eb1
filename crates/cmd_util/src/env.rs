use std::{
    env,
    fmt::Debug,
    fs::File,
    io,
    str::FromStr,
    sync::LazyLock,
};

use tracing::Level;
use tracing_subscriber::{
    fmt::{
        format::format,
        MakeWriter,
    },
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

/// Environment variable naming a file that receives a copy of all `INFO`
/// and above events, in addition to the regular writer.
pub const TRACE_FILE_VAR: &str = "DNS_STATS_TRACE_FILE";

/// Read a typed value from the environment, falling back to `default` when
/// the variable is missing or doesn't parse.
pub fn env_config<T: Debug + FromStr>(name: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    let var_s = match env::var(name) {
        Ok(s) => s,
        Err(env::VarError::NotPresent) => return default,
        Err(env::VarError::NotUnicode(..)) => {
            tracing::warn!("Invalid value for {name}, falling back to {default:?}.");
            return default;
        },
    };
    match T::from_str(&var_s) {
        Ok(v) => {
            tracing::info!("Overriding {name} to {v:?} from environment");
            v
        },
        Err(e) => {
            tracing::warn!("Invalid value {var_s} for {name}, falling back to {default:?}: {e:?}");
            default
        },
    }
}

static TRACE_FILE: LazyLock<Option<File>> = LazyLock::new(|| {
    let filename = env::var(TRACE_FILE_VAR).ok()?;
    match File::create(&filename) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not create trace file {filename}: {e}");
            None
        },
    }
});

/// Guard object. Hold onto it for as long as you'd like to keep tracing to
/// the file named by `DNS_STATS_TRACE_FILE`.
pub struct TracingGuard {
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Call this from command line tools at startup.
pub fn config_tool() -> TracingGuard {
    config_tracing(io::stderr, Level::ERROR)
}

fn config_tracing<W>(writer: W, level: Level) -> TracingGuard
where
    W: Send + Sync + for<'writer> MakeWriter<'writer> + 'static,
{
    let mut layers = Vec::new();
    let color_disabled = env::var("NO_COLOR").is_ok();
    let format_layer = tracing_subscriber::fmt::layer()
        .with_ansi(!color_disabled)
        .with_writer(writer);
    let format_layer = match env::var("LOG_FORMAT") {
        Ok(s) if s == "json" => format_layer.event_format(format().json()).boxed(),
        Ok(s) if s == "pretty" => format_layer.event_format(format().pretty()).boxed(),
        _ => format_layer.event_format(format().compact()).boxed(),
    };
    let format_layer = format_layer
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str())),
        )
        .boxed();
    layers.push(format_layer);

    let guard = if let Some(ref file) = *TRACE_FILE {
        let (file_writer, guard) = tracing_appender::non_blocking(file);
        let file_writer_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
            .boxed();
        layers.push(file_writer_layer);
        Some(guard)
    } else {
        None
    };
    tracing_subscriber::registry().with(layers).init();

    TracingGuard { _guard: guard }
}

/// Route tracing output through the test harness. Safe to call from every
/// test.
pub fn config_test() {
    // Initialization fails if another test already installed a subscriber,
    // which is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::env_config;

    #[test]
    fn test_env_config_missing_uses_default() {
        assert_eq!(
            env_config("CMD_UTIL_TEST_SURELY_UNSET_VARIABLE", 60usize),
            60
        );
    }

    #[test]
    fn test_env_config_unparseable_uses_default() {
        // Variables are process-global, so each test uses its own name.
        std::env::set_var("CMD_UTIL_TEST_UNPARSEABLE", "sixty");
        assert_eq!(env_config("CMD_UTIL_TEST_UNPARSEABLE", 60usize), 60);
    }

    #[test]
    fn test_env_config_override() {
        std::env::set_var("CMD_UTIL_TEST_OVERRIDE", "24");
        assert_eq!(env_config("CMD_UTIL_TEST_OVERRIDE", 60usize), 24);
    }
}
