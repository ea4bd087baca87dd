use crate::config::{LogSection, LoggingConfig};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};

const DEFAULT_SECTION: &str = "default";

// -------- level helpers --------
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Explicit subsystem sections, i.e. everything except "default".
fn subsystems<'a>(
    cfg: &'a LoggingConfig,
) -> impl Iterator<Item = (&'a String, &'a LogSection)> + 'a {
    cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_SECTION)
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendCount>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

/// A writer that may be None (drops writes).
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files by target prefix, falling back to
/// the default file.
#[derive(Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl FileRouter {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = FileRouter::default();
        if let Some(section) = cfg.get(DEFAULT_SECTION) {
            router.default = open_section_file(DEFAULT_SECTION, section, base_dir);
        }
        for (name, section) in subsystems(cfg) {
            if let Some(writer) = open_section_file(name, section, base_dir) {
                router.by_prefix.insert(name.clone(), writer);
            }
        }
        router
    }

    /// The longest matching prefix wins, so `halkit::paged` can have its own
    /// file next to `halkit`.
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| matches_prefix(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve_for(meta.target()))
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir` (home_dir).
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a size-capped rotating writer, ensuring the parent directory exists.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendCount::new(max_backups),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None, // file permissions (Unix only)
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn open_section_file(name: &str, section: &LogSection, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100).saturating_mul(1024 * 1024);
    let max_bytes = usize::try_from(max_bytes).unwrap_or(usize::MAX);
    let log_path = resolve_log_path(&section.file, base_dir);

    let max_backups = section.max_backups.unwrap_or(3);

    match create_rotating_writer_at_path(&log_path, max_bytes, max_backups) {
        Ok(writer) => Some(writer),
        Err(e) => {
            // the subscriber is not installed yet
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                log_path.display(),
                e
            );
            None
        }
    }
}

// -------- filters --------

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map_or(LevelFilter::INFO, |s| parse_level(&s.console_level));

    subsystems(cfg).fold(Targets::new().with_default(default), |t, (name, section)| {
        t.with_target(name.clone(), parse_level(&section.console_level))
    })
}

/// Subsystems without a file of their own write to the default file, if any.
fn file_targets(cfg: &LoggingConfig, router: &FileRouter) -> Targets {
    let default = match (cfg.get(DEFAULT_SECTION), &router.default) {
        (Some(section), Some(_)) => parse_level(&section.file_level),
        _ => LevelFilter::OFF,
    };

    subsystems(cfg).fold(Targets::new().with_default(default), |t, (name, section)| {
        let has_file = router.by_prefix.contains_key(name) || router.default.is_some();
        let level = if has_file {
            parse_level(&section.file_level)
        } else {
            LevelFilter::OFF
        };
        t.with_target(name.clone(), level)
    })
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths (usually home_dir)
///
/// Console output goes to stderr so stdout stays free for command output.
/// Calling this more than once keeps the first subscriber.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // Bridge `log` → `tracing` *before* installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let ansi = std::io::stderr().is_terminal();
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = FileRouter::from_config(cfg, base_dir);
    let file_layer = if router.is_empty() {
        None
    } else {
        let targets = file_targets(cfg, &router);
        Some(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(router)
                .with_filter(targets),
        )
    };

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;
    use tracing::Level;

    fn section(console: &str, file: &str, file_level: &str) -> LogSection {
        LogSection {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            ..LogSection::default()
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" Info "), LevelFilter::INFO);
        assert_eq!(parse_level("warn"), LevelFilter::WARN);
        assert_eq!(parse_level("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("invalid"), LevelFilter::INFO);
    }

    #[test]
    fn test_prefix_matching() {
        assert!(matches_prefix("halkit", "halkit"));
        assert!(matches_prefix("halkit::paged", "halkit"));
        assert!(!matches_prefix("halkit_extra::x", "halkit"));
        assert!(!matches_prefix("hal", "halkit"));
    }

    #[test]
    fn test_console_targets_per_subsystem() {
        let mut cfg = default_logging_config();
        cfg.insert("halkit".into(), section("trace", "", "debug"));
        cfg.insert("noisy".into(), section("off", "", "debug"));

        let targets = console_targets(&cfg);
        assert!(targets.would_enable("halkit::resource_builder", &Level::TRACE));
        assert!(!targets.would_enable("noisy::inner", &Level::ERROR));
        // default section is info
        assert!(targets.would_enable("hal_demo", &Level::INFO));
        assert!(!targets.would_enable("hal_demo", &Level::DEBUG));
    }

    #[test]
    fn test_file_targets_without_any_file_are_off() {
        let cfg = default_logging_config();
        let router = FileRouter::default();
        let targets = file_targets(&cfg, &router);
        assert!(!targets.would_enable("hal_demo", &Level::ERROR));
    }

    #[test]
    fn test_router_prefers_longest_prefix() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "logs/all.log", "debug"));
        cfg.insert("halkit".into(), section("info", "logs/halkit.log", "debug"));
        cfg.insert("halkit::paged".into(), section("info", "logs/paged.log", "debug"));

        let router = FileRouter::from_config(&cfg, tmp.path());
        assert_eq!(router.by_prefix.len(), 2);

        let paged = router.resolve_for("halkit::paged").unwrap();
        assert!(Arc::ptr_eq(&paged.0, &router.by_prefix["halkit::paged"].0));

        let builder = router.resolve_for("halkit::resource_builder").unwrap();
        assert!(Arc::ptr_eq(&builder.0, &router.by_prefix["halkit"].0));

        let other = router.resolve_for("hal_demo").unwrap();
        assert!(Arc::ptr_eq(&other.0, &router.default.as_ref().unwrap().0));
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let base_dir = tmp.path();

        let resolved = resolve_log_path("logs/test.log", base_dir);
        assert!(resolved.starts_with(base_dir));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = base_dir.join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/elsewhere")), abs);
    }

    #[test]
    fn test_create_rotating_writer_at_path_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let mut w = create_rotating_writer_at_path(&p, 128 * 1024, 2).unwrap();
        w.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        w.flush().unwrap();
        assert!(p.exists(), "log file must be created");
    }
}
