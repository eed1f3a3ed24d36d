// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DisplayPreference, TracingConfig, TracingScope, WriterConfig,
            rolling_file_appender_impl};
use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, registry::LookupSpan,
                         util::SubscriberInitExt};

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer. Note that
/// [`tracing_subscriber::fmt::format::Pretty`] and
/// [`tracing_subscriber::fmt::format::Compact`] are mutually exclusive.
#[macro_export]
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(false)
    };
}

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Initialize the tracing system with the provided [`TracingConfig`].
///
/// - [`TracingScope::Global`] sets the global default subscriber, which can't be unset or
///   changed afterwards, and returns [`None`].
/// - [`TracingScope::ThreadLocal`] returns a [`dispatcher::DefaultGuard`]. The previous
///   subscriber of this thread is restored when it is dropped.
///
/// # Errors
///
/// Returns an error if the log file can't be opened.
pub fn init(tracing_config: TracingConfig) -> miette::Result<Option<dispatcher::DefaultGuard>> {
    let scope = tracing_config.scope;
    let layers = try_create_layers(tracing_config)?;
    Ok(match scope {
        TracingScope::Global => {
            tracing_subscriber::registry().with(layers).try_init().ok();
            None
        }
        TracingScope::ThreadLocal => {
            Some(tracing_subscriber::registry().with(layers).set_default())
        }
    })
}

/// Returns the layers. This does not initialize the tracing system, see [`init`].
///
/// # Errors
///
/// Returns an error if the log file can't be opened.
pub fn try_create_layers(
    tracing_config: TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<tracing_subscriber::Registry>>>> {
    let mut acc: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    // Global level filter, so layers without their own filter also respect it.
    acc.push(Box::new(tracing_config.get_level_filter()));

    if let Some(layer) = try_create_display_layer(
        tracing_config.get_level_filter(),
        tracing_config.get_writer_config(),
    )? {
        acc.push(layer);
    }

    if let Some(layer) = try_create_file_layer(
        tracing_config.get_level_filter(),
        tracing_config.get_writer_config(),
    )? {
        acc.push(layer);
    }

    Ok(acc)
}

/// This erases the concrete type of the writer, and returns a boxed layer.
///
/// # Errors
///
/// Infallible today, the signature matches [`try_create_file_layer`] so both compose
/// the same way.
#[allow(clippy::unnecessary_wraps)]
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(display_pref, _)
        | WriterConfig::Display(display_pref) => match display_pref {
            DisplayPreference::Stdout => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stdout)
                    .with_filter(level_filter),
            )),
            DisplayPreference::Stderr => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stderr)
                    .with_filter(level_filter),
            )),
            DisplayPreference::OutputDevice(output_device) => {
                let make_writer = move || -> Box<dyn std::io::Write> {
                    Box::new(output_device.clone())
                };
                Some(Box::new(
                    fmt_layer.with_writer(make_writer).with_filter(level_filter),
                ))
            }
        },
        WriterConfig::None | WriterConfig::File(_) => None,
    })
}

/// This erases the concrete type of the writer, and returns a boxed layer.
///
/// # Errors
///
/// Returns an error if the log file can't be opened.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(_, log_file_path)
        | WriterConfig::File(log_file_path) => {
            let file = rolling_file_appender_impl::try_create(log_file_path.as_str())?;
            Some(Box::new(
                fmt_layer.with_writer(file).with_filter(level_filter),
            ))
        }
        WriterConfig::None | WriterConfig::Display(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OutputDevice, OutputDeviceExt};

    fn temp_log_file_path(dir: &tempfile::TempDir) -> String {
        dir.path()
            .join("my_temp_log_file.log")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_try_create_display_layer() {
        let layer: Option<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_display_layer(
                LevelFilter::DEBUG,
                WriterConfig::Display(DisplayPreference::Stdout),
            )
            .unwrap();
        assert!(layer.is_some());
    }

    #[test]
    fn test_try_create_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = temp_log_file_path(&dir);
        let layer: Option<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_file_layer(LevelFilter::DEBUG, WriterConfig::File(file_path.clone()))
                .unwrap();
        assert!(layer.is_some());
        assert!(std::path::Path::new(&file_path).exists());
    }

    #[test]
    fn test_try_create_both_layers() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = temp_log_file_path(&dir);
        let layers = try_create_layers(TracingConfig::new_file_and_display(
            Some(file_path.clone()),
            DisplayPreference::Stderr,
        ))
        .unwrap();
        assert_eq!(layers.len(), 3);
        assert!(std::path::Path::new(&file_path).exists());
    }

    #[test]
    fn test_none_only_has_level_filter() {
        let layers = try_create_layers(TracingConfig {
            writer_config: WriterConfig::None,
            level: tracing::Level::INFO,
            scope: TracingScope::ThreadLocal,
        })
        .unwrap();
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn test_thread_local_output_device_respects_level() {
        let (output_device, stdout_mock) = OutputDevice::new_mock();
        let guard = init(
            TracingConfig::new_display(DisplayPreference::OutputDevice(output_device))
                .with_level(tracing::Level::INFO)
                .with_scope(TracingScope::ThreadLocal),
        )
        .unwrap();
        assert!(guard.is_some());

        tracing::error!("error line");
        tracing::info!("info line");
        tracing::debug!("debug line");
        drop(guard);

        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert!(output.contains("error line"));
        assert!(output.contains("info line"));
        assert!(!output.contains("debug line"));
    }
}
