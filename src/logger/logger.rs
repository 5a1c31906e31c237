use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt,
    layer::{Layered, SubscriberExt},
    reload,
    util::SubscriberInitExt,
};

pub struct LogConfig {
    pub filter: String,
    pub json: bool,
}

type Filtered = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type FormatLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Global subscriber whose filter and output format can be swapped once
/// settings are known.
pub struct Logger {
    filter_handle: reload::Handle<EnvFilter, Registry>,
    format_handle: reload::Handle<FormatLayer, Filtered>,
}

impl Logger {
    pub fn new_bootstrap() -> Self {
        let filter = EnvFilter::new("info");
        let (filter, filter_handle) = reload::Layer::new(filter);
        let (format, format_handle) = reload::Layer::new(text_layer());

        tracing_subscriber::registry()
            .with(filter)
            .with(format)
            .init();

        Self {
            filter_handle,
            format_handle,
        }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let filter = EnvFilter::try_new(&config.filter).map_err(|e| anyhow!(e))?;
        self.filter_handle.reload(filter).map_err(|e| anyhow!(e))?;

        let format = if config.json {
            json_layer()
        } else {
            text_layer()
        };
        self.format_handle.reload(format).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

fn text_layer() -> FormatLayer {
    fmt::layer().boxed()
}

fn json_layer() -> FormatLayer {
    fmt::layer().json().with_current_span(false).boxed()
}
