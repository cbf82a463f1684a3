use crate::settings::Log;
use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Used until settings are parsed, unless `RUST_LOG` is set.
const BOOTSTRAP_FILTER: &str = "info";

/// Process-wide subscriber. Starts on the bootstrap filter and switches to
/// `log.filter` once settings are known.
pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    pub fn new_bootstrap() -> Self {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_FILTER));
        let (filter, reload_handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();

        Self { reload_handle }
    }

    pub fn apply_settings(&self, log: &Log) -> Result<()> {
        let filter = build_filter(&log.filter)?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        tracing::debug!(filter = %log.filter, "log filter applied");
        Ok(())
    }
}

fn build_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| anyhow!("log.filter {:?}: {}", directives, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_crate_scoped_directives() {
        assert!(build_filter("ika=debug,info").is_ok());
        assert!(build_filter("warn").is_ok());
    }

    #[test]
    fn rejects_unknown_level() {
        let err = build_filter("ika=loud").unwrap_err();
        assert!(err.to_string().contains("ika=loud"));
    }
}
