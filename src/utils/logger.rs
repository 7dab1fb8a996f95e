use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 優先，否則使用指定的預設值
fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

fn cli_filter_directives(verbose: bool) -> &'static str {
    if verbose {
        "ga_pageviews=debug,info"
    } else {
        "ga_pageviews=info"
    }
}

pub fn init_cli_logger(verbose: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(cli_filter_directives(verbose)))
        .with(layer)
        .init();
}

/// 非互動環境（cron、排程器）使用 JSON 格式輸出，方便集中收集
pub fn init_json_logger() {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .json()
        .with_current_span(false);

    tracing_subscriber::registry()
        .with(env_filter("ga_pageviews=info"))
        .with(layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_crate_debug() {
        assert_eq!(cli_filter_directives(true), "ga_pageviews=debug,info");
        assert_eq!(cli_filter_directives(false), "ga_pageviews=info");
    }
}
