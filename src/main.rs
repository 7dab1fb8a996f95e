use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use ga_pageviews::utils::error::{AnalyticsError, ErrorSeverity};
use ga_pageviews::utils::{logger, validation::Validate};
use ga_pageviews::{
    AnalyticsClient, AnalyticsSettings, CliConfig, DateRange, LocalStorage,
    LookupDocumentResolver, OutputFormat, PageviewAggregator, RangeWalker, ReportEngine,
    ResolveOptions, TomlConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting ga-pageviews");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    apply_overrides(&mut config, &args);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let range = match resolve_range(&args) {
        Ok(range) => range,
        Err(e) => fail(&e),
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No API calls will be made");
        print_plan(&config, range);
        return Ok(());
    }

    match run(&config, range, args.verbose).await {
        Ok(written) => {
            let output = std::path::Path::new(config.output_path()).join(written);
            tracing::info!("✅ Pageview report completed successfully!");
            println!("✅ Pageview report completed successfully!");
            println!("📁 Output saved to: {}", output.display());
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

async fn run(config: &TomlConfig, range: DateRange, verbose: bool) -> ga_pageviews::Result<String> {
    let format: OutputFormat = config.output_format().parse()?;
    let settings = AnalyticsSettings::from_config(config)?;
    let resolver = LookupDocumentResolver::from_path(
        &config.documents.lookup_file,
        ResolveOptions::from_config(config),
    )?;
    tracing::info!("📚 Loaded {} documents from lookup table", resolver.len());

    let client = AnalyticsClient::connect(&settings).await?;
    let aggregator = PageviewAggregator::new(client, resolver)
        .with_retry_policy(config.retry_policy())
        .verbose(verbose);

    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = ReportEngine::new(aggregator, storage, format, config.output_filename());
    engine.run(range).await
}

fn apply_overrides(config: &mut TomlConfig, args: &CliConfig) {
    if args.output.is_none() && args.format.is_none() {
        return;
    }

    let mut output = config.output.clone().unwrap_or(ga_pageviews::config::toml_config::OutputConfig {
        path: "./output".to_string(),
        format: None,
        filename: None,
    });
    if let Some(path) = &args.output {
        output.path = path.clone();
        tracing::info!("🔧 Output path overridden to: {}", path);
    }
    if let Some(format) = &args.format {
        output.format = Some(format.clone());
        // 格式改變時檔名也跟著改，除非設定檔指定了檔名
        tracing::info!("🔧 Output format overridden to: {}", format);
    }
    config.output = Some(output);
}

fn resolve_range(args: &CliConfig) -> ga_pageviews::Result<DateRange> {
    let end_date = args.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start_date = match args.start_date {
        Some(date) => date,
        None => end_date
            .checked_sub_days(Days::new(90))
            .unwrap_or(NaiveDate::MIN),
    };
    DateRange::new(start_date, end_date)
}

fn print_plan(config: &TomlConfig, range: DateRange) {
    println!("📋 Query Plan:");
    println!("  Profile: ga:{}", config.analytics.profile_id);
    println!("  Locale: {}", config.locale());
    println!("  Range: {} to {}", range.start_date(), range.end_date());
    println!("  Lookup file: {}", config.documents.lookup_file);
    println!(
        "  Output: {}/{}",
        config.output_path(),
        config.output_filename()
    );
    println!();
    for (index, window) in RangeWalker::new(range).enumerate() {
        println!("  Window {}: {}", index + 1, window);
    }
}

fn fail(e: &AnalyticsError) -> ! {
    tracing::error!(
        "❌ Pageview report failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
