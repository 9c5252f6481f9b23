use clap::Parser;
use shipcheck::output::console::render_check_report;
use shipcheck::utils::{logger, validation::Validate};
use shipcheck::{CheckEngine, CheckError, CliConfig, LocalStorage, ShipmentCheckPipeline, ShipmentSources};

fn run(mut config: CliConfig) -> shipcheck::Result<()> {
    let profile = config.load_profile()?;
    config.apply_profile_defaults(&profile);

    profile.validate()?;
    config.validate()?;
    tracing::debug!("CLI config: {:?}", config);

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let sources = ShipmentSources {
        report: config.report.clone(),
        import_doc: config.import_doc.clone(),
        report_sheet: config.report_sheet.clone(),
        import_sheet: config.import_sheet.clone(),
    };
    let storage = LocalStorage::for_config(&config);
    let monitor_enabled = config.monitor;
    let pipeline = ShipmentCheckPipeline::new(storage, config, profile, sources);

    let mut engine = CheckEngine::new_with_monitoring(pipeline, monitor_enabled);
    let outcome = engine.run()?;

    println!("{}", render_check_report(&outcome.output));
    for location in &outcome.written {
        println!("📁 {}", location);
    }
    Ok(())
}

fn report_failure(e: &CheckError) {
    tracing::error!(
        "❌ Shipment check failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

fn main() {
    let config = CliConfig::parse();
    logger::init_cli_logger(config.verbose, config.log_json);

    tracing::info!("Starting shipcheck");

    if let Err(e) = run(config) {
        report_failure(&e);
        std::process::exit(e.exit_code());
    }
}
