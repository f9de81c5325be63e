use pulse_config::ConfigLoader;
use pulse_logging::init_logging;
use pulse_plugin::PluginManager;
use pulse_types::SignalIndex;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(wasm_path) = args.next() else {
        eprintln!("usage: host_demo <plugin.wasm> [config-dir]");
        std::process::exit(2);
    };
    let config_dir = args.next().unwrap_or_else(|| ".".to_string());

    let config = ConfigLoader::new(&config_dir).load_validated()?;
    init_logging(&config.logging)?;

    let manager = PluginManager::from_config(&config)?;
    let wasm_bytes = std::fs::read(&wasm_path)?;
    manager.load_plugin("demo", &wasm_bytes)?;

    if let Some(icon) = manager.icon("demo")? {
        tracing::info!("Plugin icon: {} bytes", icon.len());
    }

    let status = manager.enable("demo")?;
    tracing::info!(%status, "enable returned");

    for tick in 0..3 {
        let samples = vec![32.0, 24.0, 16.0, tick as f64];
        let processed = manager.process_all(&samples);
        tracing::info!(tick, processed, "Signal tick dispatched");
    }

    for (idx, value) in manager.registry().snapshot() {
        tracing::info!("signal {} = {}", idx, value);
    }
    tracing::info!("signal 0 = {}", manager.registry().get(SignalIndex(0)));

    let status = manager.disable("demo")?;
    tracing::info!(%status, "disable returned");
    manager.unload("demo")?;

    // logging.sink = "buffer" 时插件日志留在内存里
    if let Some(buffer) = manager.log_buffer() {
        for entry in buffer.drain() {
            println!("{}", entry.to_json()?);
        }
    }
    Ok(())
}
