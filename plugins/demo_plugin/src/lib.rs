//! Sample plugin: tracks a running peak of the incoming batches.
//!
//! Build with `cargo build --target wasm32-unknown-unknown --release`.

use pulse_plugin_sdk::{export_plugin, log, Host, Plugin, SignalBatch, SignalIndex, Status};

/// Slot holding the gain applied to the peak. Enabling fails when unset.
const GAIN: SignalIndex = SignalIndex(0);
/// Slot receiving the latest scaled peak.
const PEAK: SignalIndex = SignalIndex(7);

/// 缺少增益配置时返回的状态码
const STATUS_MISSING_GAIN: Status = Status(100);

// 原生构建不生成导出，只在测试里构造
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Default)]
struct DemoPlugin {
    gain: f64,
    batches: u64,
}

impl Plugin for DemoPlugin {
    fn enable(&mut self, host: &dyn Host) -> Result<(), Status> {
        let gain = host.get_signal(GAIN);
        if gain == 0.0 {
            log!(host, "Refusing to enable: signal {} (gain) is not set", GAIN);
            return Err(STATUS_MISSING_GAIN);
        }

        self.gain = gain;
        self.batches = 0;
        log!(host, "Enabled with gain {}", gain);
        Ok(())
    }

    fn disable(&mut self, host: &dyn Host) -> Result<(), Status> {
        log!(host, "Disabled after {} batches", self.batches);
        Ok(())
    }

    fn process_signal(&mut self, host: &dyn Host, batch: SignalBatch<'_>) -> Result<(), String> {
        if !batch.is_valid() {
            return Err(format!("invalid batch handle {}", batch.handle()));
        }

        let peak = batch
            .iter()
            .map(f64::abs)
            .fold(0.0, f64::max);
        let previous = host.set_signal(PEAK, peak * self.gain);
        self.batches += 1;

        log!(
            host,
            "Batch {} ({} samples): peak {} (was {})",
            self.batches,
            batch.len(),
            peak * self.gain,
            previous
        );
        Ok(())
    }

    fn icon(&self) -> Option<Vec<u8>> {
        Some(include_bytes!("../assets/icon.png").to_vec())
    }
}

export_plugin!(DemoPlugin);
