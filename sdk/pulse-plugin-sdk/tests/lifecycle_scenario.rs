use pulse_plugin_sdk::testing::MemoryHost;
use pulse_plugin_sdk::{
    Host, LifecycleState, Plugin, PluginCell, SignalBatch, SignalIndex, Status, SIGNAL_SENTINEL,
};

/// 测试插件：每次处理信号时把 7 号槽位写为 3.5，并累加批次数据到 8 号槽位
#[derive(Default)]
struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn enable(&mut self, host: &dyn Host) -> Result<(), Status> {
        pulse_plugin_sdk::log!(host, "Enabled!");
        Ok(())
    }

    fn disable(&mut self, host: &dyn Host) -> Result<(), Status> {
        pulse_plugin_sdk::log!(host, "Disabled");
        Ok(())
    }

    fn process_signal(&mut self, host: &dyn Host, batch: SignalBatch<'_>) -> Result<(), String> {
        host.set_signal(SignalIndex(7), 3.5);
        if batch.is_valid() {
            host.set_signal(SignalIndex(8), batch.iter().sum());
        }
        Ok(())
    }
}

// 原生目标上宏展开为空，插件类型仍可直接测试
pulse_plugin_sdk::export_plugin!(ScenarioPlugin);

#[test]
fn test_enable_process_disable_scenario() {
    let host = MemoryHost::new();
    let cell: PluginCell<ScenarioPlugin> = PluginCell::new();

    // 1. 启用
    assert_eq!(cell.enable(&host), Status::OK);
    assert_eq!(host.get_signal(SignalIndex(7)), SIGNAL_SENTINEL);

    // 2. 处理信号，42 不是有效批次句柄，但插件仍然运行
    cell.process_signal(&host, 42);
    assert_eq!(host.get_signal(SignalIndex(7)), 3.5);
    assert_eq!(host.get_signal(SignalIndex(8)), SIGNAL_SENTINEL);
    let writes = host.signal_writes();

    // 3. 禁用
    assert_eq!(cell.disable(&host), Status::OK);
    assert_eq!(cell.state(), Some(LifecycleState::Disabled));

    // 4. 禁用后处理信号是空操作
    cell.process_signal(&host, 42);
    assert_eq!(host.signal_writes(), writes);

    assert_eq!(host.logs()[0], "Enabled!");
    assert_eq!(host.logs()[1], "Disabled");
}

#[test]
fn test_process_valid_batch() {
    let host = MemoryHost::new();
    let cell: PluginCell<ScenarioPlugin> = PluginCell::new();
    cell.enable(&host);

    let handle = host.insert_batch(vec![32.0, 24.0, 16.0]);
    cell.process_signal(&host, handle.raw());
    assert_eq!(host.get_signal(SignalIndex(8)), 72.0);

    // 宿主回收批次后，旧句柄不可再用
    host.remove_batch(handle);
    host.set_signal(SignalIndex(8), 0.0);
    cell.process_signal(&host, handle.raw());
    assert_eq!(host.get_signal(SignalIndex(8)), 0.0);
}

#[test]
fn test_swap_returns_previous_value() {
    let host = MemoryHost::new();
    let idx = SignalIndex(5);

    host.set_signal(idx, 1.0);
    assert_eq!(host.set_signal(idx, 2.0), 1.0);
    assert_eq!(host.get_signal(idx), 2.0);
}
