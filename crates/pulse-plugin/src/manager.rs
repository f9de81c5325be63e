use anyhow::Context;
use pulse_config::HostConfig;
use pulse_core::{BatchArena, PulseError, Result, SignalRegistry};
use pulse_logging::{BufferSink, LogSink, SinkKind, TracingSink};
use pulse_types::{abi, LifecycleState, SignalValue, Status};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use wasmtime::{Instance, Memory, Store, TypedFunc};

use crate::memory;
use crate::state::HostState;
use crate::wasm_host::WasmHost;

/// Loads plugins and calls into them.
///
/// Every loaded plugin sits behind its own mutex, so at most one entry point
/// of an instance runs at a time. The signal registry and batch arena are
/// shared by all plugins.
pub struct PluginManager {
    host: WasmHost,
    registry: Arc<SignalRegistry>,
    batches: Arc<BatchArena>,
    sink: Arc<dyn LogSink>,
    /// Set when plugin logs are buffered in memory.
    log_buffer: Option<Arc<BufferSink>>,
    max_log_len: usize,
    instances: RwLock<HashMap<String, Arc<Mutex<LoadedPlugin>>>>,
}

struct LoadedPlugin {
    store: Store<HostState>,
    exports: PluginExports,
    /// Last state observed through the entry points' status codes.
    state: LifecycleState,
    /// Set once a call traps. The guest may hold its instance lock forever at
    /// that point, so nothing is called into it again.
    fault: Option<String>,
}

impl LoadedPlugin {
    fn ensure_healthy(&self, plugin_id: &str) -> Result<()> {
        match &self.fault {
            Some(reason) => Err(PulseError::Faulted {
                plugin: plugin_id.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// 调用 trap 后插件进入故障状态
    fn trapped<T>(
        &mut self,
        plugin_id: &str,
        export: &str,
        result: anyhow::Result<T>,
    ) -> Result<T> {
        result.map_err(|e| {
            let err = e.context(format!("Plugin '{}' trapped in {}", plugin_id, export));
            let reason = format!("{:#}", err);
            tracing::error!(
                plugin = plugin_id,
                export,
                "Plugin trapped, marking it faulted: {}",
                reason
            );
            self.fault = Some(reason);
            self.state = LifecycleState::Unloaded;
            PulseError::from(err)
        })
    }
}

struct PluginExports {
    memory: Memory,
    enable: TypedFunc<(), i32>,
    disable: TypedFunc<(), i32>,
    process_signal: TypedFunc<i64, ()>,
    icon: Option<TypedFunc<(), i32>>,
    dealloc: Option<TypedFunc<(i32, i32), ()>>,
}

impl PluginExports {
    fn resolve(plugin_id: &str, instance: &Instance, store: &mut Store<HostState>) -> Result<Self> {
        let missing = |export: &str| PulseError::MissingExport {
            plugin: plugin_id.to_string(),
            export: export.to_string(),
        };

        let memory = instance
            .get_memory(&mut *store, abi::EXPORT_MEMORY)
            .ok_or_else(|| missing(abi::EXPORT_MEMORY))?;
        let enable = instance
            .get_typed_func::<(), i32>(&mut *store, abi::EXPORT_ENABLE)
            .map_err(|_| missing(abi::EXPORT_ENABLE))?;
        let disable = instance
            .get_typed_func::<(), i32>(&mut *store, abi::EXPORT_DISABLE)
            .map_err(|_| missing(abi::EXPORT_DISABLE))?;
        let process_signal = instance
            .get_typed_func::<i64, ()>(&mut *store, abi::EXPORT_PROCESS_SIGNAL)
            .map_err(|_| missing(abi::EXPORT_PROCESS_SIGNAL))?;

        // 可选导出
        let icon = instance
            .get_typed_func::<(), i32>(&mut *store, abi::EXPORT_ICON)
            .ok();
        let dealloc = instance
            .get_typed_func::<(i32, i32), ()>(&mut *store, abi::EXPORT_DEALLOC)
            .ok();

        Ok(Self {
            memory,
            enable,
            disable,
            process_signal,
            icon,
            dealloc,
        })
    }
}

impl PluginManager {
    pub fn new() -> Result<Self> {
        Self::from_config(&HostConfig::default())
    }

    /// Builds a manager with the registry seeded from `config` and plugin
    /// logs routed to the configured sink.
    pub fn from_config(config: &HostConfig) -> Result<Self> {
        let (sink, log_buffer): (Arc<dyn LogSink>, Option<Arc<BufferSink>>) =
            match config.logging.sink {
                SinkKind::Tracing => (Arc::new(TracingSink), None),
                SinkKind::Buffer => {
                    let buffer = Arc::new(BufferSink::new(config.runtime.log_buffer_size));
                    (buffer.clone(), Some(buffer))
                }
            };

        Ok(Self {
            host: WasmHost::new()?,
            registry: Arc::new(SignalRegistry::with_signals(config.registry.seeds())),
            batches: Arc::new(BatchArena::new()),
            sink,
            log_buffer,
            max_log_len: config.runtime.max_log_len,
            instances: RwLock::new(HashMap::new()),
        })
    }

    /// Routes plugin log lines to `sink` for plugins loaded afterwards.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self.log_buffer = None;
        self
    }

    /// Buffered plugin logs, when `logging.sink = "buffer"`.
    pub fn log_buffer(&self) -> Option<&Arc<BufferSink>> {
        self.log_buffer.as_ref()
    }

    pub fn registry(&self) -> &Arc<SignalRegistry> {
        &self.registry
    }

    pub fn batches(&self) -> &Arc<BatchArena> {
        &self.batches
    }

    /// Compiles and instantiates a plugin. A plugin already loaded under the
    /// same id is unloaded first.
    pub fn load_plugin(&self, plugin_id: &str, wasm_bytes: &[u8]) -> Result<()> {
        let module = self.host.load_module(wasm_bytes)?;
        let linker = self.host.create_linker()?;
        let mut store = self.host.create_store(HostState::new(
            plugin_id,
            self.registry.clone(),
            self.batches.clone(),
            self.sink.clone(),
            self.max_log_len,
        ));

        let instance = linker
            .instantiate(&mut store, &module)
            .context("Failed to instantiate plugin")?;
        let exports = PluginExports::resolve(plugin_id, &instance, &mut store)?;

        let loaded = LoadedPlugin {
            store,
            exports,
            state: LifecycleState::Unloaded,
            fault: None,
        };

        if self.contains(plugin_id) {
            tracing::warn!(plugin = plugin_id, "Plugin already loaded, replacing it");
            self.unload(plugin_id)?;
        }

        let mut instances = self
            .instances
            .write()
            .map_err(|e| PulseError::LockPoisoned(e.to_string()))?;
        instances.insert(plugin_id.to_string(), Arc::new(Mutex::new(loaded)));

        tracing::info!(plugin = plugin_id, "Plugin loaded");
        Ok(())
    }

    /// Calls the plugin's `enable` and returns its status code.
    pub fn enable(&self, plugin_id: &str) -> Result<Status> {
        let entry = self.entry(plugin_id)?;
        let mut plugin = Self::lock(plugin_id, &entry)?;
        let plugin = &mut *plugin;

        plugin.ensure_healthy(plugin_id)?;

        let result = plugin.exports.enable.call(&mut plugin.store, ());
        let status = Status(plugin.trapped(plugin_id, abi::EXPORT_ENABLE, result)?);

        if status == Status::OK || status == Status::ALREADY_ENABLED {
            plugin.state = LifecycleState::Enabled;
        }

        if status.is_ok() {
            tracing::info!(plugin = plugin_id, "Plugin enabled");
        } else {
            tracing::warn!(plugin = plugin_id, %status, "Plugin enable returned nonzero status");
        }
        Ok(status)
    }

    /// Calls the plugin's `disable` and returns its status code.
    pub fn disable(&self, plugin_id: &str) -> Result<Status> {
        let entry = self.entry(plugin_id)?;
        let mut plugin = Self::lock(plugin_id, &entry)?;
        let plugin = &mut *plugin;

        plugin.ensure_healthy(plugin_id)?;

        let result = plugin.exports.disable.call(&mut plugin.store, ());
        let status = Status(plugin.trapped(plugin_id, abi::EXPORT_DISABLE, result)?);

        // 只要调用真正执行过，插件就不再处于启用状态
        if status != Status::BUSY && plugin.state == LifecycleState::Enabled {
            plugin.state = LifecycleState::Disabled;
        }

        if status.is_ok() {
            tracing::info!(plugin = plugin_id, "Plugin disabled");
        } else {
            tracing::warn!(plugin = plugin_id, %status, "Plugin disable returned nonzero status");
        }
        Ok(status)
    }

    /// Passes `handle` to the plugin unchanged.
    ///
    /// No state check happens here; the guest is expected to ignore calls
    /// made while it is not enabled.
    pub fn process_signal(&self, plugin_id: &str, handle: u64) -> Result<()> {
        let entry = self.entry(plugin_id)?;
        let mut plugin = Self::lock(plugin_id, &entry)?;
        let plugin = &mut *plugin;

        plugin.ensure_healthy(plugin_id)?;

        let result = plugin.exports.process_signal.call(&mut plugin.store, handle as i64);
        plugin.trapped(plugin_id, abi::EXPORT_PROCESS_SIGNAL, result)
    }

    /// Publishes `samples` as a batch for the duration of one
    /// `process_signal` call. The handle is retired when the call returns.
    pub fn dispatch_batch(&self, plugin_id: &str, samples: Vec<SignalValue>) -> Result<()> {
        let handle = self.batches.insert(samples);
        let result = self.process_signal(plugin_id, handle.raw());
        self.batches.remove(handle);
        result
    }

    /// Dispatches one batch to every enabled plugin. Returns how many plugins
    /// processed it; failures are logged and skipped.
    pub fn process_all(&self, samples: &[SignalValue]) -> usize {
        let mut processed = 0;

        for plugin_id in self.plugin_ids() {
            match self.state(&plugin_id) {
                Ok(LifecycleState::Enabled) => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(plugin = %plugin_id, "Failed to read plugin state: {}", e);
                    continue;
                }
            }

            match self.dispatch_batch(&plugin_id, samples.to_vec()) {
                Ok(()) => processed += 1,
                Err(e) => tracing::error!(plugin = %plugin_id, "Signal processing failed: {}", e),
            }
        }

        processed
    }

    /// Fetches the plugin icon. The bytes are copied out and the guest buffer
    /// is handed back through `dealloc` exactly once.
    pub fn icon(&self, plugin_id: &str) -> Result<Option<Vec<u8>>> {
        let entry = self.entry(plugin_id)?;
        let mut plugin = Self::lock(plugin_id, &entry)?;
        let plugin = &mut *plugin;

        plugin.ensure_healthy(plugin_id)?;

        let Some(icon) = plugin.exports.icon.as_ref() else {
            return Ok(None);
        };

        let result = icon.call(&mut plugin.store, ());
        let area = plugin.trapped(plugin_id, abi::EXPORT_ICON, result)?;

        let (ptr, len, bytes) = {
            let data = plugin.exports.memory.data(&plugin.store);
            let (ptr, len) = memory::read_return_area(data, area as u32)
                .map_err(|e| PulseError::Memory(e.to_string()))?;
            if ptr == 0 && len == 0 {
                return Ok(None);
            }
            let bytes = memory::read_bytes(data, ptr, len)
                .map_err(|e| PulseError::Memory(e.to_string()))?
                .to_vec();
            (ptr, len, bytes)
        };

        match plugin.exports.dealloc.as_ref() {
            Some(dealloc) => {
                let result = dealloc.call(&mut plugin.store, (ptr as i32, len as i32));
                plugin.trapped(plugin_id, abi::EXPORT_DEALLOC, result)?;
            }
            None => tracing::warn!(
                plugin = plugin_id,
                "Plugin exports icon without dealloc, guest buffer is leaked"
            ),
        }

        Ok(Some(bytes))
    }

    /// Removes a plugin, disabling it first when it is enabled.
    pub fn unload(&self, plugin_id: &str) -> Result<()> {
        if self.state(plugin_id)? == LifecycleState::Enabled {
            match self.disable(plugin_id) {
                Ok(status) if !status.is_ok() => {
                    tracing::warn!(
                        plugin = plugin_id,
                        %status,
                        "Disable during unload reported failure"
                    )
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(plugin = plugin_id, "Disable during unload failed: {}", e)
                }
            }
        }

        let mut instances = self
            .instances
            .write()
            .map_err(|e| PulseError::LockPoisoned(e.to_string()))?;
        instances.remove(plugin_id);

        tracing::info!(plugin = plugin_id, "Plugin unloaded");
        Ok(())
    }

    /// Host-side view of a plugin's lifecycle state.
    pub fn state(&self, plugin_id: &str) -> Result<LifecycleState> {
        let entry = self.entry(plugin_id)?;
        let plugin = Self::lock(plugin_id, &entry)?;
        Ok(plugin.state)
    }

    pub fn contains(&self, plugin_id: &str) -> bool {
        match self.instances.read() {
            Ok(instances) => instances.contains_key(plugin_id),
            Err(e) => {
                tracing::error!("Failed to acquire read lock in contains: {}", e);
                false
            }
        }
    }

    pub fn plugin_ids(&self) -> Vec<String> {
        match self.instances.read() {
            Ok(instances) => {
                let mut ids: Vec<String> = instances.keys().cloned().collect();
                ids.sort();
                ids
            }
            Err(e) => {
                tracing::error!("Failed to acquire read lock in plugin_ids: {}", e);
                Vec::new()
            }
        }
    }

    fn entry(&self, plugin_id: &str) -> Result<Arc<Mutex<LoadedPlugin>>> {
        let instances = self
            .instances
            .read()
            .map_err(|e| PulseError::LockPoisoned(e.to_string()))?;
        instances
            .get(plugin_id)
            .cloned()
            .ok_or_else(|| PulseError::PluginNotFound(plugin_id.to_string()))
    }

    fn lock<'a>(
        plugin_id: &str,
        entry: &'a Arc<Mutex<LoadedPlugin>>,
    ) -> Result<MutexGuard<'a, LoadedPlugin>> {
        entry
            .lock()
            .map_err(|_| PulseError::LockPoisoned(format!("plugin '{}'", plugin_id)))
    }
}
