use anyhow::{Context, Result};
use pulse_types::abi;
use pulse_types::{BatchHandle, SignalIndex, SIGNAL_SENTINEL};
use wasmtime::{Caller, Config, Engine, Extern, Linker, Module, Store};

use crate::memory;
use crate::state::HostState;

pub struct WasmHost {
    engine: Engine,
}

impl WasmHost {
    pub fn new() -> Result<Self> {
        let mut config = Config::new();

        // Safety: Optimization level
        config.cranelift_opt_level(wasmtime::OptLevel::Speed);

        let engine = Engine::new(&config)?;
        Ok(Self { engine })
    }

    pub fn load_module(&self, wasm_bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, wasm_bytes).context("Failed to compile plugin module")
    }

    /// prepare a fresh store for a new instance
    pub fn create_store(&self, state: HostState) -> Store<HostState> {
        Store::new(&self.engine, state)
    }

    /// Linker with every host import registered.
    pub fn create_linker(&self) -> Result<Linker<HostState>> {
        let mut linker = Linker::new(&self.engine);

        Self::register_logger(&mut linker)?;
        Self::register_registry(&mut linker)?;

        Ok(linker)
    }

    fn register_logger(linker: &mut Linker<HostState>) -> Result<()> {
        linker
            .func_wrap(
                abi::LOGGER_MODULE,
                abi::IMPORT_LOG,
                |mut caller: Caller<'_, HostState>, ptr: i32, len: i32| {
                    Self::handle_log(&mut caller, ptr, len);
                },
            )
            .with_context(|| format!("Failed to register {}", abi::IMPORT_LOG))?;
        Ok(())
    }

    fn register_registry(linker: &mut Linker<HostState>) -> Result<()> {
        linker.func_wrap(
            abi::REGISTRY_MODULE,
            abi::IMPORT_GET_SIGNAL,
            |caller: Caller<'_, HostState>, idx: i64| -> f64 {
                caller.data().registry.get(SignalIndex(idx as u64))
            },
        )?;

        linker.func_wrap(
            abi::REGISTRY_MODULE,
            abi::IMPORT_SET_SIGNAL,
            |caller: Caller<'_, HostState>, idx: i64, val: f64| -> f64 {
                caller.data().registry.set(SignalIndex(idx as u64), val)
            },
        )?;

        linker.func_wrap(
            abi::REGISTRY_MODULE,
            abi::IMPORT_BATCH_LEN,
            |caller: Caller<'_, HostState>, handle: i64| -> i64 {
                match caller.data().batches.len_of(BatchHandle(handle as u64)) {
                    Some(len) => i64::try_from(len).unwrap_or(abi::INVALID_BATCH_LEN),
                    None => {
                        tracing::debug!(
                            plugin = %caller.data().plugin_id,
                            "batch-len on invalid handle {:#x}",
                            handle
                        );
                        abi::INVALID_BATCH_LEN
                    }
                }
            },
        )?;

        linker.func_wrap(
            abi::REGISTRY_MODULE,
            abi::IMPORT_BATCH_READ,
            |caller: Caller<'_, HostState>, handle: i64, offset: i64| -> f64 {
                let Ok(offset) = usize::try_from(offset) else {
                    return SIGNAL_SENTINEL;
                };
                caller
                    .data()
                    .batches
                    .read(BatchHandle(handle as u64), offset)
                    .unwrap_or(SIGNAL_SENTINEL)
            },
        )?;

        Ok(())
    }

    /// 处理来自 Wasm 插件的日志调用
    ///
    /// The guest lends `(ptr, len)` for the duration of this call only: the
    /// bytes are copied out and the range is never stored or freed here.
    fn handle_log(caller: &mut Caller<'_, HostState>, ptr: i32, len: i32) {
        // 1. 获取 Wasm 线性内存
        let memory = match caller.get_export(abi::EXPORT_MEMORY) {
            Some(Extern::Memory(mem)) => mem,
            _ => {
                tracing::error!("Wasm plugin: failed to get memory export");
                return;
            }
        };

        if len <= 0 {
            return;
        }

        // 2. 读取内存中的字符串，同时限制长度
        let max_len = caller.data().max_log_len;
        let decoded = {
            let data = memory.data(&*caller);
            memory::read_bytes(data, ptr as u32, len as u32)
                .and_then(|bytes| memory::decode_log_text(bytes, max_len))
        };

        // 3. 输出到日志 sink
        match decoded {
            Ok((message, truncated)) => caller.data().record_log(message, truncated),
            Err(e) => {
                tracing::warn!(plugin = %caller.data().plugin_id, "Dropped plugin log: {}", e);
            }
        }
    }
}
