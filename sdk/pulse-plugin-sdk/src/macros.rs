/// Exports a [`Plugin`](crate::Plugin) type as the module's entry points.
///
/// Generates `enable`, `disable`, `process-signal`, `icon` and `dealloc`.
/// The plugin type must implement `Default + Send`; its single instance
/// lives in a [`PluginCell`](crate::PluginCell). The exports are only
/// emitted when building for `wasm32`; native builds keep the plugin type
/// usable with `testing::MemoryHost` in tests.
///
/// # 示例
/// ```ignore
/// #[derive(Default)]
/// struct MyPlugin;
///
/// impl pulse_plugin_sdk::Plugin for MyPlugin { /* ... */ }
///
/// pulse_plugin_sdk::export_plugin!(MyPlugin);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($plugin:ty) => {
        #[cfg(target_arch = "wasm32")]
        static __PULSE_PLUGIN: $crate::PluginCell<$plugin> = $crate::PluginCell::new();

        #[cfg(target_arch = "wasm32")]
        #[export_name = "enable"]
        pub extern "C" fn __pulse_enable() -> i32 {
            __PULSE_PLUGIN.enable(&$crate::wasm::WasmHost).code()
        }

        #[cfg(target_arch = "wasm32")]
        #[export_name = "disable"]
        pub extern "C" fn __pulse_disable() -> i32 {
            __PULSE_PLUGIN.disable(&$crate::wasm::WasmHost).code()
        }

        #[cfg(target_arch = "wasm32")]
        #[export_name = "process-signal"]
        pub extern "C" fn __pulse_process_signal(handle: u64) {
            __PULSE_PLUGIN.process_signal(&$crate::wasm::WasmHost, handle)
        }

        /// Ownership of the returned bytes moves to the host, which hands
        /// them back through `dealloc`.
        #[cfg(target_arch = "wasm32")]
        #[export_name = "icon"]
        pub extern "C" fn __pulse_icon() -> *const usize {
            $crate::export::return_string(__PULSE_PLUGIN.icon(&$crate::wasm::WasmHost))
        }

        /// # Safety
        ///
        /// Only the host calls this, once per buffer received from `icon`.
        #[cfg(target_arch = "wasm32")]
        #[export_name = "dealloc"]
        pub unsafe extern "C" fn __pulse_dealloc(ptr: *mut u8, len: usize) {
            $crate::export::reclaim(ptr, len)
        }
    };
}
