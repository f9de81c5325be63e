//! 插件日志宏
//!
//! The host exposes a single `log` import; the macro formats on the guest
//! side and lends the buffer to the host for the duration of the call.

/// Formats a message and sends it to the host logger.
///
/// # 示例
/// ```ignore
/// log!(host, "Process Signal at {} is: {}", handle, value);
/// ```
#[macro_export]
macro_rules! log {
    ($host:expr, $($arg:tt)*) => {{
        let msg = ::std::format!($($arg)*);
        $crate::Host::log_str($host, &msg);
    }};
}

#[cfg(test)]
mod tests {
    use crate::testing::MemoryHost;
    use crate::Host;

    #[test]
    fn test_log_macro() {
        let host = MemoryHost::new();
        let value = 3.5;
        crate::log!(&host, "signal is {}", value);

        let dyn_host: &dyn Host = &host;
        crate::log!(dyn_host, "from dyn");

        assert_eq!(host.logs(), vec!["signal is 3.5", "from dyn"]);
    }
}
