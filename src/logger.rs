//! 日志初始化
//!
//! 级别优先读取 `RUST_LOG`，没有设置时使用 `info`（详细模式下为 `debug`）。

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化全局日志（重复调用无副作用）
pub fn init() {
    init_with_level("info");
}

/// 按配置选择默认级别
pub fn init_verbose(verbose: bool) {
    init_with_level(if verbose { "debug" } else { "info" });
}

fn init_with_level(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
