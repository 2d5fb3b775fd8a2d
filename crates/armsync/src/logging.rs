//! 日志初始化
//!
//! 使用 `tracing-subscriber` 输出到 stderr，过滤规则来自 `RUST_LOG`，
//! 未设置时使用调用方给出的默认指令。`log` crate 的记录经 `tracing-log`
//! 桥接到同一个 subscriber。

use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 重复调用是安全的：已存在全局 subscriber 时返回 false。
///
/// # 示例
///
/// ```rust
/// armsync::init_logging("armsync=info");
/// ```
pub fn init_logging(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // log 记录转发到 tracing；已有其他 logger 时忽略
    let _ = tracing_log::LogTracer::init();
    true
}
