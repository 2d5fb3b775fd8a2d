//! 遥测发布线程
//!
//! 按独立频率读取最新状态快照，经逆映射转换为 [`Telemetry`] 后推入有界通道。
//! 通道满时丢弃本条（`try_send`），不阻塞；接收端全部断开时线程退出。

use crate::engine::EngineHandle;
use crate::error::{EngineError, Result};
use armsync_protocol::Telemetry;
use crossbeam_channel::{Receiver, TrySendError, bounded};
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// 默认通道容量
pub const DEFAULT_TELEMETRY_CAPACITY: usize = 64;

/// 发布统计
#[derive(Debug, Default)]
struct PublisherStats {
    published: AtomicU64,
    dropped: AtomicU64,
}

/// 遥测发布线程句柄
///
/// Drop 时自动停止并等待线程结束。
pub struct TelemetryPublisher {
    thread: Option<thread::JoinHandle<()>>,
    is_running: Arc<AtomicBool>,
    stats: Arc<PublisherStats>,
}

impl TelemetryPublisher {
    /// 启动发布线程
    ///
    /// 返回句柄和遥测接收端。
    pub fn spawn(
        handle: EngineHandle,
        rate_hz: f64,
        capacity: usize,
    ) -> Result<(Self, Receiver<Telemetry>)> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(EngineError::InvalidValue {
                field: "telemetry_rate_hz",
                value: rate_hz,
            });
        }

        let (tx, rx) = bounded(capacity.max(1));
        let is_running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(PublisherStats::default());
        let period = Duration::from_secs_f64(1.0 / rate_hz);

        let thread = {
            let is_running = is_running.clone();
            let stats = stats.clone();
            thread::Builder::new()
                .name("armsync-telemetry".into())
                .spawn(move || {
                    let sleeper = SpinSleeper::default();
                    let mut deadline = Instant::now();
                    info!("Telemetry publisher started at {} Hz", rate_hz);

                    while is_running.load(Ordering::Acquire) {
                        let telemetry = handle.telemetry();
                        match tx.try_send(telemetry) {
                            Ok(()) => {
                                stats.published.fetch_add(1, Ordering::Relaxed);
                            },
                            Err(TrySendError::Full(_)) => {
                                stats.dropped.fetch_add(1, Ordering::Relaxed);
                                trace!("Telemetry channel full, dropping seq {}", telemetry.seq);
                            },
                            Err(TrySendError::Disconnected(_)) => {
                                debug!("Telemetry receiver dropped, stopping publisher");
                                break;
                            },
                        }

                        deadline += period;
                        let now = Instant::now();
                        if now < deadline {
                            sleeper.sleep(deadline - now);
                        } else {
                            deadline = now;
                        }
                    }

                    is_running.store(false, Ordering::Release);
                    info!(
                        "Telemetry publisher stopped ({} published, {} dropped)",
                        stats.published.load(Ordering::Relaxed),
                        stats.dropped.load(Ordering::Relaxed)
                    );
                })
        };

        match thread {
            Ok(thread) => Ok((
                Self {
                    thread: Some(thread),
                    is_running,
                    stats,
                },
                rx,
            )),
            Err(source) => Err(EngineError::Spawn {
                name: "telemetry",
                source,
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// 成功推送的条数
    pub fn published(&self) -> u64 {
        self.stats.published.load(Ordering::Relaxed)
    }

    /// 因通道满而丢弃的条数
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// 停止发布并等待线程退出
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.is_running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for TelemetryPublisher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
