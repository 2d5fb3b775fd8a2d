//! Loop Runner - 定频 tick 线程
//!
//! 把 [`Engine`] 移入专用线程，按固定频率调用 `tick()`。
//!
//! # 核心功能
//!
//! - **精确定时**: 使用 `spin_sleep` 实现低抖动延时
//! - **超时检测**: tick 超出周期时记录警告并计数，随后以当前时刻重新对齐，
//!   不会连续补跑错过的 tick
//! - **可取消**: [`RunnerHandle::stop`] 清除运行标志并等待线程退出，
//!   返回引擎以便继续使用
//!
//! # 示例
//!
//! ```rust,no_run
//! use armsync_control::{Engine, EngineConfig, LoopConfig, spawn_loop};
//! use armsync_driver::SimActuators;
//!
//! let config = EngineConfig::default();
//! let engine = Engine::new(&config, SimActuators::new(["joint1"])).unwrap();
//! let handle = engine.handle();
//!
//! let runner = spawn_loop(engine, LoopConfig::from_rate(config.control.update_rate_hz)).unwrap();
//! handle.set_gripper(1.0).unwrap();
//! // ...
//! let engine = runner.stop();
//! ```

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::status::EngineStatus;
use armsync_driver::ActuatorBackend;
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

/// 控制循环配置
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// tick 频率（Hz）
    pub frequency_hz: f64,

    /// 最大迭代次数（None 表示运行到被停止）
    ///
    /// 用于测试或定时运行。
    pub max_iterations: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 100.0,
            max_iterations: None,
        }
    }
}

impl LoopConfig {
    pub fn from_rate(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }
}

/// 循环统计（线程间共享）
#[derive(Debug, Default)]
struct LoopStats {
    iterations: AtomicU64,
    overruns: AtomicU64,
}

/// tick 线程句柄
///
/// Drop 时自动停止并等待线程结束。
pub struct RunnerHandle<B: ActuatorBackend + 'static> {
    thread: Option<thread::JoinHandle<Engine<B>>>,
    is_running: Arc<AtomicBool>,
    stats: Arc<LoopStats>,
}

/// 在专用线程中启动定频循环
///
/// # 错误
///
/// - 频率不是正的有限值
/// - 引擎不处于 `Initialized` 状态（已经被循环驱动过）
/// - 线程创建失败
pub fn spawn_loop<B>(engine: Engine<B>, config: LoopConfig) -> Result<RunnerHandle<B>>
where
    B: ActuatorBackend + 'static,
{
    if !config.frequency_hz.is_finite() || config.frequency_hz <= 0.0 {
        return Err(EngineError::InvalidValue {
            field: "frequency_hz",
            value: config.frequency_hz,
        });
    }
    if config.frequency_hz > 10000.0 {
        warn!(
            "Very high tick frequency: {} Hz. This may cause performance issues.",
            config.frequency_hz
        );
    }
    if !engine
        .status_cell()
        .transition(EngineStatus::Initialized, EngineStatus::Running)
    {
        return Err(EngineError::InvalidState {
            expected: EngineStatus::Initialized,
            actual: engine.status(),
        });
    }

    let is_running = Arc::new(AtomicBool::new(true));
    let stats = Arc::new(LoopStats::default());

    let thread = {
        let is_running = is_running.clone();
        let stats = stats.clone();
        thread::Builder::new()
            .name("armsync-tick".into())
            .spawn(move || tick_loop(engine, config, is_running, stats))
    };

    match thread {
        Ok(thread) => Ok(RunnerHandle {
            thread: Some(thread),
            is_running,
            stats,
        }),
        Err(source) => Err(EngineError::Spawn {
            name: "tick",
            source,
        }),
    }
}

fn tick_loop<B: ActuatorBackend>(
    mut engine: Engine<B>,
    config: LoopConfig,
    is_running: Arc<AtomicBool>,
    stats: Arc<LoopStats>,
) -> Engine<B> {
    #[cfg(feature = "realtime")]
    {
        use thread_priority::*;

        match set_current_thread_priority(ThreadPriority::Max) {
            Ok(_) => {
                info!("Tick thread priority set to MAX (realtime)");
            },
            Err(e) => {
                warn!(
                    "Failed to set tick thread priority: {}. \
                    On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
                    e
                );
            },
        }
    }

    let period = Duration::from_secs_f64(1.0 / config.frequency_hz);
    let sleeper = SpinSleeper::default();
    info!("Tick loop started at {} Hz", config.frequency_hz);

    let mut deadline = Instant::now();
    let mut iteration: u64 = 0;

    loop {
        // Acquire: 看到 false 时也能看到停止方之前的写入
        if !is_running.load(Ordering::Acquire) {
            trace!("Tick loop: is_running flag is false, exiting");
            break;
        }
        if let Some(max) = config.max_iterations
            && iteration >= max
        {
            break;
        }

        engine.tick();
        iteration += 1;
        stats.iterations.store(iteration, Ordering::Relaxed);

        deadline += period;
        let now = Instant::now();
        if now > deadline {
            let late = now - deadline;
            stats.overruns.fetch_add(1, Ordering::Relaxed);
            warn!(
                "Tick {} overran its period by {:?} (period {:?})",
                engine.seq(),
                late,
                period
            );
            deadline = now;
        } else {
            sleeper.sleep(deadline - now);
        }
    }

    is_running.store(false, Ordering::Release);
    engine.status_cell().set(EngineStatus::Stopped);
    info!(
        "Tick loop stopped after {} iterations ({} overruns)",
        iteration,
        stats.overruns.load(Ordering::Relaxed)
    );
    engine
}

impl<B: ActuatorBackend + 'static> RunnerHandle<B> {
    /// 循环是否仍在运行
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// 已完成的 tick 数
    pub fn iterations(&self) -> u64 {
        self.stats.iterations.load(Ordering::Relaxed)
    }

    /// 超时 tick 数
    pub fn overruns(&self) -> u64 {
        self.stats.overruns.load(Ordering::Relaxed)
    }

    /// 停止循环并取回引擎
    ///
    /// 线程 panic 时返回 `None`。
    pub fn stop(mut self) -> Option<Engine<B>> {
        self.is_running.store(false, Ordering::Release);
        self.thread.take().and_then(|t| t.join().ok())
    }

    /// 等待循环自然结束（需要设置 `max_iterations`）
    pub fn join(mut self) -> Option<Engine<B>> {
        self.thread.take().and_then(|t| t.join().ok())
    }
}

impl<B: ActuatorBackend + 'static> Drop for RunnerHandle<B> {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
