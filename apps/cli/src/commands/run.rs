//! 运行命令
//!
//! 启动定频 tick 线程和遥测线程：
//! - stdin：每行一条 JSON 入站消息（`{"type":"command",...}` 或 `{"type":"trajectory",...}`）
//! - stdout：每行一条 JSON 遥测
//!
//! Ctrl-C 或 stdin 结束（再等待 `--drain-ms`）时退出。

use super::load_config;
use anyhow::{Context, Result};
use armsync::control::{DEFAULT_TELEMETRY_CAPACITY, EngineConfig};
use armsync::prelude::*;
use clap::Args;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 配置文件路径（缺省使用默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 仿真执行器名称（逗号分隔，缺省按通道名与别名生成）
    #[arg(short, long, value_delimiter = ',')]
    pub actuators: Vec<String>,

    /// stdin 结束后继续运行的时间（毫秒）
    #[arg(long, default_value_t = 200)]
    pub drain_ms: u64,

    /// 最大 tick 数（缺省不限）
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;

        let names = if self.actuators.is_empty() {
            actuator_names(&config)
        } else {
            self.actuators.clone()
        };
        let engine = Engine::new(&config, SimActuators::new(names))?;
        let handle = engine.handle();

        let running = Arc::new(AtomicBool::new(true));
        {
            let running = running.clone();
            ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
                .context("Failed to set Ctrl-C handler")?;
        }

        let mut loop_config = LoopConfig::from_rate(config.control.update_rate_hz);
        loop_config.max_iterations = self.max_ticks;
        let runner = spawn_loop(engine, loop_config)?;
        let (publisher, telemetry) = TelemetryPublisher::spawn(
            handle.clone(),
            config.control.telemetry_rate_hz,
            DEFAULT_TELEMETRY_CAPACITY,
        )?;

        let input_done = Arc::new(AtomicBool::new(false));
        {
            let handle = handle.clone();
            let input_done = input_done.clone();
            thread::Builder::new()
                .name("armsync-stdin".into())
                .spawn(move || {
                    read_commands(std::io::stdin().lock(), &handle);
                    input_done.store(true, Ordering::Release);
                })
                .context("Failed to spawn stdin reader")?;
        }

        info!("Running, reading commands from stdin (Ctrl-C to stop)");
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let mut drain_deadline: Option<Instant> = None;

        while running.load(Ordering::SeqCst) && runner.is_running() {
            if input_done.load(Ordering::Acquire) {
                let deadline = *drain_deadline
                    .get_or_insert_with(|| Instant::now() + Duration::from_millis(self.drain_ms));
                if Instant::now() >= deadline {
                    break;
                }
            }

            match telemetry.recv_timeout(Duration::from_millis(50)) {
                Ok(t) => {
                    writeln!(out, "{}", serde_json::to_string(&t)?)?;
                },
                Err(e) if e.is_timeout() => continue,
                Err(_) => break,
            }
        }
        out.flush()?;

        publisher.stop();
        if let Some(engine) = runner.stop() {
            info!("Stopped after {} ticks", engine.seq());
        }
        Ok(())
    }
}

/// 仿真执行器名称：每个通道的物理名（别名优先），去重并保持通道顺序
fn actuator_names(config: &EngineConfig) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for channel in &config.table.channels {
        let name = config.aliases.get(channel).unwrap_or(channel);
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

/// 逐行读取 JSON 入站消息并提交
///
/// 无法解析或被拒绝的行只记录警告，不影响后续行。返回成功提交的条数。
fn read_commands<R: BufRead>(reader: R, handle: &EngineHandle) -> usize {
    let mut accepted = 0;
    for (number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            },
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Inbound>(line) {
            Ok(message) => {
                if handle.submit_inbound(&message).is_ok() {
                    accepted += 1;
                }
            },
            Err(e) => warn!("Ignoring malformed line {}: {}", number + 1, e),
        }
    }
    accepted
}
