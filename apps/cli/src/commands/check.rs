//! 配置校验命令
//!
//! 校验配置文件并打印映射表；可选地针对一组执行器名称检查名称解析。

use super::load_config;
use anyhow::Result;
use armsync::driver::{ActuatorDriver, SimActuators};
use armsync::protocol::ChannelTable;
use clap::Args;
use std::path::PathBuf;

/// 配置校验命令参数
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// 配置文件路径（缺省使用默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 逗号分隔的执行器名称，用于检查名称解析
    #[arg(short, long, value_delimiter = ',')]
    pub actuators: Vec<String>,
}

impl CheckCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let table = config.build_table()?;
        let control = &config.control;

        println!("✅ Configuration is valid");
        println!(
            "   rate {} Hz, smoothing {}, telemetry {} Hz",
            control.update_rate_hz, control.smoothing_factor, control.telemetry_rate_hz
        );
        println!(
            "   gripper {:?} [{} → {}], sync {} (tolerance {}), feedback {:?}",
            control.gripper_policy,
            config.gripper.open,
            config.gripper.closed,
            control.gripper_sync,
            control.gripper_tolerance,
            control.feedback
        );
        println!();
        print_table(&table, &config.aliases);

        if !self.actuators.is_empty() {
            println!();
            let driver = ActuatorDriver::new(
                SimActuators::new(self.actuators.iter().cloned()),
                &table,
                &config.aliases,
                control.feedback,
            );
            let unresolved = driver.unresolved_channels();
            if unresolved.is_empty() {
                println!("✅ All 8 channels resolve to actuators");
            } else {
                for channel in &unresolved {
                    println!(
                        "⚠️  Channel {} ({}) has no actuator named '{}'",
                        channel,
                        table.name(*channel).unwrap_or("?"),
                        driver.physical_name(*channel).unwrap_or("?")
                    );
                }
                anyhow::bail!("{} channel(s) unresolved", unresolved.len());
            }
        }

        Ok(())
    }
}

fn print_table(table: &ChannelTable, aliases: &std::collections::HashMap<String, String>) {
    println!(
        "{:>3}  {:<16} {:<14} {:>4} {:>8} {:>8} {:>7}  actuator",
        "idx", "name", "role", "ext", "scale", "offset", "invert"
    );
    for channel in table.channels() {
        let Some(rule) = table.rules().find(|r| r.internal == channel.index) else {
            continue;
        };
        let invert = match (rule.invert, table.apply_invert()) {
            (true, true) => "yes",
            (true, false) => "ignored",
            (false, _) => "no",
        };
        let actuator = aliases.get(&channel.name).unwrap_or(&channel.name);
        println!(
            "{:>3}  {:<16} {:<14} {:>4} {:>8} {:>8} {:>7}  {}",
            channel.index,
            channel.name,
            format!("{:?}", channel.role),
            rule.external,
            rule.scale,
            rule.offset,
            invert,
            actuator
        );
    }
}
