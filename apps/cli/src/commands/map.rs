//! 一次性映射命令
//!
//! 正向：外部 7 → 内部 8，再逆向回外部 7（用于检查映射表）。
//! 逆向（`--inverse`）：内部 8 → 外部 7。

use super::{load_config, parse_values};
use anyhow::{Context, Result};
use armsync::control::Mapper;
use armsync::protocol::{EXTERNAL_CHANNELS, INTERNAL_CHANNELS, JointCommand, finite_array};
use clap::Args;
use std::path::PathBuf;

/// 映射命令参数
#[derive(Args, Debug)]
pub struct MapCommand {
    /// 逗号分隔的数值（正向 7 个，逆向 8 个）
    #[arg(allow_hyphen_values = true)]
    pub values: String,

    /// 配置文件路径（缺省使用默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 逆向映射（输入为内部 8 通道位置）
    #[arg(short, long)]
    pub inverse: bool,
}

impl MapCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let mapper = Mapper::new(
            config.build_table()?,
            config.control.gripper_policy,
            config.gripper,
        );
        let values = parse_values(&self.values)?;

        if self.inverse {
            let internal = finite_array::<INTERNAL_CHANNELS>("positions", &values)
                .context("Inverse mapping expects 8 internal positions")?;
            let result = mapper.inverse(&internal, &[0.0; INTERNAL_CHANNELS]);
            println!("external: {}", format_values(&result.positions));
            report_invalid(result.valid_mask);
            return Ok(());
        }

        let command = JointCommand::positions(values)
            .validate()
            .with_context(|| format!("Forward mapping expects {} finite values", EXTERNAL_CHANNELS))?;
        let target = mapper.forward(&command);
        let back = mapper.inverse(&target.position, &target.velocity);

        println!("internal: {}", format_values(&target.position));
        println!("gripper:  {:.6} (normalized)", target.gripper);
        println!("inverse:  {}", format_values(&back.positions));
        report_invalid(back.valid_mask);
        Ok(())
    }
}

fn report_invalid(valid_mask: u8) {
    let invalid: Vec<usize> = (0..EXTERNAL_CHANNELS)
        .filter(|i| valid_mask & (1 << i) == 0)
        .collect();
    if !invalid.is_empty() {
        println!("⚠️  not invertible (reported as 0): {:?}", invalid);
    }
}

fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(", ")
}
