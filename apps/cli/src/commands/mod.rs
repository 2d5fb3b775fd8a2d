//! 命令定义和实现

pub mod check;
pub mod map;
pub mod run;

pub use check::CheckCommand;
pub use map::MapCommand;
pub use run::RunCommand;

use anyhow::{Context, Result};
use armsync::EngineConfig;
use std::path::Path;

/// 加载配置（未指定路径时使用默认配置）
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// 解析逗号分隔的数值列表
pub fn parse_values(input: &str) -> Result<Vec<f64>> {
    input
        .split(',')
        .map(|s| {
            let s = s.trim();
            s.parse::<f64>()
                .with_context(|| format!("Invalid number: '{}'", s))
        })
        .collect()
}
