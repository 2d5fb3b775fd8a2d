//! 引擎配置
//!
//! 配置在启动时从 TOML 读取一次，之后不可变。所有校验都在
//! [`EngineConfig::validate`] 中完成，失败即为致命错误。
//!
//! # 示例
//!
//! ```toml
//! [control]
//! update_rate_hz = 100.0
//! smoothing_factor = 0.2
//! gripper_policy = "continuous"
//! feedback = "echo"
//!
//! [gripper]
//! open = 0.0
//! closed = 0.04
//!
//! [aliases]
//! gripper_right = "gripper_left"
//! ```

use crate::error::ConfigError;
use armsync_driver::FeedbackSource;
use armsync_protocol::{
    ChannelTable, EXTERNAL_CHANNELS, MappingRule, default_channel_names, finite_array,
    identity_rules,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 夹爪策略
///
/// 两种策略互斥，由配置显式选择。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GripperPolicy {
    /// 连续：外部值经规则变换后钳位到 [0, 1]，再线性映射到手指物理范围
    #[default]
    Continuous,
    /// 二值化：外部值 < 0 为张开，>= 0 为闭合
    Binarized,
}

/// 控制参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// tick 频率（Hz）
    pub update_rate_hz: f64,
    /// 平滑系数，取值 (0, 1]，1 表示一个 tick 内到达目标
    pub smoothing_factor: f64,
    /// 两根手指允许的最大位置差
    pub gripper_tolerance: f64,
    /// 是否启用手指同步
    pub gripper_sync: bool,
    pub gripper_policy: GripperPolicy,
    pub feedback: FeedbackSource,
    /// 遥测发布频率（Hz），与 tick 频率无关
    pub telemetry_rate_hz: f64,
    /// 初始位姿（外部通道顺序，7 个值）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_pose: Option<Vec<f64>>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 100.0,
            smoothing_factor: 0.2,
            gripper_tolerance: 0.001,
            gripper_sync: true,
            gripper_policy: GripperPolicy::Continuous,
            feedback: FeedbackSource::Echo,
            telemetry_rate_hz: 30.0,
            initial_pose: None,
        }
    }
}

/// 手指物理范围
///
/// 归一化值 0 对应 `open`，1 对应 `closed`。`closed < open` 也是合法的
/// （例如张开对应更大的关节角）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GripperRange {
    pub open: f64,
    pub closed: f64,
}

impl Default for GripperRange {
    fn default() -> Self {
        Self {
            open: 0.0,
            closed: 1.0,
        }
    }
}

impl GripperRange {
    /// 归一化值 → 物理值
    #[inline]
    pub fn to_physical(&self, normalized: f64) -> f64 {
        self.open + (self.closed - self.open) * normalized
    }

    /// 物理值 → 归一化值（不钳位）
    #[inline]
    pub fn to_normalized(&self, physical: f64) -> f64 {
        (physical - self.open) / (self.closed - self.open)
    }

    /// 物理跨度（`closed - open`），用于速度换算
    #[inline]
    pub fn span(&self) -> f64 {
        self.closed - self.open
    }
}

/// 映射表配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// 是否应用规则中的 `invert` 标志
    pub apply_invert: bool,
    /// 8 个内部通道名称
    pub channels: Vec<String>,
    pub rules: Vec<MappingRule>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            apply_invert: true,
            channels: default_channel_names(),
            rules: identity_rules(),
        }
    }
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub control: ControlConfig,
    pub gripper: GripperRange,
    pub table: TableConfig,
    /// 通道逻辑名 → 物理执行器名
    pub aliases: HashMap<String, String>,
}

impl EngineConfig {
    /// 从 TOML 文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验全部配置
    ///
    /// # 错误
    ///
    /// - 频率必须为正的有限值
    /// - 平滑系数必须在 (0, 1] 内
    /// - 容差必须为非负有限值
    /// - 手指范围必须有限且 `open != closed`
    /// - 初始位姿必须为 7 个有限值
    /// - 映射表必须满足通道表约束
    /// - 启用同步时两条手指规则的变换必须一致
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_table().map(|_| ())
    }

    /// 校验并构造通道表
    pub fn build_table(&self) -> Result<ChannelTable, ConfigError> {
        let control = &self.control;

        positive_rate("update_rate_hz", control.update_rate_hz)?;
        positive_rate("telemetry_rate_hz", control.telemetry_rate_hz)?;

        let factor = control.smoothing_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::invalid(
                "smoothing_factor",
                format!("must be in (0, 1], got {}", factor),
            ));
        }

        let tolerance = control.gripper_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "gripper_tolerance",
                format!("must be a finite value >= 0, got {}", tolerance),
            ));
        }

        let range = &self.gripper;
        if !range.open.is_finite() || !range.closed.is_finite() {
            return Err(ConfigError::invalid(
                "gripper",
                format!(
                    "open/closed must be finite, got {} / {}",
                    range.open, range.closed
                ),
            ));
        }
        if range.open == range.closed {
            return Err(ConfigError::invalid(
                "gripper",
                format!("open and closed must differ, both are {}", range.open),
            ));
        }

        self.initial_pose()?;

        let table = ChannelTable::new(
            self.table.channels.clone(),
            &self.table.rules,
            self.table.apply_invert,
        )?;

        if control.gripper_sync && !table.fingers_symmetric() {
            return Err(ConfigError::invalid(
                "table.rules",
                "gripper rules must share scale, offset and invert while gripper_sync is enabled",
            ));
        }

        for (name, target) in &self.aliases {
            if target.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "aliases",
                    format!("alias for '{}' is empty", name),
                ));
            }
        }

        Ok(table)
    }

    /// 已校验的初始位姿
    pub fn initial_pose(&self) -> Result<Option<[f64; EXTERNAL_CHANNELS]>, ConfigError> {
        self.control
            .initial_pose
            .as_deref()
            .map(|pose| {
                finite_array::<EXTERNAL_CHANNELS>("initial_pose", pose)
                    .map_err(|e| ConfigError::invalid("initial_pose", e.to_string()))
            })
            .transpose()
    }
}

fn positive_rate(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be a finite value > 0, got {}", value),
        ))
    }
}
