//! 指数插值平滑器
//!
//! 每个 tick：`current = current + (target - current) * factor`。
//!
//! 收敛速度以 tick 计而非以时间计：同一系数在不同 tick 频率下的
//! 时间常数不同，换算见 [`Smoother::equivalent_factor`]。

use crate::state::ControlState;

/// 线性插值
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// 平滑器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    factor: f64,
}

impl Smoother {
    /// 创建平滑器
    ///
    /// 系数应在 (0, 1] 内（由配置校验保证），此处钳位到该区间。
    pub fn new(factor: f64) -> Self {
        Self {
            factor: factor.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// 推进一个 tick
    pub fn advance(&self, state: &mut ControlState) {
        let f = self.factor;
        for (current, target) in state
            .current_position
            .iter_mut()
            .zip(state.target_position.iter())
        {
            *current = lerp(*current, *target, f);
        }
        for (current, target) in state
            .current_velocity
            .iter_mut()
            .zip(state.target_velocity.iter())
        {
            *current = lerp(*current, *target, f);
        }
        state.current_gripper = lerp(state.current_gripper, state.target_gripper, f);
    }

    /// 把在 `from_hz` 下调好的系数换算到 `to_hz`
    ///
    /// 保证两者在相同墙钟时间内剩余误差比例相同：
    /// `1 - (1 - f)^(from_hz / to_hz)`。
    pub fn equivalent_factor(factor: f64, from_hz: f64, to_hz: f64) -> f64 {
        1.0 - (1.0 - factor).powf(from_hz / to_hz)
    }
}
