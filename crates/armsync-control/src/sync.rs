//! 夹爪手指同步
//!
//! 平滑之后执行：两根手指位置差超过容差时，两者都设为平均值。

use crate::state::ControlState;
use armsync_protocol::{GRIPPER_LEFT, GRIPPER_RIGHT};
use tracing::trace;

/// 同步手指位置
///
/// 返回是否发生了修正。执行后 `|current[6] - current[7]| <= tolerance`。
pub fn sync_fingers(state: &mut ControlState, tolerance: f64) -> bool {
    let left = state.current_position[GRIPPER_LEFT];
    let right = state.current_position[GRIPPER_RIGHT];
    if (left - right).abs() <= tolerance {
        return false;
    }

    let mean = (left + right) / 2.0;
    trace!(
        "Gripper fingers diverged ({:.6} vs {:.6}), snapping both to {:.6}",
        left, right, mean
    );
    state.current_position[GRIPPER_LEFT] = mean;
    state.current_position[GRIPPER_RIGHT] = mean;
    true
}
