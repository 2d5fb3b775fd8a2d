//! 执行器后端抽象
//!
//! 后端代表仿真运行时（或真实硬件）中一组具名执行器。驱动层只在初始化时
//! 调用一次 [`ActuatorBackend::actuator_names`]，之后按槽位读写。

use crate::error::DriverError;
use parking_lot::Mutex;
use std::sync::Arc;

/// 单个执行器指令
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorCommand {
    /// 目标位置（物理单位，由通道表决定）
    pub position: f64,
    /// 目标速度（后端可忽略）
    pub velocity: f64,
}

/// 执行器后端接口
///
/// # 反馈语义
///
/// `read()` 返回后端能提供的最佳位置值：
/// - 无传感器的仿真后端：返回最近一次写入的指令值（开环回显）
/// - 有传感器的后端：返回测量值
///
/// 驱动层不区分这两种情况，控制逻辑无需修改即可切换。
pub trait ActuatorBackend: Send {
    /// 按槽位顺序返回执行器名称
    fn actuator_names(&self) -> Vec<String>;

    /// 向槽位写入指令
    fn write(&mut self, slot: usize, command: ActuatorCommand) -> Result<(), DriverError>;

    /// 读取槽位当前位置
    fn read(&self, slot: usize) -> Result<f64, DriverError>;
}

impl<B: ActuatorBackend + ?Sized> ActuatorBackend for Box<B> {
    fn actuator_names(&self) -> Vec<String> {
        (**self).actuator_names()
    }

    fn write(&mut self, slot: usize, command: ActuatorCommand) -> Result<(), DriverError> {
        (**self).write(slot, command)
    }

    fn read(&self, slot: usize) -> Result<f64, DriverError> {
        (**self).read(slot)
    }
}

#[derive(Debug, Clone)]
struct SimActuator {
    name: String,
    command: Option<ActuatorCommand>,
    /// 注入的测量值（模拟传感器），优先于回显
    measured: Option<f64>,
    /// 为 true 时拒绝写入（模拟执行器故障）
    rejecting: bool,
    writes: u64,
}

/// 内存仿真执行器组
///
/// 克隆后共享同一份存储，便于测试和上层在驱动持有后端时观察写入结果。
///
/// # Example
///
/// ```
/// use armsync_driver::{ActuatorBackend, ActuatorCommand, SimActuators};
///
/// let mut sim = SimActuators::new(["joint1", "gripper"]);
/// let observer = sim.clone();
/// sim.write(1, ActuatorCommand { position: 0.5, velocity: 0.0 }).unwrap();
/// assert_eq!(observer.commanded("gripper"), Some(0.5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimActuators {
    actuators: Arc<Mutex<Vec<SimActuator>>>,
}

impl SimActuators {
    /// 按名称创建执行器组
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let actuators = names
            .into_iter()
            .map(|name| SimActuator {
                name: name.into(),
                command: None,
                measured: None,
                rejecting: false,
                writes: 0,
            })
            .collect();
        Self {
            actuators: Arc::new(Mutex::new(actuators)),
        }
    }

    /// 最近一次写入的位置
    pub fn commanded(&self, name: &str) -> Option<f64> {
        self.actuators
            .lock()
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.command.map(|c| c.position))
    }

    /// 最近一次写入的完整指令
    pub fn command(&self, name: &str) -> Option<ActuatorCommand> {
        self.actuators
            .lock()
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.command)
    }

    /// 累计写入次数
    pub fn write_count(&self, name: &str) -> u64 {
        self.actuators
            .lock()
            .iter()
            .find(|a| a.name == name)
            .map_or(0, |a| a.writes)
    }

    /// 注入测量值（`None` 恢复为回显）
    ///
    /// 返回 false 表示名称不存在。
    pub fn set_measured(&self, name: &str, value: Option<f64>) -> bool {
        let mut actuators = self.actuators.lock();
        match actuators.iter_mut().find(|a| a.name == name) {
            Some(a) => {
                a.measured = value;
                true
            },
            None => false,
        }
    }

    /// 让执行器拒绝后续写入（`false` 恢复）
    ///
    /// 返回 false 表示名称不存在。
    pub fn set_rejecting(&self, name: &str, rejecting: bool) -> bool {
        let mut actuators = self.actuators.lock();
        match actuators.iter_mut().find(|a| a.name == name) {
            Some(a) => {
                a.rejecting = rejecting;
                true
            },
            None => false,
        }
    }

    /// 执行器数量
    pub fn len(&self) -> usize {
        self.actuators.lock().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActuatorBackend for SimActuators {
    fn actuator_names(&self) -> Vec<String> {
        self.actuators.lock().iter().map(|a| a.name.clone()).collect()
    }

    fn write(&mut self, slot: usize, command: ActuatorCommand) -> Result<(), DriverError> {
        let mut actuators = self.actuators.lock();
        let actuator = actuators
            .get_mut(slot)
            .ok_or(DriverError::UnknownSlot { slot })?;
        if actuator.rejecting {
            return Err(DriverError::Rejected {
                name: actuator.name.clone(),
                reason: "actuator fault".into(),
            });
        }
        actuator.command = Some(command);
        actuator.writes += 1;
        Ok(())
    }

    fn read(&self, slot: usize) -> Result<f64, DriverError> {
        let actuators = self.actuators.lock();
        let actuator = actuators.get(slot).ok_or(DriverError::UnknownSlot { slot })?;
        actuator
            .measured
            .or(actuator.command.map(|c| c.position))
            .ok_or_else(|| DriverError::NoValue {
                name: actuator.name.clone(),
            })
    }
}
