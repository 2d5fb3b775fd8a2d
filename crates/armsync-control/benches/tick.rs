//! Tick 性能基准测试
//!
//! - 完整 tick（平滑 + 同步 + 写入 + 回读）
//! - 正向 / 逆向映射
//! - 指令提交（目标双缓冲替换）

use armsync_control::{Engine, EngineConfig, GripperPolicy};
use armsync_driver::{FeedbackSource, SimActuators};
use armsync_protocol::{DEFAULT_CHANNEL_NAMES, ExternalCommand, JointCommand};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn engine(feedback: FeedbackSource) -> Engine<SimActuators> {
    let mut config = EngineConfig::default();
    config.control.feedback = feedback;
    Engine::new(&config, SimActuators::new(DEFAULT_CHANNEL_NAMES)).unwrap()
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for feedback in [FeedbackSource::None, FeedbackSource::Echo, FeedbackSource::Backend] {
        let mut engine = engine(feedback);
        engine
            .handle()
            .submit(&JointCommand::positions(vec![0.5; 7]))
            .unwrap();

        group.bench_with_input(
            BenchmarkId::new("full", format!("{:?}", feedback)),
            &feedback,
            |b, _| b.iter(|| black_box(engine.tick())),
        );
    }

    group.finish();
}

fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");
    let command = ExternalCommand::from_positions([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);

    for policy in [GripperPolicy::Continuous, GripperPolicy::Binarized] {
        let mut config = EngineConfig::default();
        config.control.gripper_policy = policy;
        let engine = Engine::new(&config, SimActuators::new(DEFAULT_CHANNEL_NAMES)).unwrap();
        let handle = engine.handle();
        let mapper = handle.mapper();

        group.bench_function(BenchmarkId::new("forward", format!("{:?}", policy)), |b| {
            b.iter(|| black_box(mapper.forward(black_box(&command))))
        });

        let target = mapper.forward(&command);
        group.bench_function(BenchmarkId::new("inverse", format!("{:?}", policy)), |b| {
            b.iter(|| black_box(mapper.inverse(&target.position, &target.velocity)))
        });
    }

    group.finish();
}

fn bench_submit(c: &mut Criterion) {
    let engine = engine(FeedbackSource::Echo);
    let handle = engine.handle();
    let command = JointCommand::positions(vec![0.25; 7]);

    c.bench_function("submit_command", |b| {
        b.iter(|| handle.submit(black_box(&command)).unwrap())
    });
}

criterion_group!(benches, bench_tick, bench_mapping, bench_submit);
criterion_main!(benches);
