use std::rc::Rc;
use std::time::Duration;

use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use skidpad_controllers::{
    ConstantEffect, EffectStack, HapticEffect, SingleRumble, Smoothing,
};

pub fn bench_damper_convergence(c: &mut Criterion) {
    c.bench_function("damper_converge_600_frames", |b| {
        b.iter(|| {
            let mut damper = Smoothing::new(0.1);
            damper.set_target(black_box(0.7));
            let mut sum = 0.0;
            for _ in 0..600 {
                sum += damper.advance(Duration::from_millis(16));
            }
            black_box(sum)
        });
    });
}

pub fn bench_effect_stack_tick(c: &mut Criterion) {
    c.bench_function("effect_stack_tick_depth_8", |b| {
        let mut stack: EffectStack<SingleRumble> = EffectStack::new();
        for i in 0..8 {
            let fx: Rc<dyn HapticEffect<SingleRumble>> = Rc::new(
                ConstantEffect::<SingleRumble>::new(
                    f64::from(i) / 8.0,
                    Some(Duration::from_secs(3600)),
                ),
            );
            stack.play(fx);
        }
        b.iter(|| black_box(stack.advance(Duration::from_millis(16))));
    });
}

criterion_group!(benches, bench_damper_convergence, bench_effect_stack_tick);
criterion_main!(benches);
