use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use skidpad_controllers::{
    Button, Collection, ConstantEffect, ControllerError, ControllerEvent, Device,
    DeviceId, DualPulseEffect, DualRumble, EventKind, HapticEffect, Result,
    RumbleLevels, SingleRumble, TickEffect,
};

use crate::cli::Cli;

const FRAME: Duration = Duration::from_millis(16);

/// An effect playing while a button is held, so it can be removed on
/// release. The variant follows the device family's motor capability.
enum HeldEffect {
    Single(Rc<dyn HapticEffect<SingleRumble>>),
    Dual(Rc<dyn HapticEffect<DualRumble>>),
}

/// Runs the single-threaded frame loop: pump raw SDL events into the
/// collection, advance it once per frame, then drain and report.
pub(crate) fn run(args: &Cli) -> Result<()> {
    let sdl = sdl2::init().map_err(ControllerError::BackendInit)?;
    let mut pump = sdl.event_pump().map_err(ControllerError::BackendInit)?;
    let mut collection = Collection::new(&sdl)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .map_err(|err| ControllerError::Backend(err.to_string()))?;
    }

    let mut held: AHashMap<DeviceId, HeldEffect> = AHashMap::new();
    let mut last = Instant::now();
    log::info!("padmon running; hold A to rumble, Esc or Ctrl+C to quit");

    while running.load(Ordering::SeqCst) {
        for evt in pump.poll_iter() {
            match evt {
                Event::Quit { .. }
                | Event::KeyDown { keycode: Some(Keycode::Escape), .. } => {
                    running.store(false, Ordering::SeqCst);
                }
                other => {
                    collection.handle_event(&other);
                }
            }
        }

        let now = Instant::now();
        collection.advance(now - last);
        last = now;

        for event in collection.drain_events() {
            report(&event);
            match event.kind() {
                EventKind::DeviceAdded if args.rumble_test => greet(event.source()),
                EventKind::DeviceRemoved => {
                    // Unplugging mid-press would otherwise leak the entry.
                    held.remove(&event.source().borrow().id());
                }
                EventKind::ButtonDown { button: Button::A } => {
                    press(event.source(), &mut held);
                }
                EventKind::ButtonUp { button: Button::A } => {
                    release(event.source(), &mut held);
                }
                _ => {}
            }
        }

        thread::sleep(FRAME);
    }

    log::info!("padmon stopped");
    Ok(())
}

fn report(event: &ControllerEvent) {
    let source = event.source().borrow();
    let id = source.id();
    match event.kind() {
        EventKind::DeviceAdded => {
            log::info!("[{id}] connected: {} ({})", source.name(), source.kind());
        }
        EventKind::DeviceRemoved => log::info!("[{id}] disconnected"),
        EventKind::AxisMotion { axis, value } => {
            log::debug!("[{id}] axis {axis} = {value:.3}");
        }
        EventKind::ButtonDown { button } => log::debug!("[{id}] button {button} down"),
        EventKind::ButtonUp { button } => log::debug!("[{id}] button {button} up"),
    }
}

/// Short fixed rumble on connect; bounded effects pop off the stack on
/// their own.
fn greet(source: &Rc<RefCell<Device>>) {
    let length = Some(Duration::from_millis(400));
    match &mut *source.borrow_mut() {
        Device::Classic(pad) => {
            pad.play_haptic_effect(Rc::new(ConstantEffect::<SingleRumble>::new(
                0.5, length,
            )));
        }
        Device::Flex(pad) => {
            pad.play_haptic_effect(Rc::new(ConstantEffect::<DualRumble>::new(
                RumbleLevels { high: 0.5, low: 0.5 },
                length,
            )));
        }
    }
}

fn press(source: &Rc<RefCell<Device>>, held: &mut AHashMap<DeviceId, HeldEffect>) {
    let mut device = source.borrow_mut();
    let id = device.id();
    match &mut *device {
        Device::Classic(pad) => {
            let fx: Rc<dyn HapticEffect<SingleRumble>> =
                Rc::new(TickEffect::new(0.8, 4.0));
            pad.play_haptic_effect(fx.clone());
            held.insert(id, HeldEffect::Single(fx));
        }
        Device::Flex(pad) => {
            let fx: Rc<dyn HapticEffect<DualRumble>> =
                Rc::new(DualPulseEffect::new(0.8, 4.0, PI));
            pad.play_haptic_effect(fx.clone());
            held.insert(id, HeldEffect::Dual(fx));
        }
    }
}

fn release(source: &Rc<RefCell<Device>>, held: &mut AHashMap<DeviceId, HeldEffect>) {
    let mut device = source.borrow_mut();
    let Some(fx) = held.remove(&device.id()) else {
        return;
    };
    match (&mut *device, fx) {
        (Device::Classic(pad), HeldEffect::Single(fx)) => pad.remove_haptic_effect(&fx),
        (Device::Flex(pad), HeldEffect::Dual(fx)) => pad.remove_haptic_effect(&fx),
        _ => {}
    }
}
