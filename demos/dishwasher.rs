//! Appliance demo: a wash program that pauses when the door opens and
//! resumes the interrupted phase when it closes.
//!
//! Run with `cargo run --example dishwasher`.

use canopy::{Bare, Control, Machine, Region, State};

#[derive(Debug)]
enum Door {
    Opened,
    Closed,
}

#[derive(Default)]
struct Program {
    phase_ticks: u32,
}

struct DoorOpen;
impl State<Program, Door> for DoorOpen {
    fn react(&mut self, event: &Door, control: &mut Control<'_>, _program: &mut Program) {
        if matches!(event, Door::Closed) {
            control.resume::<Running>();
        }
    }
}

struct Running;
impl State<Program, Door> for Running {
    fn react(&mut self, event: &Door, control: &mut Control<'_>, _program: &mut Program) {
        if matches!(event, Door::Opened) {
            control.change_to::<DoorOpen>();
        }
    }
}

macro_rules! phase {
    ($name:ident => $next:ident, $length:expr) => {
        struct $name;
        impl State<Program, Door> for $name {
            fn enter(&mut self, program: &mut Program) {
                program.phase_ticks = 0;
                println!("phase: {}", stringify!($name));
            }

            fn update(&mut self, program: &mut Program) {
                program.phase_ticks += 1;
            }

            fn transition(&mut self, control: &mut Control<'_>, program: &mut Program) {
                if program.phase_ticks >= $length {
                    control.change_to::<$next>();
                }
            }
        }
    };
}

phase!(Wash => Rinse, 3);
phase!(Rinse => Dry, 2);

struct Dry;
impl State<Program, Door> for Dry {
    fn enter(&mut self, program: &mut Program) {
        program.phase_ticks = 0;
        println!("phase: Dry");
    }
}

fn main() {
    let apex = Region::composite(Bare)
        .child(
            Region::composite(Running)
                .child(Region::leaf(Wash))
                .child(Region::leaf(Rinse))
                .child(Region::leaf(Dry)),
        )
        .child(Region::leaf(DoorOpen));

    let mut machine = Machine::new(apex, Program::default()).expect("hierarchy is well-formed");

    for _ in 0..4 {
        machine.update();
    }
    assert!(machine.is_active::<Rinse>());

    println!("door opens mid-rinse");
    machine.react(&Door::Opened);
    assert!(machine.is_active::<DoorOpen>());
    assert!(machine.is_resumable::<Rinse>());

    println!("door closes");
    machine.react(&Door::Closed);
    assert!(machine.is_active::<Rinse>(), "rinse picked up where it left off");

    for _ in 0..3 {
        machine.update();
    }
    assert!(machine.is_active::<Dry>());
    println!("program finished drying");
}
