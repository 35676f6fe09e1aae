//! Guard AI demo: composite behavior modes, an orthogonal combat region,
//! and resume memory for interrupted patrols.
//!
//! Run with `cargo run --example patrol`.

use canopy::{
    Control, Logger, MachineBuilder, Method, Region, State, StateId,
};

#[derive(Debug)]
enum Sight {
    Noise,
    Intruder,
    AllClear,
}

#[derive(Default)]
struct World {
    tick: u32,
    stamina: u32,
    suspicion: u32,
}

struct Guard;
impl State<World, Sight> for Guard {
    fn update(&mut self, world: &mut World) {
        world.tick += 1;
    }
}

struct Patrol;
impl State<World, Sight> for Patrol {
    fn react(&mut self, event: &Sight, control: &mut Control<'_>, _world: &mut World) {
        if matches!(event, Sight::Intruder) {
            control.change_to::<Combat>();
        }
    }
}

struct Walk;
impl State<World, Sight> for Walk {
    fn update(&mut self, world: &mut World) {
        world.stamina = world.stamina.saturating_sub(1);
    }

    fn transition(&mut self, control: &mut Control<'_>, world: &mut World) {
        if world.stamina == 0 {
            control.change_to::<Rest>();
        }
    }

    fn react(&mut self, event: &Sight, control: &mut Control<'_>, world: &mut World) {
        if matches!(event, Sight::Noise) {
            world.suspicion += 3;
            control.change_to::<Investigate>();
        }
    }
}

struct Rest;
impl State<World, Sight> for Rest {
    fn update(&mut self, world: &mut World) {
        world.stamina += 3;
    }

    fn transition(&mut self, control: &mut Control<'_>, world: &mut World) {
        if world.stamina >= 6 {
            control.change_to::<Walk>();
        }
    }
}

struct Investigate;
impl State<World, Sight> for Investigate {
    fn transition(&mut self, control: &mut Control<'_>, world: &mut World) {
        world.suspicion = world.suspicion.saturating_sub(1);
        if world.suspicion == 0 {
            // Pick the patrol back up where it was interrupted.
            control.resume::<Patrol>();
        }
    }
}

struct Combat;
impl State<World, Sight> for Combat {
    fn react(&mut self, event: &Sight, control: &mut Control<'_>, _world: &mut World) {
        if matches!(event, Sight::AllClear) {
            control.resume::<Patrol>();
        }
    }
}

struct Aim;
impl State<World, Sight> for Aim {}

struct Strafe;
impl State<World, Sight> for Strafe {}

struct ConsoleLogger;
impl Logger for ConsoleLogger {
    fn record(&mut self, _state: StateId, state_name: &str, _method: Method, method_name: &str) {
        tracing::debug!(state = state_name, hook = method_name, "hook");
    }
}

fn print_structure(machine: &canopy::Machine<World, Sight>) {
    for row in machine.structure() {
        let marker = if row.is_active { "*" } else { " " };
        println!("{marker} {}{}", row.prefix, row.name);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let apex = Region::composite(Guard)
        .child(
            Region::composite(Patrol)
                .child(Region::leaf(Walk))
                .child(Region::leaf(Rest)),
        )
        .child(Region::leaf(Investigate))
        .child(
            Region::orthogonal(Combat)
                .child(Region::leaf(Aim))
                .child(Region::leaf(Strafe)),
        );

    let mut machine = MachineBuilder::new()
        .apex(apex)
        .logger(Box::new(ConsoleLogger))
        .build(World {
            stamina: 4,
            ..World::default()
        })
        .expect("hierarchy is well-formed");

    println!("-- patrolling until tired --");
    for _ in 0..6 {
        machine.update();
    }
    print_structure(&machine);

    println!("-- noise heard --");
    machine.react(&Sight::Noise);
    machine.update();
    print_structure(&machine);

    println!("-- suspicion fades, patrol resumes where it left off --");
    machine.update();
    machine.update();
    print_structure(&machine);

    println!("-- intruder! --");
    machine.react(&Sight::Intruder);
    print_structure(&machine);

    println!("-- all clear --");
    machine.react(&Sight::AllClear);
    print_structure(&machine);

    println!(
        "ticks: {}, stamina: {}",
        machine.context().tick,
        machine.context().stamina
    );
}
