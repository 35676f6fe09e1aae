//! Property-based tests for the activation tree.
//!
//! These tests use proptest to drive a fixed hierarchy through random
//! transition streams and verify the machine's structural invariants
//! hold after every tick.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use canopy::{Machine, Region, State};
use proptest::prelude::*;

#[derive(Clone, Default)]
struct Ctx {
    log: Rc<RefCell<Vec<String>>>,
}

impl Ctx {
    fn push(&self, state: &str, hook: &str) {
        self.log.borrow_mut().push(format!("{state}:{hook}"));
    }
}

macro_rules! tracers {
    ($($name:ident),+ $(,)?) => {
        $(
            struct $name;

            impl State<Ctx> for $name {
                fn enter(&mut self, context: &mut Ctx) {
                    context.push(stringify!($name), "enter");
                }
                fn leave(&mut self, context: &mut Ctx) {
                    context.push(stringify!($name), "leave");
                }
            }
        )+
    };
}

tracers!(Apex, A, B, B1, B2, W, P, P1, P2, Q, Q1, Q2);

// Apex = C(A, B = C(B1, B2), W = O(P = C(P1, P2), Q = C(Q1, Q2))): four
// forks, one orthogonal with two memory-bearing branches, twelve states.
fn hierarchy() -> Region<Ctx> {
    Region::composite(Apex)
        .child(Region::leaf(A))
        .child(
            Region::composite(B)
                .child(Region::leaf(B1))
                .child(Region::leaf(B2)),
        )
        .child(
            Region::orthogonal(W)
                .child(
                    Region::composite(P)
                        .child(Region::leaf(P1))
                        .child(Region::leaf(P2)),
                )
                .child(
                    Region::composite(Q)
                        .child(Region::leaf(Q1))
                        .child(Region::leaf(Q2)),
                ),
        )
}

#[derive(Clone, Copy, Debug)]
enum Target {
    Apex,
    A,
    B,
    B1,
    B2,
    W,
    P,
    P1,
    P2,
    Q,
    Q1,
    Q2,
}

#[derive(Clone, Copy, Debug)]
enum Op {
    ChangeTo(Target),
    Resume(Target),
    Schedule(Target),
}

macro_rules! dispatch {
    ($machine:expr, $method:ident, $target:expr) => {
        match $target {
            Target::Apex => $machine.$method::<Apex>(),
            Target::A => $machine.$method::<A>(),
            Target::B => $machine.$method::<B>(),
            Target::B1 => $machine.$method::<B1>(),
            Target::B2 => $machine.$method::<B2>(),
            Target::W => $machine.$method::<W>(),
            Target::P => $machine.$method::<P>(),
            Target::P1 => $machine.$method::<P1>(),
            Target::P2 => $machine.$method::<P2>(),
            Target::Q => $machine.$method::<Q>(),
            Target::Q1 => $machine.$method::<Q1>(),
            Target::Q2 => $machine.$method::<Q2>(),
        }
    };
}

fn apply(machine: &mut Machine<Ctx>, op: Op) {
    match op {
        Op::ChangeTo(target) => dispatch!(machine, change_to, target),
        Op::Resume(target) => dispatch!(machine, resume, target),
        Op::Schedule(target) => dispatch!(machine, schedule, target),
    }
}

prop_compose! {
    fn arbitrary_target()(variant in 0..12usize) -> Target {
        match variant {
            0 => Target::Apex,
            1 => Target::A,
            2 => Target::B,
            3 => Target::B1,
            4 => Target::B2,
            5 => Target::W,
            6 => Target::P,
            7 => Target::P1,
            8 => Target::P2,
            9 => Target::Q,
            10 => Target::Q1,
            _ => Target::Q2,
        }
    }
}

prop_compose! {
    fn arbitrary_op()(kind in 0..3usize, target in arbitrary_target()) -> Op {
        match kind {
            0 => Op::ChangeTo(target),
            1 => Op::Resume(target),
            _ => Op::Schedule(target),
        }
    }
}

// At most two requests between ticks: the queue holds one slot per fork.
fn rounds() -> impl Strategy<Value = Vec<Vec<Op>>> {
    prop::collection::vec(prop::collection::vec(arbitrary_op(), 0..3), 1..16)
}

proptest! {
    #[test]
    fn composite_prongs_stay_exclusive(rounds in rounds()) {
        let ctx = Ctx::default();
        let mut machine = Machine::new(hierarchy(), ctx).unwrap();

        for round in &rounds {
            for op in round {
                apply(&mut machine, *op);
            }
            machine.update();

            prop_assert!(machine.is_active::<Apex>());

            let top_active = [
                machine.is_active::<A>(),
                machine.is_active::<B>(),
                machine.is_active::<W>(),
            ];
            prop_assert_eq!(top_active.iter().filter(|active| **active).count(), 1);

            if machine.is_active::<B>() {
                prop_assert!(machine.is_active::<B1>() ^ machine.is_active::<B2>());
            } else {
                prop_assert!(!machine.is_active::<B1>());
                prop_assert!(!machine.is_active::<B2>());
            }

            if machine.is_active::<W>() {
                // Orthogonal branches are all active together.
                prop_assert!(machine.is_active::<P>());
                prop_assert!(machine.is_active::<Q>());
                prop_assert!(machine.is_active::<P1>() ^ machine.is_active::<P2>());
                prop_assert!(machine.is_active::<Q1>() ^ machine.is_active::<Q2>());
            } else {
                prop_assert!(!machine.is_active::<P>());
                prop_assert!(!machine.is_active::<Q>());
                prop_assert!(!machine.is_active::<P1>());
                prop_assert!(!machine.is_active::<P2>());
                prop_assert!(!machine.is_active::<Q1>());
                prop_assert!(!machine.is_active::<Q2>());
            }
        }
    }

    #[test]
    fn enter_and_leave_balance_over_the_machine_lifetime(rounds in rounds()) {
        let ctx = Ctx::default();
        {
            let mut machine = Machine::new(hierarchy(), ctx.clone()).unwrap();
            for round in &rounds {
                for op in round {
                    apply(&mut machine, *op);
                }
                machine.update();
            }
        }

        let log = ctx.log.borrow();
        let mut balance: HashMap<String, i64> = HashMap::new();
        for call in log.iter() {
            let (state, hook) = call.split_once(':').expect("trace entries are state:hook");
            let counter = balance.entry(state.to_string()).or_insert(0);
            match hook {
                "enter" => *counter += 1,
                "leave" => *counter -= 1,
                other => prop_assert!(false, "unexpected hook {other}"),
            }
            // A state never leaves more often than it entered.
            prop_assert!(*counter >= 0, "{state} left before entering");
            prop_assert!(*counter <= 1, "{state} entered twice without leaving");
        }
        for (state, counter) in &balance {
            prop_assert_eq!(*counter, 0, "unbalanced enter/leave for {}", state);
        }
    }

    #[test]
    fn structure_report_matches_queries(rounds in rounds()) {
        let ctx = Ctx::default();
        let mut machine = Machine::new(hierarchy(), ctx).unwrap();

        for round in &rounds {
            for op in round {
                apply(&mut machine, *op);
            }
            machine.update();

            let expected = vec![
                ("Apex", machine.is_active::<Apex>()),
                ("A", machine.is_active::<A>()),
                ("B", machine.is_active::<B>()),
                ("B1", machine.is_active::<B1>()),
                ("B2", machine.is_active::<B2>()),
                ("W", machine.is_active::<W>()),
                ("P", machine.is_active::<P>()),
                ("P1", machine.is_active::<P1>()),
                ("P2", machine.is_active::<P2>()),
                ("Q", machine.is_active::<Q>()),
                ("Q1", machine.is_active::<Q1>()),
                ("Q2", machine.is_active::<Q2>()),
            ];
            let reported: Vec<(&str, bool)> = machine
                .structure()
                .iter()
                .map(|row| (row.name, row.is_active))
                .collect();
            prop_assert_eq!(reported, expected);
        }
    }

    #[test]
    fn activity_counters_track_active_states(rounds in rounds()) {
        let ctx = Ctx::default();
        let mut machine = Machine::new(hierarchy(), ctx).unwrap();

        let mut ticks: i64 = 0;
        for round in &rounds {
            for op in round {
                apply(&mut machine, *op);
            }
            machine.update();
            ticks += 1;

            for (row, counter) in machine.structure().iter().zip(machine.activity()) {
                // Counters move one step per tick, so they stay within
                // the tick horizon and match the sign of recent activity.
                prop_assert!((*counter as i64).abs() <= ticks);
                if row.is_active {
                    prop_assert!(*counter > i8::MIN + 1);
                } else {
                    prop_assert!(*counter < i8::MAX - 1);
                }
            }
        }
    }

    #[test]
    fn identical_inputs_produce_identical_traces(rounds in rounds()) {
        let first = Ctx::default();
        let second = Ctx::default();

        for ctx in [&first, &second] {
            let mut machine = Machine::new(hierarchy(), ctx.clone()).unwrap();
            for round in &rounds {
                for op in round {
                    apply(&mut machine, *op);
                }
                machine.update();
            }
        }

        prop_assert_eq!(&*first.log.borrow(), &*second.log.borrow());
    }
}
