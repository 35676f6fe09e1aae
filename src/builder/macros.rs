//! Macros for hierarchy scaffolding.

/// Declare unit states with all-default hooks.
///
/// Handy for region heads and placeholder leaves that exist for structure
/// rather than behavior. Each generated state implements
/// [`State`](crate::State) for every context and event type.
///
/// # Example
///
/// ```rust
/// use canopy::{marker_states, Machine, Region};
///
/// marker_states! { pub Locomotion, Standing, Crouching }
///
/// let apex: Region<()> = Region::composite(Locomotion)
///     .child(Region::leaf(Standing))
///     .child(Region::leaf(Crouching));
///
/// let machine = Machine::new(apex, ()).unwrap();
/// assert!(machine.is_active::<Standing>());
/// ```
#[macro_export]
macro_rules! marker_states {
    ($vis:vis $($name:ident),+ $(,)?) => {
        $(
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            $vis struct $name;

            impl<C, E> $crate::State<C, E> for $name {}
        )+
    };
}
