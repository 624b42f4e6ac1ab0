//! Chain states and the capabilities each one exposes.
//!
//! ```text
//! select ─► Selected ─from─► Handle ─┬─join─► Joined ─on/then─► Handle
//!                                    ├─matching─► Filtered
//!                                    ├─group_by─► Grouped ─having─► Having
//!                                    ├─order─► Ordered
//!                                    └─limit/offset─► Piece
//! update ─► Updating ─then─► Assigned ─matching─► Conditioned
//! ```

/// States that can be rendered and executed.
pub trait Executable {}

/// States whose rows can be fetched.
pub trait Fetchable: Executable {}

/// States that accept `ORDER BY`.
pub trait Orderable: Fetchable {}

/// States that accept `GROUP BY`.
pub trait Groupable: Orderable {}

/// States that accept `LIMIT`/`OFFSET`.
pub trait Limitable: Fetchable {}

macro_rules! states {
    ($($(#[$doc:meta])* $name:ident: [$($cap:ident),*];)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;
            $(impl $cap for $name {})*
        )*
    };
}

states! {
    /// Select list chosen, no table yet.
    Selected: [];
    /// Primary table bound.
    Handle: [Executable, Fetchable, Orderable, Groupable, Limitable];
    /// Join keyword and table emitted, waiting for `ON`.
    Joined: [];
    /// `WHERE` applied.
    Filtered: [Executable, Fetchable, Orderable, Groupable, Limitable];
    Grouped: [Executable, Fetchable, Orderable, Limitable];
    Having: [Executable, Fetchable, Orderable, Limitable];
    Ordered: [Executable, Fetchable, Limitable];
    /// `LIMIT`/`OFFSET` applied.
    Piece: [Executable, Fetchable, Limitable];
    /// UPDATE target chosen, collecting assignments.
    Updating: [];
    Assigned: [Executable];
    Conditioned: [Executable];
}
