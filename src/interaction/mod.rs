//! DOM event scripts used by the CDP session to act on a resolved element.
//!
//! Each function returns a script body that runs with `el` bound to the
//! target element and returns `{ v: ... }`.

pub mod click;
pub mod keyboard;
