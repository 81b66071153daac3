//! Native functions pre-loaded into the global scope before any script
//! statement runs.
//!
//! Categories:
//! - **Collections**: length, push, pop
//! - **Io**: read, write, exists
//! - **Math**: num, rng, seed, round
//! - **Misc**: exit, arg, char, type

mod collections;
mod io;
mod math;
mod misc;

use crate::interpreter::environment::Environment;
use crate::value::{NativeFn, NativeFunction, Value};
use std::rc::Rc;

const BUILTINS: &[(&str, usize, NativeFn)] = &[
    ("num", 1, math::num),
    ("length", 1, collections::length),
    ("push", 2, collections::push),
    ("pop", 2, collections::pop),
    ("read", 1, io::read),
    ("write", 2, io::write),
    ("exists", 1, io::exists),
    ("rng", 0, math::rng),
    ("seed", 1, math::seed),
    ("round", 1, math::round),
    ("exit", 1, misc::exit),
    ("arg", 1, misc::arg),
    ("char", 1, misc::char_code),
    ("type", 1, misc::type_of),
];

pub fn install(globals: &Rc<Environment>) {
    for &(name, arity, func) in BUILTINS {
        globals.declare(
            Rc::from(name),
            Value::Callable(Rc::new(NativeFunction { name, arity, func })),
        );
    }
}
