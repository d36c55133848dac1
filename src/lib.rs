pub mod announcer;
pub mod control;
pub mod cooldown;
pub mod countdown;
pub mod event;
pub mod gate;
pub mod logging;
pub mod paths;
pub mod queue;
pub mod settings;
pub mod speech;

#[cfg(test)]
mod testing;
