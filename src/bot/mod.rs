/// Command definitions and the handlers behind them
pub mod commands;
/// Update routing: commands, plain messages and inline callbacks
pub mod handlers;
/// Reply and inline keyboards
pub mod keyboards;
