mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_config, handle_delete, handle_from, handle_list, handle_move, handle_new, handle_show,
    handle_type, handle_watch, Session,
};
