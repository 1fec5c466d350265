use clap::Parser;
use stickies::cli::{
    handle_config, handle_delete, handle_from, handle_list, handle_move, handle_new, handle_show,
    handle_type, handle_watch, Cli, Commands, Session,
};
use stickies::logging;

fn main() {
    let cli = Cli::parse();

    logging::init(match cli.command {
        Commands::Watch => "stickies=info",
        _ => "stickies=warn",
    });

    let session = Session::new(cli.vault, cli.width, cli.height);

    let result = match cli.command {
        Commands::New { json } => handle_new(&session, json),
        Commands::From { file, json } => handle_from(&session, file, json),
        Commands::List { json } => handle_list(&session, json),
        Commands::Show { id, json } => handle_show(&session, id, json),
        Commands::Type { id, text } => handle_type(&session, id, text),
        Commands::Move { id, x, y } => handle_move(&session, id, x, y),
        Commands::Delete { id, force } => handle_delete(&session, id, force),
        Commands::Config {
            notes_folder,
            default_color,
        } => handle_config(&session, notes_folder, default_color),
        Commands::Watch => handle_watch(&session),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
