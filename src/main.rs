mod app;
mod cli;

fn main() {
    // Bare invocation opens the form; anything else is the command line
    if std::env::args_os().len() > 1 {
        app::run(cli::parse());
    } else {
        app::run_interactive();
    }
}
