use satori::command_line;

fn main() {
    env_logger::init();
    std::process::exit(command_line::run());
}
