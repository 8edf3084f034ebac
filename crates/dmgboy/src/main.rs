fn main() {
    env_logger::init();

    let command = match dmgboy::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(2);
        }
    };

    if let Err(err) = dmgboy::run(command) {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
