use std::{
    error::Error as StdError,
    io,
    io::{BufReader, BufWriter},
};

use ppr_tools::pgn::scan_games;

fn main() -> Result<(), Box<dyn StdError>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let stdin = BufReader::new(io::stdin().lock());
    let mut writer = csv::Writer::from_writer(BufWriter::new(io::stdout().lock()));

    let mut num_games: u64 = 0;
    scan_games(stdin, |game| {
        writer.serialize(game)?;
        num_games += 1;
        Ok::<_, Box<dyn StdError>>(())
    })?;
    writer.flush()?;

    log::info!("converted {num_games} games");
    Ok(())
}
