//! Roman Dynasty - Entry Point
//!
//! Hot-seat text front end over the `Game` facade. Every family shares one
//! terminal; commands act on the family whose turn it is. With `--rounds`
//! the game runs headlessly, ending every turn without actions.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use roman_dynasty::actions::MarriageProposal;
use roman_dynasty::core::config::GameConfig;
use roman_dynasty::core::error::Result;
use roman_dynasty::core::types::{CounterDirection, PlayerId, ProvinceId};
use roman_dynasty::entity::player::Player;
use roman_dynasty::persistence::FileStore;
use roman_dynasty::Game;

const DEFAULT_FAMILIES: [&str; 6] = ["Julii", "Claudii", "Cornelii", "Valerii", "Aemilii", "Fabii"];

/// Roman Dynasty - rise from the Republic and found a lasting dynasty
#[derive(Parser, Debug)]
#[command(name = "roman-dynasty")]
#[command(about = "Turn-based succession game for noble Roman families")]
struct Args {
    /// Number of families (ignored when --names is given)
    #[arg(long, default_value_t = 3)]
    players: usize,

    /// Comma-separated family names, in turn order
    #[arg(long, value_delimiter = ',')]
    names: Vec<String>,

    /// Random seed for reproducible games
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TOML file overriding the default rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for save files
    #[arg(long, default_value = "saves")]
    save_dir: PathBuf,

    /// Play this many rounds headlessly instead of prompting
    #[arg(long)]
    rounds: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("roman_dynasty=info").init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let names = if args.names.is_empty() {
        DEFAULT_FAMILIES.iter().cycle().take(args.players.max(1)).map(|s| s.to_string()).collect()
    } else {
        args.names.clone()
    };

    let mut game = Game::new(config, &names, args.seed)?;
    let mut store = FileStore::new(&args.save_dir);

    if let Some(rounds) = args.rounds {
        autoplay(&mut game, rounds)?;
        print_summary(&game);
        return Ok(());
    }

    println!("\n=== ROMAN DYNASTY ===");
    print_help();
    game.start_turn()?;

    loop {
        if let Some(winner) = game.winner() {
            let name = game.state().player_name(winner)?;
            println!("\n{} has founded a lasting dynasty. The game is over.", name);
            break;
        }
        let Some(current) = game.current_player() else {
            break;
        };
        let id = current.id;

        print!("[{}] > ", current.name);
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };

        let before = game.log().len();
        match command {
            "quit" | "q" => break,
            "help" | "h" => print_help(),
            "status" | "s" => print_status(&game),
            "military" => print_military(&game),
            "hand" => print_hand(&game, id),
            "act" => match rest.first().copied() {
                Some("military") => {
                    game.contribute_to_military(id)?;
                }
                Some("economy") => {
                    game.economic_development(id)?;
                }
                Some("politics") => {
                    game.political_maneuvering(id)?;
                }
                _ => println!("Usage: act military|economy|politics"),
            },
            "marry" => marry(&mut game, id, rest)?,
            "play" => match parse_index(rest.first()) {
                Some(index) => {
                    let target = rest.get(1).and_then(|s| s.parse().ok()).map(PlayerId);
                    game.play_card(id, index, target)?;
                }
                None => println!("Usage: play <card#> [target player#]"),
            },
            "discard" => match parse_index(rest.first()) {
                Some(index) => {
                    game.discard_card(id, index)?;
                }
                None => println!("Usage: discard <card#>"),
            },
            "omens" => {
                if let Some(cards) = game.read_omens(id)? {
                    for card in cards {
                        println!("  {} - {}", card.name, card.description);
                    }
                }
            }
            "tax" => match rest.first().and_then(|s| s.parse::<f64>().ok()) {
                Some(rate) => {
                    game.set_tax_rate(id, rate)?;
                }
                None => println!("Usage: tax <rate, e.g. 0.2>"),
            },
            "campaign" => {
                if let Some(outcome) = game.launch_campaign(id)? {
                    println!("Campaign result: {:?}", outcome);
                }
            }
            "grant" => grant(&mut game, id, rest)?,
            "counter" => match rest.first().copied() {
                Some("up") => {
                    game.influence_counter(id, CounterDirection::Up)?;
                }
                Some("down") => {
                    game.influence_counter(id, CounterDirection::Down)?;
                }
                _ => println!("Usage: counter up|down"),
            },
            "coup" => {
                if let Some(outcome) = game.attempt_coup(id)? {
                    println!("Coup result: {:?}", outcome);
                }
            }
            "divorce" => {
                game.divorce(id)?;
            }
            "end" | "e" => {
                if game.end_turn()? {
                    game.next_player()?;
                    game.start_turn()?;
                }
            }
            "save" => {
                if game.save(&mut store) {
                    println!("Saved to {}", store.dir().display());
                } else {
                    println!("Save failed");
                }
            }
            "load" => {
                if !game.load(&store) {
                    println!("No saved game could be loaded");
                }
            }
            "log" => {
                let count = rest.first().and_then(|s| s.parse().ok()).unwrap_or(15);
                let entries: Vec<_> = game.log().entries().collect();
                for entry in entries.iter().skip(entries.len().saturating_sub(count)) {
                    println!("  [T{}] {}", entry.turn, entry.message);
                }
                continue;
            }
            _ => println!("Unknown command. Type 'help' for the list."),
        }

        for entry in game.log().entries().skip(before) {
            println!("  {}", entry.message);
        }
    }

    println!("\nVale! The game ended on turn {}.", game.state().turn);
    Ok(())
}

fn parse_index(word: Option<&&str>) -> Option<usize> {
    word.and_then(|s| s.parse::<usize>().ok()).and_then(|n| n.checked_sub(1))
}

fn marry(game: &mut Game, id: PlayerId, rest: &[&str]) -> Result<()> {
    let (Some(family), Some(daughter)) = (rest.first(), parse_index(rest.get(1))) else {
        for option in game.eligible_families(id)? {
            let name = game.state().player_name(option.family)?;
            println!("  {} ({}): {}", name, option.family, option.daughters.join(", "));
        }
        println!("Usage: marry <family#> <daughter#> [tribute rate]");
        return Ok(());
    };
    let Ok(family) = family.parse::<u32>() else {
        println!("Usage: marry <family#> <daughter#> [tribute rate]");
        return Ok(());
    };
    let tribute_rate = rest
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(game.state().config.default_wife_tribute);
    let proposal = MarriageProposal { family: PlayerId(family), daughter_index: daughter, tribute_rate };
    game.marriage_negotiation(id, proposal)?;
    Ok(())
}

/// `grant <province#> <player#>=<count> ...`
fn grant(game: &mut Game, id: PlayerId, rest: &[&str]) -> Result<()> {
    let Some(province) = rest.first().and_then(|s| s.parse::<u32>().ok()) else {
        println!("Usage: grant <province#> <player#>=<count> ...");
        return Ok(());
    };
    let grants: Vec<(PlayerId, u32)> = rest[1..]
        .iter()
        .filter_map(|pair| {
            let (player, count) = pair.split_once(['=', ':'])?;
            Some((PlayerId(player.parse().ok()?), count.parse().ok()?))
        })
        .collect();
    game.distribute_estates(id, ProvinceId(province), &grants)?;
    Ok(())
}

/// Headless play: every family collects income and ends its turn, no
/// actions are taken
fn autoplay(game: &mut Game, rounds: u32) -> Result<()> {
    let last_round = game.state().turn + rounds;
    while game.winner().is_none() && game.state().turn < last_round {
        game.start_turn()?;
        game.end_turn()?;
        if !game.next_player()? {
            break;
        }
    }
    tracing::info!(turn = game.state().turn, winner = ?game.winner(), "Autoplay finished");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  status / s                      - Families, emperor and counter");
    println!("  military                        - Legion strength and requirements");
    println!("  hand                            - Your action cards");
    println!("  act military|economy|politics   - Take the turn's core action");
    println!("  marry [family# daughter# rate]  - Arrange a marriage");
    println!("  play <card#> [player#]          - Play a card");
    println!("  discard <card#>                 - Discard a card");
    println!("  omens                           - Reveal upcoming events");
    println!("  tax <rate>                      - (Emperor) set the tax rate");
    println!("  campaign                        - (Emperor) campaign for a province");
    println!("  grant <prov#> <player#>=<n> ... - (Emperor) grant conquered estates");
    println!("  counter up|down                 - (Emperor) sway the virtue counter");
    println!("  coup                            - Plot against the emperor");
    println!("  divorce                         - Set aside your wife");
    println!("  end / e                         - End your turn");
    println!("  save / load                     - Save or restore the game");
    println!("  log [n]                         - Show recent events");
    println!("  quit / q                        - Exit");
    println!();
}

fn print_status(game: &Game) {
    let state = game.state();
    let weights = game.counter_weights();
    println!();
    println!(
        "Turn {} | Counter {} (virtue x{:.2}, popularity x{:.2})",
        state.turn, state.counter, weights.virtue, weights.popularity
    );
    match game.emperor() {
        Some(emperor) => println!(
            "Emperor: {} | Dynasty {} | Tax {:.0}%",
            emperor.name,
            state.dynasty.count,
            state.tax_rate * 100.0
        ),
        None => println!("The Republic stands (ascension at {:.1} auctoritas)", state.imperial_threshold()),
    }
    for player in &state.players {
        print_player(player);
    }
    println!();
}

fn print_player(player: &Player) {
    let traits: Vec<&str> = player.paterfamilias.traits.iter().map(|t| t.label()).collect();
    println!(
        "  [{}] {}: {} gold, {} support, {} auctoritas, {} estates | {} ({} turns) [{}]",
        player.id,
        player.name,
        player.gold,
        player.popular_support,
        player.auctoritas,
        player.estates.len(),
        player.paterfamilias.name,
        player.paterfamilias.turns_in_role,
        traits.join(", ")
    );
    match &player.wife {
        Some(wife) => println!("      married to {} of family {}", wife.name, wife.origin_family),
        None => println!("      unmarried"),
    }
    for child in &player.children {
        println!("      child {} ({:?}, age {})", child.name, child.gender, child.age);
    }
    for effect in player.effects.iter() {
        match effect.duration {
            Some(turns) => println!("      {} ({} turns)", effect.name, turns),
            None => println!("      {}", effect.name),
        }
    }
}

fn print_military(game: &Game) {
    let status = game.military_status();
    println!(
        "Legions {} / {} required ({}), next conquest needs {}",
        status.current,
        status.required,
        if status.stable { "stable" } else { "UNSTABLE" },
        status.next_conquest_required
    );
    if let Some(next) = status.next_province {
        println!("Next province: {}{}", next, if status.can_conquer { " (ready)" } else { "" });
    }
}

fn print_hand(game: &Game, id: PlayerId) {
    let Ok(player) = game.state().player(id) else {
        return;
    };
    for (index, card) in player.hand.iter().enumerate() {
        println!(
            "  {}. {} [{}g {}a {}s] - {}",
            index + 1,
            card.name,
            card.cost.gold,
            card.cost.auctoritas,
            card.cost.popular_support,
            card.description
        );
    }
}

fn print_summary(game: &Game) {
    print_status(game);
    match game.winner() {
        Some(winner) => println!("Winner: family {}", winner),
        None => println!("No dynasty has yet prevailed."),
    }
}
