use crate::config::AppConfig;
use crate::data::{NewPreset, PresetStore};
use crate::grid::{build_grid, compare, CombatLength, CompareMode, FallbackPolicy};
use crate::parallel::{evaluate_presets, rank_evaluations, Probe, WorkerPool};
use crate::server;
use crate::session::{parse_optional, HeatmapForm};

const USAGE: &str = "usage: cdr-heatmap <serve|grid|compare|presets|save-preset|rank>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Grid,
    Compare,
    Presets,
    SavePreset,
    Rank,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("grid") => Some(Command::Grid),
        Some("compare") => Some(Command::Compare),
        Some("presets") => Some(Command::Presets),
        Some("save-preset") => Some(Command::SavePreset),
        Some("rank") => Some(Command::Rank),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    // Positional arguments after the subcommand, flags stripped.
    let positional: Vec<&str> = args
        .iter()
        .skip(2)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
        .collect();

    match command {
        Command::Serve => handle_serve(&config),
        Command::Grid => handle_grid(args, &positional),
        Command::Compare => handle_compare(args, &positional, &config),
        Command::Presets => handle_presets(&config),
        Command::SavePreset => handle_save_preset(&positional, &config),
        Command::Rank => handle_rank(args, &positional, &config),
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

/// `--name=value` style option.
fn option_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .find_map(|arg| arg.strip_prefix(name)?.strip_prefix('='))
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_serve(config: &AppConfig) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_grid(args: &[String], positional: &[&str]) -> i32 {
    if positional.len() < 3 {
        eprintln!("usage: cdr-heatmap grid <damage> <mult> <base_cooldown> [max_cdr] [--storm] [--table]");
        return 2;
    }
    let form = HeatmapForm {
        damage: positional[0].to_string(),
        mult: positional[1].to_string(),
        base_cooldown: positional[2].to_string(),
        max_cdr: positional.get(3).copied().unwrap_or("100").to_string(),
        low_cap: option_value(args, "--low").unwrap_or_default().to_string(),
        high_cap: option_value(args, "--high").unwrap_or_default().to_string(),
        end_at_storm: has_flag(args, "--storm"),
    };

    let request = match form.parse() {
        Ok(request) => request,
        Err(err) => {
            eprintln!("invalid input: {err}");
            return 1;
        }
    };
    let grid = match build_grid(&request.spec, &request.params) {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("invalid input: {err}");
            return 1;
        }
    };

    if has_flag(args, "--table") {
        let header: Vec<String> = (0..grid.columns()).map(|s| s.to_string()).collect();
        println!("cdr\t{}", header.join("\t"));
        for (row, values) in grid.iter_rows().enumerate() {
            let cells: Vec<String> = values.iter().map(|v| format!("{v:.2}")).collect();
            let cdr = grid.cdr_percent_for_row(row).unwrap_or_default();
            println!("{cdr}%\t{}", cells.join("\t"));
        }
        0
    } else {
        print_json(&grid, "grid")
    }
}

fn parse_policy(raw: Option<&str>) -> Option<FallbackPolicy> {
    match raw {
        None | Some("unit") => Some(FallbackPolicy::UnitMagnitude),
        Some("zero") => Some(FallbackPolicy::Zero),
        Some("reject") => Some(FallbackPolicy::Reject),
        Some(_) => None,
    }
}

fn handle_compare(args: &[String], positional: &[&str], config: &AppConfig) -> i32 {
    let (Some(&left), Some(&right)) = (positional.first(), positional.get(1)) else {
        eprintln!("usage: cdr-heatmap compare <preset-a> <preset-b> [--absolute] [--storm] [--policy=unit|zero|reject]");
        return 2;
    };
    let Some(policy) = parse_policy(option_value(args, "--policy")) else {
        eprintln!("invalid --policy, expected unit, zero or reject");
        return 2;
    };
    let mode = if has_flag(args, "--absolute") {
        CompareMode::Absolute
    } else {
        CompareMode::Relative
    };
    let length = CombatLength::from_end_at_storm(has_flag(args, "--storm"));

    let store = PresetStore::open(&config.presets_path);
    let build = |name: &str| -> Result<_, String> {
        let preset = store.find(name).map_err(|err| format!("{name}: {err}"))?;
        let spec = preset.grid_spec(length).map_err(|err| format!("{name}: {err}"))?;
        let params = preset.weapon_params().map_err(|err| format!("{name}: {err}"))?;
        build_grid(&spec, &params).map_err(|err| format!("{name}: {err}"))
    };

    let grids = build(left).and_then(|a| build(right).map(|b| (a, b)));
    let (a, b) = match grids {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("compare failed: {err}");
            return 1;
        }
    };
    match compare(&a, &b, mode, policy) {
        Ok(comparison) => print_json(&comparison, "comparison"),
        Err(err) => {
            eprintln!("compare failed: {err}");
            1
        }
    }
}

fn handle_presets(config: &AppConfig) -> i32 {
    match PresetStore::open(&config.presets_path).load_all() {
        Ok(presets) => print_json(&presets, "presets"),
        Err(err) => {
            eprintln!("failed to load presets: {err}");
            1
        }
    }
}

fn handle_save_preset(positional: &[&str], config: &AppConfig) -> i32 {
    if positional.len() < 5 {
        eprintln!("usage: cdr-heatmap save-preset <name> <damage> <mult> <base_cooldown> <max_cdr> [low_cap] [high_cap]");
        return 2;
    }
    let number = |idx: usize| positional.get(idx).and_then(|raw| raw.parse::<f64>().ok());
    let (Some(damage), Some(mult), Some(base_cooldown), Ok(max_cdr)) = (
        number(1),
        positional[2].parse::<u32>().ok(),
        number(3),
        positional[4].parse::<u32>(),
    ) else {
        eprintln!("save failed: damage, mult, base_cooldown and max_cdr must be numbers");
        return 1;
    };

    let caps = parse_optional("low_cap", positional.get(5).copied().unwrap_or_default())
        .and_then(|low| {
            parse_optional("high_cap", positional.get(6).copied().unwrap_or_default())
                .map(|high| (low, high))
        });
    let (low_cap, high_cap) = match caps {
        Ok(caps) => caps,
        Err(err) => {
            eprintln!("save failed: {err}");
            return 1;
        }
    };

    let new = NewPreset {
        name: positional[0].to_string(),
        damage,
        mult,
        base_cooldown,
        low_cap,
        high_cap,
        max_cdr,
    };
    match PresetStore::open(&config.presets_path).save(new) {
        Ok(preset) => {
            println!("saved preset {} '{}'", preset.id, preset.name);
            0
        }
        Err(err) => {
            eprintln!("save failed: {err}");
            1
        }
    }
}

fn handle_rank(args: &[String], positional: &[&str], config: &AppConfig) -> i32 {
    let cdr_percent = parse_u32_arg(positional.first().copied(), "cdr", 0);
    let seconds = parse_u32_arg(positional.get(1).copied(), "seconds", 30) as usize;
    let length = CombatLength::from_end_at_storm(has_flag(args, "--storm"));

    let presets = match PresetStore::open(&config.presets_path).load_all() {
        Ok(presets) => presets,
        Err(err) => {
            eprintln!("failed to load presets: {err}");
            return 1;
        }
    };
    let probe = Probe {
        cdr_percent,
        seconds,
    };
    let ranked = rank_evaluations(evaluate_presets(
        &presets,
        length,
        probe,
        &WorkerPool::with_workers(config.workers),
    ));
    print_json(&ranked, "rankings")
}

fn parse_u32_arg(raw: Option<&str>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
