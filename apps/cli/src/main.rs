#![deny(warnings)]

//! Headless CLI for exploring the lab pages, scenarios and challenges.

use anyhow::{anyhow, bail, Context, Result};
use lab_core::{validate_config, LabConfig};
use lab_present::{LabSession, Page, Presenter};
use lab_scenarios::{Catalog, CoffeeShopDecision};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: lab-cli [--page balance-sheet|profit-loss|profit-loss-detail|ratios]
               [--set key=value]... [--reported-net-income N]
               [--scenario ID [--stage K] [--cumulative]]
               [--coffee VOLUME,PRICE,MARKETING] [--random SEED]
               [--config lab.yaml] [--json] [--list] [--version]";

#[derive(Debug, Default)]
struct Args {
    page: Option<String>,
    sets: Vec<(String, String)>,
    reported_net_income: Option<String>,
    scenario: Option<String>,
    stage: Option<usize>,
    cumulative: bool,
    coffee: Option<String>,
    random: Option<u64>,
    config: Option<String>,
    json: bool,
    list: bool,
    version: bool,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().ok_or_else(|| anyhow!("{flag} needs a value"));
        match arg.as_str() {
            "--page" => out.page = Some(value("--page")?),
            "--set" => {
                let pair = value("--set")?;
                let (key, raw) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--set expects key=value, got `{pair}`"))?;
                out.sets.push((key.to_string(), raw.to_string()));
            }
            "--reported-net-income" => out.reported_net_income = Some(value("--reported-net-income")?),
            "--scenario" => out.scenario = Some(value("--scenario")?),
            "--stage" => {
                let raw = value("--stage")?;
                out.stage = Some(raw.parse().with_context(|| format!("invalid stage `{raw}`"))?);
            }
            "--cumulative" => out.cumulative = true,
            "--coffee" => out.coffee = Some(value("--coffee")?),
            "--random" => {
                let raw = value("--random")?;
                out.random = Some(raw.parse().with_context(|| format!("invalid seed `{raw}`"))?);
            }
            "--config" => out.config = Some(value("--config")?),
            "--json" => out.json = true,
            "--list" => out.list = true,
            "--version" => out.version = true,
            "-h" | "--help" => out.help = true,
            other => bail!("unknown argument `{other}`\n{USAGE}"),
        }
    }
    Ok(out)
}

fn load_config(path: Option<&str>) -> Result<LabConfig> {
    let Some(path) = path else {
        return Ok(LabConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    let cfg: LabConfig = serde_yaml::from_str(&text).with_context(|| format!("parsing config {path}"))?;
    validate_config(&cfg)?;
    info!(path, "loaded config");
    Ok(cfg)
}

fn parse_coffee(raw: &str) -> Result<CoffeeShopDecision> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [volume, price, marketing] = parts.as_slice() else {
        bail!("--coffee expects VOLUME,PRICE,MARKETING, got `{raw}`");
    };
    let num = |s: &str| Decimal::from_str(s).with_context(|| format!("`{s}` is not a number"));
    Ok(CoffeeShopDecision {
        sales_volume: num(*volume)?,
        price: num(*price)?,
        marketing_spend: num(*marketing)?,
    })
}

fn build_session(args: &Args, catalog: &Catalog) -> Result<LabSession> {
    let page = match &args.page {
        Some(p) => Page::from_str(p)?,
        None => Page::default(),
    };
    let mut session = LabSession::new(page);
    for (key, raw) in &args.sets {
        session
            .set(key, raw)
            .with_context(|| format!("--set {key}={raw} on {page}"))?;
    }
    if let Some(raw) = &args.reported_net_income {
        let reported = Decimal::from_str(raw.trim()).with_context(|| format!("invalid net income `{raw}`"))?;
        session.report_net_income(Some(reported));
    }
    if let Some(id) = &args.scenario {
        session.open_scenario(catalog, id, args.stage.unwrap_or(1))?;
        session.set_cumulative(args.cumulative)?;
    } else if args.stage.is_some() || args.cumulative {
        bail!("--stage and --cumulative need --scenario");
    }
    if let Some(raw) = &args.coffee {
        session.play_coffee_shop(parse_coffee(raw)?)?;
    }
    if let Some(seed) = args.random {
        session.play_random_challenge(seed);
    }
    Ok(session)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    if args.version {
        println!(
            "lab-cli {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }

    let catalog = Catalog::builtin()?;
    if args.list {
        for (id, page) in catalog.ids() {
            println!("{id:<24}{page}");
        }
        return Ok(());
    }

    let presenter = Presenter::new(load_config(args.config.as_deref())?);
    let session = build_session(&args, catalog)?;
    info!(page = %session.page(), activity = ?session.activity(), "rendering");
    let view = session.render(&presenter, catalog)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{view}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_repeated_sets() {
        let a = args(&["--page", "ratios", "--set", "inventory=5", "--set", "equity=10", "--json"]).unwrap();
        assert_eq!(a.page.as_deref(), Some("ratios"));
        assert_eq!(
            a.sets,
            vec![
                ("inventory".to_string(), "5".to_string()),
                ("equity".to_string(), "10".to_string())
            ]
        );
        assert!(a.json);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&["--set", "cash"]).is_err());
        assert!(args(&["--stage"]).is_err());
        assert!(args(&["--stage", "two"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
    }

    #[test]
    fn coffee_triple() {
        let d = parse_coffee("10000, 5, 0").unwrap();
        assert_eq!(d.sales_volume, Decimal::from(10000));
        assert!(parse_coffee("10000,5").is_err());
    }

    #[test]
    fn session_from_scenario_flags() {
        let catalog = Catalog::builtin().unwrap();
        let a = args(&["--scenario", "pizza-year-one", "--stage", "12", "--cumulative"]).unwrap();
        let session = build_session(&a, catalog).unwrap();
        assert_eq!(session.page(), Page::ProfitLoss);
        let text = session.render(&Presenter::default(), catalog).unwrap().to_string();
        assert!(text.contains("Months 1-12"));

        let stray = args(&["--stage", "2"]).unwrap();
        assert!(build_session(&stray, catalog).is_err());
    }
}
