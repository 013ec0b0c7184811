use anyhow::{bail, Context, Result};
use serde::Serialize;

use marketlens::data::loader::DataLoader;
use marketlens::data::model::{DominantSubcontractor, ScopeAggregationRow, ScopeEquity};
use marketlens::format::{format_currency, format_percent};
use marketlens::metrics::{self, EquitySummary, MarketKpis, TierRollup};
use marketlens::query::{self, DominantKey, QueryState, SortDirection};
use marketlens::session::{DataSession, SessionState};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/data";

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

struct Args {
    base_url: String,
    scope: Option<String>,
    search: Option<String>,
    top: usize,
    json: bool,
}

fn usage() -> &'static str {
    "marketlens [OPTIONS]

Options:
  --base-url URL   Base URL serving the dataset CSVs
                   (default: $MARKETLENS_BASE_URL or http://localhost:8000/data)
  --scope NAME     Also print the firm breakdown for one scope of work
  --search TERM    Filter the dominant-firm table by firm or scope name
  --top N          List length for ranked sections (default 10)
  --json           Emit the derived report as JSON instead of text
  -h, --help       Show this help"
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        base_url: std::env::var("MARKETLENS_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        scope: None,
        search: None,
        top: 10,
        json: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--base-url" => {
                args.base_url = it.next().context("--base-url needs a value")?;
            }
            "--scope" => {
                args.scope = Some(it.next().context("--scope needs a value")?);
            }
            "--search" => {
                args.search = Some(it.next().context("--search needs a value")?);
            }
            "--top" => {
                let raw = it.next().context("--top needs a value")?;
                args.top = raw
                    .parse()
                    .with_context(|| format!("--top: '{raw}' is not a count"))?;
            }
            "--json" => args.json = true,
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other => bail!("unknown argument '{other}'\n\n{}", usage()),
        }
    }

    Ok(args)
}

// ---------------------------------------------------------------------------
// Derived report
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Breakdown<'a> {
    scope: String,
    firms: Vec<&'a ScopeAggregationRow>,
}

#[derive(Serialize)]
struct Report<'a> {
    using_fallback: bool,
    kpis: MarketKpis,
    tiers: Vec<TierRollup>,
    equity: EquitySummary,
    dominant_firms: Vec<&'a DominantSubcontractor>,
    attention_scopes: Vec<&'a ScopeEquity>,
    top_scopes: Vec<&'a ScopeEquity>,
    breakdown: Option<Breakdown<'a>>,
}

fn build_report<'a>(session: &'a DataSession, args: &Args) -> Report<'a> {
    // The dominant-firm table is a real query-view consumer: predicate for
    // the dominance threshold, optional search, largest shares first.
    let mut dominant_query: QueryState<DominantKey> = QueryState::default();
    if let Some(term) = &args.search {
        dominant_query.search = term.clone();
    }
    dominant_query.sort = Some((DominantKey::Share, SortDirection::Descending));

    let dominant_rows = &session.dominant.rows;
    let dominant_firms: Vec<&DominantSubcontractor> =
        query::apply_filtered(dominant_rows, &dominant_query, metrics::is_dominant)
            .into_iter()
            .map(|i| &dominant_rows[i])
            .take(args.top)
            .collect();

    let breakdown = args.scope.as_ref().map(|scope| Breakdown {
        scope: scope.clone(),
        firms: metrics::scope_breakdown(&session.aggregation.rows, scope),
    });

    Report {
        using_fallback: session.using_fallback,
        kpis: metrics::market_kpis(
            &session.concentration.rows,
            &session.equity.rows,
            &session.aggregation.rows,
        ),
        tiers: metrics::tier_rollups(&session.concentration.rows),
        equity: metrics::equity_summary(&session.equity.rows),
        dominant_firms,
        attention_scopes: metrics::scopes_requiring_attention(&session.equity.rows, args.top),
        top_scopes: metrics::top_scopes_by_spend(&session.equity.rows, args.top),
        breakdown,
    }
}

fn print_report(report: &Report<'_>, notice: Option<&str>) {
    if let Some(notice) = notice {
        println!("{notice}\n");
    }

    let kpis = &report.kpis;
    println!("Market overview");
    println!(
        "  Total spend          {} across {} scopes",
        format_currency(kpis.total_spend),
        kpis.scopes
    );
    println!(
        "  Highly concentrated  {} ({} of {} scopes)",
        format_percent(kpis.highly_concentrated_share),
        kpis.highly_concentrated_scopes,
        kpis.scopes
    );
    println!(
        "  LBE dollar share     {} ({})",
        format_percent(kpis.lbe_share),
        format_currency(kpis.lbe_dollars)
    );
    println!(
        "  Average award        {}",
        format_currency(kpis.average_award)
    );

    println!("\nSpend by concentration tier");
    for rollup in &report.tiers {
        println!(
            "  {:<24} {:>3} scopes  {}",
            rollup.tier.label(),
            rollup.scopes,
            format_currency(rollup.total_spend)
        );
    }

    println!("\nDominant firms (share >= 25%)");
    if report.dominant_firms.is_empty() {
        println!("  none match");
    }
    for firm in &report.dominant_firms {
        println!(
            "  {:<28} {:<40} {} ({}, rank {})",
            firm.firm,
            firm.scope,
            format_currency(firm.amount),
            format_percent(firm.share_of_scope),
            firm.rank_in_scope
        );
    }

    println!("\nScopes requiring attention (LBE share <25% or >75%)");
    for scope in &report.attention_scopes {
        println!(
            "  {:<44} {:>6}  {}",
            scope.scope,
            format_percent(scope.lbe_dollar_share),
            format_currency(scope.total_dollars)
        );
    }

    println!("\nTop scopes by spend");
    for scope in &report.top_scopes {
        println!(
            "  {:<44} {}  (LBE {})",
            scope.scope,
            format_currency(scope.total_dollars),
            format_percent(scope.lbe_dollar_share)
        );
    }

    if let Some(breakdown) = &report.breakdown {
        println!("\nFirms in {}", breakdown.scope);
        if breakdown.firms.is_empty() {
            println!("  no subcontractor data for this scope");
        }
        for firm in &breakdown.firms {
            println!(
                "  {:<28} {}  ({}, {} contracts)",
                firm.firm,
                format_currency(firm.amount),
                format_percent(firm.share_of_scope),
                firm.contracts
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let loader = DataLoader::new(&args.base_url).context("building HTTP client")?;

    let mut state = SessionState::default();
    state.begin_load();
    let session = loader.load_session().await;
    state.set_session(session);

    let session = state.data().context("session missing after load")?;

    let flagged = metrics::mislabeled(&session.concentration.rows);
    if !flagged.is_empty() {
        log::warn!(
            "{} scopes carry tier labels that disagree with their HHI",
            flagged.len()
        );
    }

    let report = build_report(session, &args);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, state.notice());
    }

    Ok(())
}
