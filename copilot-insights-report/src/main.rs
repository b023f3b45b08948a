//! copilot-insights - usage report for an AI coding assistant rollout
//!
//! Loads daily metrics and the seat snapshot, aggregates them for a time
//! window and prints a terminal, markdown or JSON report. `--list-values`
//! prints the languages and editors the filters accept instead.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use copilot_insights_core::analytics::{
    query_seats, seat_editors, seat_teams, DateRange, SeatQuery, SeatSortField, SortDirection,
};
use copilot_insights_core::config::SourceKind;
use copilot_insights_core::format::{
    format_count, format_date_range, format_rate, format_relative_time_opt,
};
use copilot_insights_core::{
    source, Clock, Config, FixedClock, InsightsData, InsightsFilter, InsightsLoader, MetricsSource,
    Seat, SystemClock, TimeFrame, TimeRange,
};

#[derive(Parser, Debug)]
#[command(name = "copilot-insights")]
#[command(about = "Usage insights for your AI coding assistant rollout")]
#[command(version)]
struct Args {
    /// Time range preset (7_days, 14_days, 28_days, current_month,
    /// previous_month, 3_months, 6_months, 1_year, custom)
    #[arg(long)]
    range: Option<TimeRange>,

    /// Start of a custom range (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// End of a custom range (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,

    /// Bucket size for the time series (daily, weekly, monthly)
    #[arg(long)]
    frame: Option<TimeFrame>,

    /// Restrict the trend series to this language (repeatable)
    #[arg(long = "language")]
    languages: Vec<String>,

    /// Restrict the trend series to this editor (repeatable)
    #[arg(long = "editor")]
    editors: Vec<String>,

    /// Print the languages and editors the filters accept, then exit
    #[arg(long)]
    list_values: bool,

    /// Only list seats whose login or name contains this text
    #[arg(long)]
    seat_search: Option<String>,

    /// Only list seats granted through this team
    #[arg(long)]
    seat_team: Option<String>,

    /// Only list seats last used from this editor (e.g. vscode)
    #[arg(long)]
    seat_editor: Option<String>,

    /// Seat list order (login, team, created_at, last_activity_at,
    /// last_activity_editor)
    #[arg(long, default_value = "last_activity_at")]
    seat_sort: SeatSortField,

    /// Seat list direction (asc, desc)
    #[arg(long, default_value = "desc")]
    seat_order: SortDirection,

    /// Metrics JSON export to read
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Seats JSON export to read
    #[arg(long)]
    seats: Option<PathBuf>,

    /// Query the dashboard API at this base URL instead of local files
    #[arg(long)]
    api_url: Option<String>,

    /// Enterprise to report on
    #[arg(long)]
    enterprise: Option<String>,

    /// Organization to report on
    #[arg(long)]
    organization: Option<String>,

    /// Team to report on
    #[arg(long)]
    team: Option<String>,

    /// Config file (default: ~/.config/copilot-insights/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pin the current instant (RFC 3339) for reproducible reports
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    let _log_guard = copilot_insights_core::logging::init(&config.logging).ok();

    apply_source_overrides(&args, &mut config);
    let filter = build_filter(&args, &config)?;

    let clock: Arc<dyn Clock> = match args.now {
        Some(now) => Arc::new(FixedClock(now)),
        None => Arc::new(SystemClock),
    };
    let range = filter
        .date_range(clock.as_ref())
        .context("failed to resolve time range")?;

    let source = source::from_config(&config.source).context("failed to create source")?;
    if args.list_values {
        return print_filter_values(source.as_ref(), args.export.as_deref()).await;
    }

    let loader = InsightsLoader::new(source, clock.clone())
        .with_scope(config.source.scope.clone())
        .with_options(config.insights.summary_options())
        .with_week_start(config.insights.week_start);

    let data = loader
        .load(&filter)
        .await
        .context("failed to load insights")?
        .into_fresh()
        .context("insights request was superseded")?;

    let query = seat_query(&args);
    let roster: Vec<&Seat> = data
        .seats
        .as_ref()
        .map(|snapshot| query_seats(&snapshot.seats, &query))
        .unwrap_or_default();

    match args.export.as_deref() {
        Some("json") => print_json(&data, &roster, &range, filter.time_frame)?,
        Some("md") => print_markdown(&data, &roster, &range, clock.now()),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&data, &roster, &range, clock.now()),
    }

    Ok(())
}

async fn print_filter_values(source: &dyn MetricsSource, export: Option<&str>) -> Result<()> {
    let languages = source
        .fetch_languages()
        .await
        .context("failed to fetch languages")?;
    let editors = source
        .fetch_editors()
        .await
        .context("failed to fetch editors")?;

    match export {
        Some("json") => {
            let json = serde_json::json!({ "languages": languages, "editors": editors });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Some("md") | None => {
            println!("LANGUAGES");
            for language in &languages {
                println!("   {}", language);
            }
            println!();
            println!("EDITORS");
            for editor in &editors {
                println!("   {}", editor);
            }
        }
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
    }
    Ok(())
}

fn seat_query(args: &Args) -> SeatQuery {
    SeatQuery {
        search: args.seat_search.clone(),
        team: args.seat_team.clone(),
        editor: args.seat_editor.clone(),
        sort_field: args.seat_sort,
        direction: args.seat_order,
    }
}

fn seat_login(seat: &Seat) -> &str {
    seat.assignee
        .as_ref()
        .map(|a| a.login.as_str())
        .unwrap_or("unassigned")
}

fn seat_team(seat: &Seat) -> &str {
    seat.assigning_team
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or("-")
}

/// Command-line source and scope flags win over the config file.
fn apply_source_overrides(args: &Args, config: &mut Config) {
    let source = &mut config.source;
    if let Some(url) = &args.api_url {
        source.kind = SourceKind::Http;
        source.api_base_url = Some(url.clone());
    }
    if args.metrics.is_some() || args.seats.is_some() {
        source.kind = SourceKind::File;
    }
    if let Some(path) = &args.metrics {
        source.metrics_path = Some(path.clone());
    }
    if let Some(path) = &args.seats {
        source.seats_path = Some(path.clone());
    }
    if args.enterprise.is_some() {
        source.scope.enterprise = args.enterprise.clone();
    }
    if args.organization.is_some() {
        source.scope.organization = args.organization.clone();
    }
    if args.team.is_some() {
        source.scope.team = args.team.clone();
    }
}

fn build_filter(args: &Args, config: &Config) -> Result<InsightsFilter> {
    let custom_range = match (args.from, args.to) {
        (Some(from), Some(to)) => Some(DateRange::new(from, to)?),
        _ => None,
    };

    // --from/--to alone imply a custom range
    let time_range = match (args.range, custom_range) {
        (Some(range), _) => range,
        (None, Some(_)) => TimeRange::Custom,
        (None, None) => config.insights.default_time_range,
    };

    Ok(InsightsFilter {
        time_range,
        time_frame: args.frame.unwrap_or(config.insights.default_time_frame),
        custom_range,
        languages: args.languages.clone(),
        editors: args.editors.clone(),
    })
}

fn print_terminal(
    data: &InsightsData,
    roster: &[&Seat],
    range: &DateRange,
    now: DateTime<Utc>,
) {
    let title = format!(
        "Copilot Insights: {}",
        format_date_range(range.start, range.end)
    );

    // Header
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", title);
    println!("╰{}╯", "─".repeat(60));
    println!();

    if data.metrics.is_empty() {
        println!("  No activity found for this period.");
        println!();
    }

    let summary = &data.summary;
    println!("SUMMARY");
    println!(
        "   Active users:  {:<10} Engaged users: {}",
        summary.total_active_users, summary.total_engaged_users
    );
    println!(
        "   Peak active:   {:<10} Top model:     {}",
        summary.peak_active_users, summary.most_used_model
    );
    println!(
        "   Suggestions:   {:<10} Acceptances:   {}",
        format_count(summary.total_suggestions),
        format_count(summary.total_acceptances)
    );
    println!(
        "   Acceptance:    {:<10} Lines:         {}",
        format_rate(summary.average_acceptance_rate),
        format_rate(summary.average_lines_acceptance_rate)
    );
    println!("   Chats:         {}", format_count(summary.total_chats));
    println!();

    println!("SEATS");
    println!(
        "   Active: {} of {} ({})",
        summary.active_seats,
        summary.total_seats,
        format_rate(summary.adoption_rate)
    );
    println!();

    println!("AGENT");
    println!(
        "   Adoption:      {:<10} Agent users:   {}",
        format!("{}%", summary.agent_adoption_percentage),
        summary.agent_active_users
    );
    println!(
        "   Lines changed: {:<10} Contribution:  {}",
        format_count(summary.total_lines_changed),
        format_rate(summary.agent_contribution_percentage)
    );
    println!();

    if !data.processed.is_empty() {
        println!("TREND");
        for row in &data.processed {
            println!(
                "   {:<10} {:>5} active  {:>8} suggestions  {:>8}",
                row.display_date,
                row.totals.total_active_users,
                format_count(row.totals.total_code_suggestions),
                format_rate(row.totals.acceptance_rate)
            );
        }
        println!();
    }

    if !data.languages.is_empty() {
        println!("TOP LANGUAGES");
        for (i, entry) in data.languages.iter().take(5).enumerate() {
            println!(
                "   {}. {:<14} {:>5} users  {:>8}",
                i + 1,
                entry.name,
                entry.total_engaged_users,
                format_rate(entry.percentage)
            );
        }
        println!();
    }

    if !data.editors.is_empty() {
        println!("EDITORS");
        for entry in &data.editors {
            println!(
                "   {:<16} {:>5} users  {:>8}",
                entry.name,
                entry.total_engaged_users,
                format_rate(entry.percentage)
            );
        }
        println!();
    }

    if data.seats.is_some() {
        println!("SEAT ROSTER");
        if roster.is_empty() {
            println!("   No seats match.");
        }
        for seat in roster {
            println!(
                "   {:<16} {:<12} {:<20} {}",
                seat_login(seat),
                seat_team(seat),
                seat.last_activity_editor.as_deref().unwrap_or("-"),
                format_relative_time_opt(seat.last_activity_at, now)
            );
        }
        println!();
    }
}

fn print_markdown(
    data: &InsightsData,
    roster: &[&Seat],
    range: &DateRange,
    now: DateTime<Utc>,
) {
    let summary = &data.summary;

    println!(
        "# Copilot Insights: {}",
        format_date_range(range.start, range.end)
    );
    println!();

    println!("## Summary");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Active Users | {} |", summary.total_active_users);
    println!("| Engaged Users | {} |", summary.total_engaged_users);
    println!("| Peak Active Users | {} |", summary.peak_active_users);
    println!("| Suggestions | {} |", summary.total_suggestions);
    println!("| Acceptances | {} |", summary.total_acceptances);
    println!(
        "| Acceptance Rate | {} |",
        format_rate(summary.average_acceptance_rate)
    );
    println!(
        "| Lines Acceptance Rate | {} |",
        format_rate(summary.average_lines_acceptance_rate)
    );
    println!("| Chats | {} |", summary.total_chats);
    println!(
        "| Seats | {} of {} active ({}) |",
        summary.active_seats,
        summary.total_seats,
        format_rate(summary.adoption_rate)
    );
    println!("| Most Used Model | {} |", summary.most_used_model);
    println!();

    println!("## Agent");
    println!();
    println!(
        "- **Adoption:** {}% ({} users)",
        summary.agent_adoption_percentage, summary.agent_active_users
    );
    println!("- **Lines changed:** {}", summary.total_lines_changed);
    println!(
        "- **Agent contribution:** {}",
        format_rate(summary.agent_contribution_percentage)
    );
    println!(
        "- **Lines deleted by agent (daily mean):** {}",
        summary.average_lines_deleted_by_agent
    );
    if let Some(changes) = data
        .latest_changes
        .as_ref()
        .and_then(|g| g.agent_initiated_changes.as_ref())
    {
        println!(
            "- **Latest agent changes:** +{} / -{}",
            changes.total_added, changes.total_deleted
        );
    }
    println!();

    if let Some(user) = data
        .latest_changes
        .as_ref()
        .and_then(|g| g.user_initiated_changes.as_ref())
    {
        println!("## User-Initiated Changes");
        println!();
        println!("| Dimension | Name | Suggested | Added |");
        println!("|-----------|------|-----------|-------|");
        for change in &user.by_mode {
            println!(
                "| Mode | {} | {} | {} |",
                change.mode, change.suggested, change.added
            );
        }
        for change in &user.by_model {
            println!(
                "| Model | {} | {} | {} |",
                change.model, change.suggested, change.added
            );
        }
        for change in &user.by_language {
            println!(
                "| Language | {} | {} | {} |",
                change.language, change.suggested, change.added
            );
        }
        println!();
    }

    if !data.processed.is_empty() {
        println!("## Trend");
        println!();
        println!("| Period | Active | Engaged | Suggestions | Acceptance | Chats |");
        println!("|--------|--------|---------|-------------|------------|-------|");
        for row in &data.processed {
            println!(
                "| {} | {} | {} | {} | {} | {} |",
                row.display_date,
                row.totals.total_active_users,
                row.totals.total_engaged_users,
                row.totals.total_code_suggestions,
                format_rate(row.totals.acceptance_rate),
                row.totals.total_chats
            );
        }
        println!();
    }

    if !data.languages.is_empty() {
        println!("## Languages");
        println!();
        println!("| Language | Engaged | Suggestions | Acceptance | Share |");
        println!("|----------|---------|-------------|------------|-------|");
        for entry in &data.languages {
            println!(
                "| {} | {} | {} | {} | {} |",
                entry.name,
                entry.total_engaged_users,
                entry.total_suggestions,
                format_rate(entry.acceptance_rate),
                format_rate(entry.percentage)
            );
        }
        println!();
    }

    if !data.editors.is_empty() {
        println!("## Editors");
        println!();
        println!("| Editor | Engaged | Suggestions | Acceptance | Share |");
        println!("|--------|---------|-------------|------------|-------|");
        for entry in &data.editors {
            println!(
                "| {} | {} | {} | {} | {} |",
                entry.name,
                entry.total_engaged_users,
                entry.total_suggestions,
                format_rate(entry.acceptance_rate),
                format_rate(entry.percentage)
            );
        }
        println!();
    }

    for (heading, shares) in [("Chat Modes", &data.chat_modes), ("Models", &data.models)] {
        if shares.is_empty() {
            continue;
        }
        println!("## {}", heading);
        println!();
        for share in shares {
            println!(
                "- **{}:** {} requests ({})",
                share.name,
                share.requests,
                format_rate(share.percentage)
            );
        }
        println!();
    }

    if data.seats.is_some() {
        println!("## Seats");
        println!();
        println!("| Login | Team | Editor | Created | Last Activity |");
        println!("|-------|------|--------|---------|---------------|");
        for seat in roster {
            println!(
                "| {} | {} | {} | {} | {} |",
                seat_login(seat),
                seat_team(seat),
                seat.last_activity_editor.as_deref().unwrap_or("-"),
                seat.created_at.format("%Y-%m-%d"),
                format_relative_time_opt(seat.last_activity_at, now)
            );
        }
        println!();
    }

    println!("---");
    println!("*Generated by copilot-insights at {}*", now.to_rfc3339());
}

fn print_json(
    data: &InsightsData,
    roster: &[&Seat],
    range: &DateRange,
    time_frame: TimeFrame,
) -> Result<()> {
    let json = serde_json::json!({
        "range": range,
        "time_frame": time_frame,
        "summary": data.summary,
        "series": data.processed,
        "languages": data.languages,
        "editors": data.editors,
        "chat_modes": data.chat_modes,
        "models": data.models,
        "code_generation": data.code_generation,
        "latest_changes": data.latest_changes,
        "seats": data.seats.as_ref().map(|s| serde_json::json!({
            "total_seats": s.total_seats,
            "assigned": s.seats.len(),
            "teams": seat_teams(&s.seats),
            "editors": seat_editors(&s.seats),
            "roster": roster,
        })),
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
