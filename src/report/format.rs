//! Plain-text rendering of build reports, catalogs and slices.

use crate::app::pipeline::{BuildReport, IndicatorRun};
use crate::data::FetchOutcome;
use crate::domain::{CatalogEntry, IndicatorDef, SliceProfile, SliceResult, YearMonth};
use crate::registry::IndicatorRegistry;

/// Per-indicator outcome lines followed by the catalog table.
pub fn format_build_report(report: &BuildReport) -> String {
    let mut out = String::new();
    out.push_str("Normalizing indicators to month-end...\n\n");

    for run in &report.runs {
        match &run.result {
            Ok(o) => match (o.first, o.last) {
                (Some(first), Some(last)) => out.push_str(&format!(
                    " ✔ {}: {} rows [{} → {}] ({} source)\n",
                    run.indicator_id,
                    o.rows,
                    YearMonth::of(first),
                    YearMonth::of(last),
                    o.frequency,
                )),
                _ => out.push_str(&format!(" ⚠ {}: EMPTY after cleaning, check raw data.\n", run.indicator_id)),
            },
            Err(err) => out.push_str(&format!(" ✘ {}: {err}\n", run.indicator_id)),
        }
    }

    let failures = report.failures();
    out.push_str(&format!(
        "\n{} ok, {} failed\n\n",
        report.runs.len() - failures,
        failures
    ));
    out.push_str(&format_catalog(&report.catalog.iter().collect::<Vec<_>>()));
    out
}

pub fn format_catalog(entries: &[&CatalogEntry]) -> String {
    if entries.is_empty() {
        return "Catalog is empty: no normalized series found. Run `mtm build` first.\n".to_string();
    }

    let id_w = entries.iter().map(|e| e.indicator_id.chars().count()).max().unwrap_or(0).max(12);
    let disp_w = entries.iter().map(|e| e.display.chars().count()).max().unwrap_or(0).max(7);
    let cat_w = entries.iter().map(|e| e.category.chars().count()).max().unwrap_or(0).max(8);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<id_w$}  {:<disp_w$}  {:<7}  {:<cat_w$}  {:<7}  {:<7}  {:>5}\n",
        "indicator_id", "display", "country", "category", "start", "end", "rows"
    ));
    for e in entries {
        out.push_str(&format!(
            "{:<id_w$}  {:<disp_w$}  {:<7}  {:<cat_w$}  {:<7}  {:<7}  {:>5}\n",
            e.indicator_id,
            e.display,
            e.country,
            e.category,
            YearMonth::of(e.start).to_string(),
            YearMonth::of(e.end).to_string(),
            e.rows
        ));
    }
    out
}

pub fn format_indicators(registry: &IndicatorRegistry) -> String {
    let mut out = String::new();
    for def in registry.iter() {
        out.push_str(&format!(
            "{:<24} {:<36} {:<8} {:<18} {}\n",
            def.id,
            def.display,
            def.country,
            def.category,
            source_label(def)
        ));
    }
    out
}

fn source_label(def: &IndicatorDef) -> String {
    match &def.fred_series {
        Some(series) => format!("{} (FRED {series})", def.file),
        None => def.file.clone(),
    }
}

pub fn format_fetch_report(runs: &[IndicatorRun<Option<FetchOutcome>>]) -> String {
    let mut out = String::new();
    for run in runs {
        match &run.result {
            Ok(Some(o)) => out.push_str(&format!(
                " ✔ {}: {} observations from {} → {}\n",
                run.indicator_id,
                o.rows,
                o.series_id,
                o.path.display()
            )),
            Ok(None) => out.push_str(&format!(" - {}: no FRED series; provide the raw file manually\n", run.indicator_id)),
            Err(err) => out.push_str(&format!(" ✘ {}: {err}\n", run.indicator_id)),
        }
    }
    out
}

/// Header, summary block, optional profile, then the monthly table.
pub fn format_slice(result: &SliceResult, display: &str, ai_enabled: bool) -> String {
    let s = &result.summary;
    let mut out = String::new();

    out.push_str(&format!("=== {display} ===\n"));
    out.push_str(&format!(
        "Date range: {} → {} ({} rows)\n\n",
        YearMonth::of(result.start_date),
        YearMonth::of(result.end_date),
        s.rows
    ));

    out.push_str(&format!("Start:    {}\n", fmt_num(s.start_value)));
    out.push_str(&format!("End:      {}\n", fmt_num(s.end_value)));
    out.push_str(&format!("Change:   {}\n", fmt_num(s.abs_change)));
    out.push_str(&format!(
        "Change %: {}\n",
        s.pct_change.map(|p| format!("{p:.2}%")).unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!(
        "Min / Max / Avg: {} / {} / {}\n",
        fmt_num(s.min_value),
        fmt_num(s.max_value),
        fmt_num(s.avg_value)
    ));

    match &result.profile {
        Some(SliceProfile::YieldCurve {
            most_inverted,
            months_inverted,
        }) => {
            out.push_str("\nYield curve structure:\n");
            out.push_str(&format!("  Most inverted:   {}%\n", fmt_num(*most_inverted)));
            out.push_str(&format!("  Months inverted: {months_inverted}\n"));
        }
        Some(SliceProfile::Volatility {
            max_spike,
            spike_month,
            average,
            signal,
        }) => {
            out.push_str("\nVolatility profile:\n");
            out.push_str(&format!("  Max spike:   {}\n", fmt_num(*max_spike)));
            out.push_str(&format!("  Spike month: {}\n", YearMonth::of(*spike_month)));
            out.push_str(&format!("  Average:     {}\n", fmt_num(*average)));
            out.push_str(&format!("  Signal:      {signal}\n"));
        }
        None => {}
    }

    out.push_str("\nMonth      Value          Change %\n");
    for row in &result.rows {
        out.push_str(&format!(
            "{:<9}  {:>12}  {:>9.2}%\n",
            YearMonth::of(row.date).to_string(),
            fmt_num(row.value),
            row.change_pct
        ));
    }

    if !ai_enabled {
        out.push_str("\nAI interpretation disabled: set GEMINI_API_KEY to enable it.\n");
    }
    out
}

/// Two decimals with thousands separators (`12,345.68`).
pub fn fmt_num(v: f64) -> String {
    let formatted = format!("{:.2}", v.abs());
    let (int_part, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}
